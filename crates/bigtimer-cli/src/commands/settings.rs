use std::rc::Rc;

use bigtimer_core::{
    ConfigSettingsStore, Event, SettingsStore, SilentCuePlayer, SingleTimer, SystemClock,
    TimerSettings,
};
use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current timer preferences
    Show,
    /// Flip one on/off preference
    Toggle {
        #[arg(value_enum)]
        option: Toggle,
    },
    /// Switch to the next display style
    CycleStyle,
    /// Set the remembered custom duration (clamped to 1..=180)
    CustomMinutes { minutes: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    /// Focus lock: plain reset is refused while a timer runs
    Lock,
    /// All sounds
    Sound,
    /// Cue at the halfway point
    Halfway,
    /// Cue ten seconds before the end
    LastTen,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = ConfigSettingsStore::open_default()?;
    let mut timer = SingleTimer::new(Rc::new(SystemClock::new()), Rc::new(SilentCuePlayer));
    timer.apply_persisted_settings(store.load()?);

    let event = match action {
        SettingsAction::Show => return print(timer.settings()),
        SettingsAction::Toggle { option } => match option {
            Toggle::Lock => timer.toggle_focus_lock(),
            Toggle::Sound => timer.toggle_sound(),
            Toggle::Halfway => timer.toggle_halfway(),
            Toggle::LastTen => timer.toggle_last_ten(),
        },
        SettingsAction::CycleStyle => timer.cycle_style(),
        SettingsAction::CustomMinutes { minutes } => timer.set_last_custom_minutes(minutes),
    };

    if let Some(Event::SettingsChanged { settings, .. }) = event {
        store.save(&settings)?;
        tracing::debug!(path = %store.path().display(), "settings saved");
    }
    print(timer.settings())
}

fn print(settings: &TimerSettings) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
