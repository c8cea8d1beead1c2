use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::format_step_name;

fn default_emoji() -> String {
    "📋".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    /// Duration in minutes, at least 1.
    pub minutes: u32,
    pub name: String,
}

impl RoutineStep {
    /// Build a step, clamping `minutes` to at least 1 and labelling unnamed
    /// steps with their duration ("5 min", "1h 30m").
    pub fn new(minutes: u32, name: Option<&str>) -> Self {
        let minutes = minutes.max(1);
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format_step_name(minutes));
        Self { minutes, name }
    }

    /// Parse `"10"` or `"10:Brush teeth"`.
    pub fn parse(spec: &str) -> Result<Self, ValidationError> {
        let (minutes, name) = match spec.split_once(':') {
            Some((m, n)) => (m, Some(n)),
            None => (spec, None),
        };
        let minutes: u32 = minutes
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ValidationError::InvalidStep {
                spec: spec.to_string(),
                message: e.to_string(),
            })?;
        if minutes == 0 {
            return Err(ValidationError::InvalidStep {
                spec: spec.to_string(),
                message: "a step must last at least one minute".into(),
            });
        }
        Ok(Self::new(minutes, name))
    }

    pub fn duration_secs(&self) -> u32 {
        self.minutes.saturating_mul(60)
    }

    /// Re-apply the construction rules to a step read from disk.
    pub fn normalized(self) -> Self {
        Self::new(self.minutes, Some(&self.name))
    }
}

/// An ordered list of timed steps run back-to-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    #[serde(default)]
    pub steps: Vec<RoutineStep>,
}

impl Routine {
    pub fn new(name: impl Into<String>, emoji: Option<&str>, steps: Vec<RoutineStep>) -> Self {
        Self {
            id: format!("routine-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            emoji: emoji
                .filter(|e| !e.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_emoji),
            steps,
        }
    }

    pub fn is_runnable(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Sum of all step durations, saturating at `u32::MAX`.
    pub fn total_minutes(&self) -> u32 {
        self.cumulative_minutes(self.steps.len())
    }

    /// Minutes of every step before `step_index`.
    pub fn cumulative_minutes(&self, step_index: usize) -> u32 {
        self.steps
            .iter()
            .take(step_index)
            .fold(0u32, |acc, s| acc.saturating_add(s.minutes))
    }

    /// Re-apply the step rules to a routine read from disk.
    pub fn normalized(mut self) -> Self {
        self.steps = self.steps.into_iter().map(RoutineStep::normalized).collect();
        if self.emoji.trim().is_empty() {
            self.emoji = default_emoji();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_step_gets_duration_label() {
        assert_eq!(RoutineStep::new(5, None).name, "5 min");
        assert_eq!(RoutineStep::new(90, Some("  ")).name, "1h 30m");
        assert_eq!(RoutineStep::new(10, Some("Brush teeth")).name, "Brush teeth");
    }

    #[test]
    fn step_minutes_clamped_to_one() {
        assert_eq!(RoutineStep::new(0, None).minutes, 1);
    }

    #[test]
    fn parse_step_specs() {
        let step = RoutineStep::parse("10:Get dressed").unwrap();
        assert_eq!(step.minutes, 10);
        assert_eq!(step.name, "Get dressed");
        assert_eq!(RoutineStep::parse("3").unwrap().name, "3 min");
        assert!(RoutineStep::parse("ten").is_err());
        assert!(RoutineStep::parse("0:Nothing").is_err());
    }

    #[test]
    fn routine_totals() {
        let routine = Routine::new(
            "Morning",
            None,
            vec![RoutineStep::new(2, None), RoutineStep::new(3, None), RoutineStep::new(5, None)],
        );
        assert!(routine.id.starts_with("routine-"));
        assert_eq!(routine.emoji, "📋");
        assert_eq!(routine.total_minutes(), 10);
        assert_eq!(routine.cumulative_minutes(2), 5);
        assert_eq!(routine.cumulative_minutes(10), 10);
        assert!(routine.is_runnable());
        assert!(!Routine::new("Empty", Some("⭐"), vec![]).is_runnable());
    }

    #[test]
    fn huge_steps_saturate_totals() {
        let routine = Routine::new(
            "Forever",
            None,
            vec![
                RoutineStep::parse("4294967295:Long").unwrap(),
                RoutineStep::parse("1").unwrap(),
            ],
        );
        assert_eq!(routine.total_minutes(), u32::MAX);
        assert_eq!(routine.cumulative_minutes(1), u32::MAX);
        assert_eq!(routine.steps[0].duration_secs(), u32::MAX);
    }

    #[test]
    fn normalized_fixes_hand_edited_steps() {
        let routine = Routine {
            id: "routine-1".into(),
            name: "Edited".into(),
            emoji: " ".into(),
            steps: vec![
                RoutineStep { minutes: 0, name: String::new() },
                RoutineStep { minutes: 4, name: "Read".into() },
            ],
        }
        .normalized();
        assert_eq!(routine.emoji, "📋");
        assert_eq!(routine.steps[0], RoutineStep::new(1, None));
        assert_eq!(routine.steps[0].name, "1 min");
        assert_eq!(routine.steps[1].name, "Read");
    }
}
