pub mod config;
pub mod routine;
pub mod settings;
pub mod timer;
