pub mod cache;
pub mod fs;
pub mod reminder_file;
pub mod state_file;

pub use cache::*;
pub use reminder_file::JsonFileReminderStore;
pub use state_file::{JsonStateFile, StateDocument};
