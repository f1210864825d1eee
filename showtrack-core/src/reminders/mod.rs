pub mod scheduler;
pub mod store;

pub use scheduler::{NotificationScheduler, ReminderPolicy, ScheduleReport};
pub use store::{InMemoryReminderStore, Reminder, ReminderStore};
