pub mod format;
pub mod scheduler;
