pub mod cli;
pub mod config;
pub mod daily_log;
pub mod database;
pub mod logging;
pub mod models;
pub mod operations;
pub mod output;
pub mod recurrence;
pub mod repository;
pub mod short_id;
pub mod uow;
pub mod utils;
pub mod validation;

pub use config::Settings;
pub use database::Database;
pub use models::{Event, LogEntry, Migration, Note, Project, Task, TaskStatus};
pub use uow::{InMemoryUnitOfWork, SqliteUnitOfWork, UnitOfWork};
pub use utils::Profile;
