pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod server;
pub mod service;
pub mod status;
pub mod tui;
pub mod utils;

pub use client::TaskClient;
pub use config::Config;
pub use database::Database;
pub use error::ServiceError;
pub use models::{NewTask, Task, TaskPatch};
pub use service::TaskService;
pub use status::TaskStatus;
pub use utils::Profile;
