pub mod app;
pub mod cli;
pub mod config;
pub mod history;
pub mod routes;
pub mod state;
pub mod static_files;

pub use app::*;
pub use cli::Cli;
pub use config::DashboardConfig;
pub use history::{History, HistoryEntry, HistoryStats};
pub use state::DashboardState;
