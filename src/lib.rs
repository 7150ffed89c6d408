// Export modules for library usage
pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod filters;
pub mod io;
pub mod report;
pub mod score;
pub mod trend;

// Re-export commonly used types
pub use crate::aggregate::{aggregate as run_aggregation, Aggregation, Bucket, RankEntry};
pub use crate::config::{AppConfig, Roster, Settings, VersionSelection};
pub use crate::core::{TicketTable, DI_LEVELS};
pub use crate::errors::DtsError;
pub use crate::score::{score_rows, Di, ScoreBreakdown};
pub use crate::trend::DailyHistory;
