//! CLI command implementations.

mod ask;
mod config;
mod init;
mod recent;
mod serve;
mod stats;

pub use ask::run_ask;
pub use config::run_config;
pub use init::run_init;
pub use recent::run_recent;
pub use serve::run_serve;
pub use stats::run_stats;
