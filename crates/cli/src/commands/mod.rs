//! CLI command handlers.

mod ask;
mod ingest;
mod reset;
mod stats;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;

use scoperag_core::{config::AppConfig, AppResult};
use scoperag_retrieval::{Pipeline, RetrievalConfig, CONFIG_FILE};

/// Load the retrieval configuration and open the pipeline for the
/// configured workspace.
pub(crate) fn open_pipeline(config: &AppConfig) -> AppResult<Pipeline> {
    let config_path = config
        .config_file
        .clone()
        .unwrap_or_else(|| config.state_dir().join(CONFIG_FILE));

    let retrieval_config = RetrievalConfig::load(&config_path)?;
    Pipeline::open(&config.state_dir(), retrieval_config)
}
