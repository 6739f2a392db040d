//! Stats command handler.

use super::open_pipeline;
use clap::Args;
use scoperag_core::{config::AppConfig, AppError, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let pipeline = open_pipeline(config)?;
        let stats = pipeline.stats()?;

        if self.json {
            let output = serde_json::json!({
                "sources": stats.sources_count,
                "chunks": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| AppError::Serialization(e.to_string()))?
            );
        } else {
            println!("Sources: {}", stats.sources_count);
            println!("Chunks:  {}", stats.chunks_count);
            println!("DB size: {} bytes", stats.db_size_bytes);
        }

        Ok(())
    }
}
