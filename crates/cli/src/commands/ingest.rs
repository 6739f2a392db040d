//! Ingest command handler.

use super::open_pipeline;
use clap::Args;
use scoperag_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Discover, chunk, embed, and index documents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Root directory of partitioned documents (one subdirectory per
    /// department)
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Ingesting documents from {:?}", self.path);

        let pipeline = open_pipeline(config)?;
        let stats = match pipeline.ingest(&self.path).await {
            Ok(stats) => stats,
            Err(AppError::PartialIngestion { indexed, reason }) => {
                // Committed chunks stay queryable; re-running after the
                // cause is fixed converges because upserts are keyed.
                tracing::error!(
                    "Ingestion stopped after {} chunks: {}. Fix the cause and re-run.",
                    indexed,
                    reason
                );
                return Err(AppError::PartialIngestion { indexed, reason });
            }
            Err(e) => return Err(e),
        };

        if self.json {
            let output = serde_json::json!({
                "sources": stats.sources_count,
                "chunksIndexed": stats.chunks_indexed,
                "truncatedSources": stats.truncated_sources,
                "durationSecs": stats.duration_secs,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| AppError::Serialization(e.to_string()))?
            );
        } else {
            println!(
                "Indexed {} chunks from {} sources in {:.2}s",
                stats.chunks_indexed, stats.sources_count, stats.duration_secs
            );
            for source in &stats.truncated_sources {
                println!("  note: {} was truncated at the row cap", source);
            }
        }

        Ok(())
    }
}
