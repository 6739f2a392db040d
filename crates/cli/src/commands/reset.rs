//! Reset command handler.

use super::open_pipeline;
use clap::Args;
use scoperag_core::{config::AppConfig, AppError, AppResult};

/// Delete all indexed data
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        if !self.yes {
            return Err(AppError::Config(
                "Refusing to delete the index without --yes".to_string(),
            ));
        }

        let pipeline = open_pipeline(config)?;
        pipeline.reset()?;
        println!("Index cleared.");
        Ok(())
    }
}
