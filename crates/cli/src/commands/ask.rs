//! Ask command handler.
//!
//! Runs the retrieve-then-generate flow as a given role. A generator
//! failure degrades to showing the retrieved sources rather than losing
//! the retrieval work.

use super::open_pipeline;
use clap::Args;
use scoperag_core::{config::AppConfig, AppError, AppResult};
use scoperag_llm::create_client;
use scoperag_retrieval::AnswerOptions;

/// Ask a question as a role
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Role to answer as (e.g. finance, hr, employee, c_level)
    #[arg(short, long)]
    pub role: String,

    /// Number of chunks to retrieve
    #[arg(long, default_value = "5")]
    pub top_k: usize,

    /// Maximum tokens in the generated answer
    #[arg(long, default_value = "300")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0-2.0)
    #[arg(long, default_value = "0.2")]
    pub temperature: f32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Asking as role '{}'", self.role);

        let pipeline = open_pipeline(config)?;
        let generator = create_client(&config.provider, None)?;

        let options = AnswerOptions {
            top_k: self.top_k,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let answer = match pipeline
            .answer(&self.question, &self.role, generator, &config.model, &options)
            .await
        {
            Ok(answer) => answer,
            Err(AppError::Generation {
                message,
                context: _,
                sources,
            }) => {
                tracing::error!("Generation failed: {}", message);
                eprintln!("Generation failed; retrieval succeeded. Relevant sources:");
                for source in &sources {
                    eprintln!("  - {}", source);
                }
                return Err(AppError::Llm(message));
            }
            Err(e) => return Err(e),
        };

        if self.json {
            let output = serde_json::json!({
                "answer": answer.answer,
                "sources": answer.sources,
                "retrievedCount": answer.retrieved_count,
                "role": self.role,
                "model": config.model,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| AppError::Serialization(e.to_string()))?
            );
        } else {
            println!("{}", answer.answer);
            if !answer.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &answer.sources {
                    println!("  - {}", source);
                }
            }
        }

        Ok(())
    }
}
