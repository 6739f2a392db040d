//! Answer assembly: prompt the generator with retrieved context and
//! package the result with citations.

use crate::retrieve::RetrievedContext;
use crate::types::{Answer, AnswerOptions, Citation};
use scoperag_core::{AppError, AppResult};
use scoperag_llm::{LlmClient, LlmRequest};
use std::sync::Arc;
use std::time::Duration;

/// Fixed answer returned when retrieval found nothing the role can see.
/// Distinguishable from generated text; the generator is never invoked in
/// this case.
pub const NO_MATCH_ANSWER: &str = "No relevant documents found for your role.";

/// Default wall-clock budget for the generation call, in seconds.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

const SYSTEM_PROMPT: &str = "You are an internal company assistant. Answer the question using \
only the provided context. Each context block is labeled with its department, source file, and \
chunk position. If the context does not contain the answer, say so plainly instead of guessing.";

/// Turns retrieved context plus a question into a final [`Answer`].
pub struct AnswerAssembler {
    client: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl AnswerAssembler {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }

    /// Override the generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Produce the final answer for `question` from already-retrieved
    /// context.
    ///
    /// Empty context short-circuits to [`NO_MATCH_ANSWER`] without touching
    /// the generator. A generator failure surfaces as
    /// [`AppError::Generation`] carrying the assembled context and citation
    /// labels, so the caller can still show the user what was found.
    pub async fn answer(
        &self,
        question: &str,
        retrieved: &RetrievedContext,
        options: &AnswerOptions,
    ) -> AppResult<Answer> {
        if retrieved.is_empty() {
            tracing::info!("No chunks retrieved, returning fixed no-match answer");
            return Ok(Answer {
                answer: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
                retrieved_count: 0,
            });
        }

        let sources: Vec<String> = retrieved.citations.iter().map(Citation::label).collect();
        let prompt = build_prompt(question, &retrieved.context);

        let request = LlmRequest::new(prompt, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature);

        let response = tokio::time::timeout(self.timeout, self.client.complete(&request))
            .await
            .map_err(|_| AppError::Generation {
                message: format!("Generation timed out after {}s", self.timeout.as_secs()),
                context: retrieved.context.clone(),
                sources: sources.clone(),
            })?
            .map_err(|e| AppError::Generation {
                message: e.to_string(),
                context: retrieved.context.clone(),
                sources: sources.clone(),
            })?;

        tracing::debug!(
            "Generated answer from {} chunks via {}",
            retrieved.retrieved_count,
            self.client.provider_name()
        );

        Ok(Answer {
            answer: response.content,
            sources,
            retrieved_count: retrieved.retrieved_count,
        })
    }
}

fn build_prompt(question: &str, context: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}\n\nAnswer:", context, question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::assemble_context;
    use crate::types::RetrievalResult;
    use scoperag_llm::MockClient;

    fn retrieved_one() -> RetrievedContext {
        assemble_context(&[RetrievalResult {
            chunk_id: "finance::q4.md::chunk-0".to_string(),
            text: "Revenue grew 12% in Q4.".to_string(),
            partition: "finance".to_string(),
            source_id: "q4.md".to_string(),
            ordinal: 0,
            score: 0.87,
        }])
    }

    #[tokio::test]
    async fn test_empty_context_skips_generator() {
        let client = Arc::new(MockClient::new());
        let assembler = AnswerAssembler::new(client.clone(), "test-model");

        let answer = assembler
            .answer("anything?", &assemble_context(&[]), &AnswerOptions::default())
            .await
            .unwrap();

        assert_eq!(answer.answer, NO_MATCH_ANSWER);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.retrieved_count, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_carries_citations() {
        let client = Arc::new(MockClient::new());
        let assembler = AnswerAssembler::new(client.clone(), "test-model");

        let answer = assembler
            .answer(
                "How did revenue do?",
                &retrieved_one(),
                &AnswerOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(answer.sources, vec!["q4.md#chunk-0"]);
        assert_eq!(answer.retrieved_count, 1);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contains_context_and_question() {
        let prompt = build_prompt("How did revenue do?", "[finance | q4.md | chunk-0]\ntext\n");
        assert!(prompt.starts_with("Context:\n[finance | q4.md | chunk-0]"));
        assert!(prompt.contains("Question: How did revenue do?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_generator_failure_carries_context_and_sources() {
        let client = Arc::new(MockClient::failing("model unavailable"));
        let assembler = AnswerAssembler::new(client, "test-model");

        match assembler
            .answer("How did revenue do?", &retrieved_one(), &AnswerOptions::default())
            .await
        {
            Err(AppError::Generation {
                message,
                context,
                sources,
            }) => {
                assert!(message.contains("model unavailable"));
                assert!(context.contains("Revenue grew 12% in Q4."));
                assert_eq!(sources, vec!["q4.md#chunk-0"]);
            }
            other => panic!("expected Generation error, got {:?}", other),
        }
    }
}
