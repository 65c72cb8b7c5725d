//! The question-answering pipeline.
//!
//! One invocation per question, strictly sequential: greeting
//! short-circuit, similarity retrieval, relevance cutoff, then a single
//! prompt-constrained generation call. Retrieval and generation stay
//! separate steps so a backend failure in either is reported as such and
//! never dressed up as "no answer".

use std::sync::Arc;

use super::greeting;
use super::index::VectorIndex;
use super::store::ScoredChunk;
use super::PipelineError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

/// Returned verbatim when the answer is not present in the retrieved
/// context. The prompt instructs the model to emit exactly this string,
/// and the pipeline returns it directly when retrieval comes up empty.
pub const REFUSAL: &str = "I don’t know based on the given context.";

/// Returned for greeting-style inputs without touching the index or the
/// generation service.
pub const GREETING_REPLY: &str = "Hello! How can I help you today?";

pub struct RagPipeline {
    index: VectorIndex,
    generator: Arc<dyn LlmProvider>,
    relevance_threshold: f32,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(
        index: VectorIndex,
        generator: Arc<dyn LlmProvider>,
        relevance_threshold: f32,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            generator,
            relevance_threshold,
            top_k,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<String, PipelineError> {
        if greeting::is_greeting(question) {
            return Ok(GREETING_REPLY.to_string());
        }

        let results = self.index.search(question, self.top_k).await?;

        let Some(context) = select_context(&results, self.relevance_threshold) else {
            tracing::debug!("no chunk cleared the relevance threshold; refusing");
            return Ok(REFUSAL.to_string());
        };

        let prompt = render_prompt(&context, question);
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);

        self.generator
            .chat(request)
            .await
            .map_err(PipelineError::GenerationBackend)
    }
}

/// Keep chunks scoring at or above the threshold, joined by a blank line
/// in retrieved order. `None` means nothing was relevant enough, a
/// distinct signal from an empty context string and the trigger for the
/// refusal branch.
fn select_context(results: &[ScoredChunk], threshold: f32) -> Option<String> {
    let relevant: Vec<&str> = results
        .iter()
        .filter(|r| r.score >= threshold)
        .map(|r| r.chunk.content.as_str())
        .collect();

    if relevant.is_empty() {
        None
    } else {
        Some(relevant.join("\n\n"))
    }
}

fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "You must answer the question ONLY using the provided context.\n\
         \n\
         If the answer is NOT present in the context,\n\
         respond exactly with:\n\
         \"{REFUSAL}\"\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm::{LlmProvider, ProviderError};
    use crate::rag::{MemoryVectorStore, StoredChunk, VectorStore};

    /// Deterministic stand-in for the external services. Embeds by
    /// keyword buckets and counts every call.
    struct StubProvider {
        embed_calls: AtomicUsize,
        chat_calls: AtomicUsize,
        chat_reply: String,
        fail_chat: bool,
        fail_embed: bool,
    }

    impl StubProvider {
        fn new(chat_reply: &str) -> Self {
            Self {
                embed_calls: AtomicUsize::new(0),
                chat_calls: AtomicUsize::new(0),
                chat_reply: chat_reply.to_string(),
                fail_chat: false,
                fail_embed: false,
            }
        }

        fn embed_text(text: &str) -> Vec<f32> {
            let lower = text.to_lowercase();
            let france = lower.contains("france") || lower.contains("paris");
            let germany = lower.contains("germany") || lower.contains("berlin");
            vec![
                if france { 1.0 } else { 0.0 },
                if germany { 1.0 } else { 0.0 },
                if !france && !germany { 1.0 } else { 0.0 },
            ]
        }
    }

    fn backend_down() -> ProviderError {
        ProviderError::Status {
            provider: "stub",
            status: 503,
            body: "down".to_string(),
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<String, ProviderError> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_chat {
                return Err(backend_down());
            }
            Ok(self.chat_reply.clone())
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
            self.embed_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_embed {
                return Err(backend_down());
            }
            Ok(inputs.iter().map(|text| Self::embed_text(text)).collect())
        }
    }

    fn chunk(id: &str, content: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: id.to_string(),
            content: content.to_string(),
            source: "test".to_string(),
            start_offset: 0,
            chunk_index: 0,
        }
    }

    async fn pipeline_with(
        provider: Arc<StubProvider>,
        seeded: Vec<StoredChunk>,
    ) -> RagPipeline {
        let store = Arc::new(MemoryVectorStore::new());
        let index = VectorIndex::new(store.clone(), provider.clone());

        if !seeded.is_empty() {
            let embeddings: Vec<Vec<f32>> = seeded
                .iter()
                .map(|c| StubProvider::embed_text(&c.content))
                .collect();
            store
                .insert_batch(seeded.into_iter().zip(embeddings).collect())
                .await
                .unwrap();
        }

        RagPipeline::new(index, provider, 0.15, 4)
    }

    #[tokio::test]
    async fn greeting_short_circuits_before_retrieval_and_generation() {
        let provider = Arc::new(StubProvider::new("unused"));
        let pipeline = pipeline_with(provider.clone(), vec![]).await;

        for input in ["hi", "Hello", "  GOOD MORNING  ", "hey!"] {
            let answer = pipeline.answer(input).await.unwrap();
            assert_eq!(answer, GREETING_REPLY);
        }

        assert_eq!(provider.embed_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refuses_without_generation_call_when_nothing_is_relevant() {
        let provider = Arc::new(StubProvider::new("unused"));
        let pipeline = pipeline_with(
            provider.clone(),
            vec![chunk("c1", "Paris is the capital of France.")],
        )
        .await;

        let answer = pipeline
            .answer("What is the capital of Germany?")
            .await
            .unwrap();

        assert_eq!(answer, REFUSAL);
        assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn answers_from_relevant_context() {
        let provider = Arc::new(StubProvider::new("The capital of France is Paris."));
        let pipeline = pipeline_with(
            provider.clone(),
            vec![chunk("c1", "Paris is the capital of France.")],
        )
        .await;

        let answer = pipeline
            .answer("What is the capital of France?")
            .await
            .unwrap();

        assert!(answer.contains("Paris"));
        assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generation_failure_propagates_instead_of_refusing() {
        let mut stub = StubProvider::new("unused");
        stub.fail_chat = true;
        let provider = Arc::new(stub);
        let pipeline = pipeline_with(
            provider.clone(),
            vec![chunk("c1", "Paris is the capital of France.")],
        )
        .await;

        let result = pipeline.answer("What is the capital of France?").await;
        assert!(matches!(result, Err(PipelineError::GenerationBackend(_))));
    }

    #[tokio::test]
    async fn embedding_failure_propagates_instead_of_refusing() {
        let mut stub = StubProvider::new("unused");
        stub.fail_embed = true;
        let provider = Arc::new(stub);
        let pipeline = pipeline_with(provider.clone(), vec![]).await;

        let result = pipeline.answer("What is the capital of France?").await;
        assert!(matches!(result, Err(PipelineError::EmbeddingBackend(_))));
        assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn select_context_joins_relevant_chunks_in_order() {
        let results = vec![
            ScoredChunk {
                chunk: chunk("c1", "first"),
                score: 0.9,
            },
            ScoredChunk {
                chunk: chunk("c2", "second"),
                score: 0.5,
            },
            ScoredChunk {
                chunk: chunk("c3", "below"),
                score: 0.1,
            },
        ];

        let context = select_context(&results, 0.15).unwrap();
        assert_eq!(context, "first\n\nsecond");
    }

    #[test]
    fn select_context_signals_no_match_distinctly() {
        let results = vec![ScoredChunk {
            chunk: chunk("c1", "irrelevant"),
            score: 0.01,
        }];
        assert!(select_context(&results, 0.15).is_none());
        assert!(select_context(&[], 0.15).is_none());
    }

    #[test]
    fn raising_the_threshold_never_adds_context() {
        let results: Vec<ScoredChunk> = (0..5)
            .map(|i| ScoredChunk {
                chunk: chunk(&format!("c{}", i), "text"),
                score: i as f32 / 5.0,
            })
            .collect();

        let count_at = |threshold: f32| {
            select_context(&results, threshold)
                .map(|ctx| ctx.split("\n\n").count())
                .unwrap_or(0)
        };

        let mut previous = usize::MAX;
        for threshold in [0.0, 0.15, 0.4, 0.6, 0.9, 1.0] {
            let current = count_at(threshold);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn prompt_contains_context_question_and_refusal_contract() {
        let prompt = render_prompt("Paris is the capital of France.", "What is the capital?");
        assert!(prompt.contains("ONLY using the provided context"));
        assert!(prompt.contains(REFUSAL));
        assert!(prompt.contains("Paris is the capital of France."));
        assert!(prompt.contains("What is the capital?"));
    }
}
