//! Generation capability seam for producing grounded answers.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns assembled context plus a user query into answer text.
///
/// Prompt framing (flat prompt vs. chat messages) is an implementation
/// detail behind this trait; the engine only requires that framing, context,
/// and query reach the model coherently in a single non-streamed call.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate a grounded answer for `query` given retrieval `context`.
    ///
    /// `context` may be empty when the store held nothing relevant; the
    /// model is expected to state that limitation rather than fabricate.
    async fn generate_answer(&self, context: &str, query: &str) -> Result<String>;
}

/// Render the flat grounding prompt used by [`OllamaClient`](crate::OllamaClient).
///
/// Instructs the model to stay strictly within the supplied context, admit
/// when the context is insufficient, and cite sources in-line.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are an assistant. Use the following context to answer the user's \
         question. Ground your answer strictly in the context; if the context \
         is insufficient, say so.\n\n\
         CONTEXT:\n{context}\n\n\
         QUESTION:\n{query}\n\n\
         Provide a helpful answer and cite the relevant context sources \
         in-line by id or source."
    )
}
