//! Answer generation for the send route.
//!
//! The route never fails because of the model: emergency queries get a fixed
//! safety message, and generator errors are replaced by an apology.

use async_trait::async_trait;
use tracing::error;

/// Phrases that mark a query as a possible medical emergency.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "heavy bleeding",
    "severe pain",
    "unconscious",
    "seizure",
    "cannot breathe",
    "emergency",
    "miscarriage",
];

/// Reply to emergency queries.
pub const EMERGENCY_ANSWER: &str = "This may be a medical emergency. \
    Please seek immediate medical care or consult a healthcare professional.";

/// Reply when the generator fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't process your question right now. Please try again.";

/// Produces the assistant's reply to a query.
#[async_trait]
pub trait Answerer: Send + Sync + std::fmt::Debug {
    async fn answer(&self, query: &str) -> anyhow::Result<String>;
}

/// Whether the query mentions an emergency keyword.
#[must_use]
pub fn is_emergency(query: &str) -> bool {
    let lower = query.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Reply to `query`, short-circuiting emergencies.
///
/// Informational questions ("what is a miscarriage") still go to the
/// generator.
pub async fn respond(answerer: &dyn Answerer, query: &str) -> String {
    if is_emergency(query) && !query.to_lowercase().contains("what") {
        return EMERGENCY_ANSWER.to_string();
    }

    match answerer.answer(query).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, "answer generation failed");
            FALLBACK_ANSWER.to_string()
        }
    }
}
