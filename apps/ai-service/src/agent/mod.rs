//! Career-advice agent: resume analysis, tenant-scoped context retrieval and a
//! final recommendation, run as one fixed sequence per request.

pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use pipeline::{AgentRequest, RecommendationPipeline};
