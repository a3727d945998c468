pub mod job;

pub use job::{JobRecord, SimilarityResult, TenantId};
