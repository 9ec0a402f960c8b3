// Library interface for cardsmith

pub mod auth;
pub mod card;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod segment;
pub mod similarity;
pub mod store;

// Re-export commonly used types
pub use card::{CardCandidate, ExistingCard};
pub use config::{ClusterMode, Config, PipelineConfig};
pub use error::{CardsmithError, Result};
pub use pipeline::{CardPipeline, GenerationReport};
pub use store::{Card, CardStore};
