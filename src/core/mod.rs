pub mod analyzer;
pub mod backend;
pub mod config;
pub mod entities;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod research;
pub mod synthesizer;
pub mod types;
pub mod workflow;

pub use analyzer::{heuristic_intent, Analysis, AnalysisSource, RequestAnalyzer};
pub use backend::{GenerativeBackend, SearchBackend, SearchHit};
pub use config::{ConfigLoader, ConfigValidator, FlowsmithConfig};
pub use entities::{Complexity, IntentRecord, ResearchResult, TriggerType};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter, StageError};
pub use pipeline::{GenerationReport, Plan, WorkflowPipeline};
pub use research::ResearchAggregator;
pub use synthesizer::WorkflowSynthesizer;
pub use types::*;
pub use workflow::{FallbackBuilder, Normalizer, WorkflowDocument};
