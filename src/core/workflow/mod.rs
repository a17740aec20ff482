//! Workflow document model, repair, and inspection.

pub mod extract;
pub mod fallback;
pub mod inspect;
pub mod normalize;
pub mod schema;

pub use extract::{extract_json_object, parse_generated, GeneratedOutput};
pub use fallback::FallbackBuilder;
pub use inspect::{InspectionReport, WorkflowStats};
pub use normalize::Normalizer;
pub use schema::{ConnectionLink, Node, WorkflowDocument};
