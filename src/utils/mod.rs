//! Utility helpers: JSON serializers and file output.
pub mod serialization;

pub use serialization::FileSerializer;
pub use serialization::FileUtils;
pub use serialization::JsonSerializer;
pub use serialization::Serializer;
