// RHTMX Metadata - model validation driven by registered metadata
// Rules live in an explicit per-type table; derived types are flattened at registration

pub mod context;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod registry;
pub mod result;
pub mod rules;
pub mod value;

pub use context::ValidationContext;
pub use descriptor::{ClassRule, FieldDescriptor, FieldKind, FieldSource, MetadataDescriptor, TypeMetadata};
pub use engine::Validator;
pub use error::{MetadataError, Result};
pub use registry::{HeaderMatch, MetadataRegistry, Variant};
pub use result::ValidationResult;
pub use rules::{Rule, RuleKind};
pub use value::Value;
