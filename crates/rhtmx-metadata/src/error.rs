use thiserror::Error;

/// Configuration errors raised while registering or resolving metadata.
///
/// These are programming defects, not request outcomes: a request that fails
/// validation produces a [`ValidationResult`](crate::ValidationResult), never
/// one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// No descriptor is registered under the requested type name.
    #[error("no metadata registered for type `{0}`")]
    UnknownType(String),
    /// A derived type names a base that has not been registered yet.
    #[error("type `{derived}` extends unregistered base `{base}`")]
    UnknownBase { derived: String, base: String },
    /// The same type name was registered twice.
    #[error("metadata for type `{0}` is already registered")]
    DuplicateType(String),
    /// A field declares a nested or collection type that is not registered.
    #[error("field `{field}` of `{owner}` refers to unregistered type `{target}`")]
    UnknownFieldType {
        owner: String,
        field: String,
        target: String,
    },
    /// A pattern rule carries an expression that does not compile.
    #[error("invalid pattern for field `{field}`: {message}")]
    InvalidPattern { field: String, message: String },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, MetadataError>;
