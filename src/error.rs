use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid YAML template: {0}")]
    InvalidYaml(#[from] serde_yml::Error),

    #[error("invalid JSON template: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid YAML template: unknown intrinsic function tag !{0}")]
    UnknownTag(String),

    #[error("invalid YAML template: mapping keys must be scalars, found {0}")]
    InvalidKey(String),

    #[error("template is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid resource {logical_id:?}: {message}")]
    InvalidResource { logical_id: String, message: String },

    #[error("resource {name:?} of type {resource_type} not found")]
    ResourceNotFound {
        name: String,
        resource_type: &'static str,
    },

    #[error("not an encoded intrinsic function: {0}")]
    InvalidToken(String),

    #[error("failed to serialize template: {0}")]
    Serialize(String),

    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),
}
