use std::path::PathBuf;

use serde_json::Value;

/// Errors returned while turning a typed value into a JSON tree.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A dynamic field held a value whose runtime type is not one of the
    /// recognized shapes. Carries the type name.
    #[error("unencodable type: {0}")]
    UnencodableType(String),

    /// Writing the encoded bytes to disk failed (permissions, missing
    /// parent directory, full disk, ...).
    #[error("failed to create file {}: {source}", path.display())]
    FailedToCreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// NaN and the infinities have no JSON representation.
    #[error("non-finite double cannot be encoded: {0}")]
    NonFiniteDouble(f64),

    /// The serializer rejected the finished tree.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Nesting went deeper than the configured limit.
    #[error("encode depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },
}

/// Errors returned while reconstructing a typed value from a JSON tree.
///
/// A typed accessor reports `MissingKey` both when the key is absent and when
/// the value under it has the wrong shape; callers cannot tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing or mistyped key: '{0}'")]
    MissingKey(String),

    #[error("invalid url: '{0}'")]
    InvalidUrl(String),

    /// An array that should hold only strings contained something else.
    #[error("unexpected array element: {0}")]
    UnexpectedArrayElement(Value),

    #[error("file not found {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object under this key has at least one value of the wrong type.
    #[error("dictionary under '{0}' has values of the wrong type")]
    BadDictionary(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("decode depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    /// Raised by hand-written `Decodable` impls for domain-level rejections.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    pub fn custom(message: impl Into<String>) -> Self {
        DecodeError::Custom(message.into())
    }

    /// The key this error refers to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::MissingKey(key) | DecodeError::BadDictionary(key) => Some(key),
            _ => None,
        }
    }
}
