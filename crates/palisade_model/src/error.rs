//! Error types for the object model.

use thiserror::Error;

use crate::detail::DetailLevel;
use crate::registry::ObjectType;
use crate::uid::Uid;

/// Errors raised while parsing response documents or serializing objects.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A `details-level` token was not one of `uid`, `standard` or `full`.
    #[error("unknown detail level `{0}`")]
    UnknownDetailLevel(String),

    /// A field was read from an object that has not been fetched deeply
    /// enough to carry it.
    #[error("field `{field}` requires {required} detail but object was fetched at {actual}")]
    DetailTooLow {
        /// The field that was accessed.
        field: &'static str,
        /// The level the object currently holds.
        actual: DetailLevel,
        /// The minimum level at which the field is populated.
        required: DetailLevel,
    },

    /// An object node in a response carried no usable `uid`.
    #[error("object node of type `{type_tag}` has no uid")]
    MissingUid {
        /// The discriminator found on the node, or `object` when absent.
        type_tag: String,
    },

    /// An object node in a response carried no `type` discriminator.
    #[error("object node `{uid}` has no type discriminator")]
    MissingType {
        /// The identifier the node carried.
        uid: String,
    },

    /// The server returned an object under a uid that is already cached with
    /// a different concrete type.
    #[error("uid {uid} is cached as `{cached}` but the response says `{incoming}`")]
    TypeConflict {
        /// The identifier both nodes claim.
        uid: Uid,
        /// Type of the instance already in the cache.
        cached: ObjectType,
        /// Type carried by the conflicting node.
        incoming: ObjectType,
    },

    /// A response node did not have the shape the wire format promises.
    #[error("malformed response node: {0}")]
    Malformed(String),
}

impl ModelError {
    /// Shorthand for [`ModelError::Malformed`].
    pub fn malformed(context: impl Into<String>) -> Self {
        ModelError::Malformed(context.into())
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_error_names_both_levels() {
        let err = ModelError::DetailTooLow {
            field: "members",
            actual: DetailLevel::Standard,
            required: DetailLevel::Full,
        };
        let text = err.to_string();
        assert!(text.contains("members"));
        assert!(text.contains("standard"));
        assert!(text.contains("full"));
    }

    #[test]
    fn conflict_error_names_both_types() {
        let err = ModelError::TypeConflict {
            uid: Uid::new("u1"),
            cached: ObjectType::Host,
            incoming: ObjectType::Network,
        };
        let text = err.to_string();
        assert!(text.contains("host"));
        assert!(text.contains("network"));
    }
}
