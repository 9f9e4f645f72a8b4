//! Error types for schema generation

/// Errors that abort a generation pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// The type (or a type reachable from it) has no JSON representation
    #[error("Unsupported type {type_name}: {kind} values cannot be described by a schema")]
    UnsupportedType {
        /// Rust name of the offending type
        type_name: String,
        /// Kind that was rejected
        kind: &'static str,
    },

    /// The type re-enters its own expansion without passing through a
    /// definition, or a struct ends up embedding itself
    #[error("Recursive type {type_name} cannot be expanded without references")]
    RecursiveType {
        /// Rust name of the offending type
        type_name: String,
    },
}

/// Result type for schema generation
pub type Result<T> = std::result::Result<T, ReflectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_display() {
        let error = ReflectError::UnsupportedType {
            type_name: "std::sync::mpsc::Sender<u8>".to_string(),
            kind: "channel",
        };
        assert_eq!(
            error.to_string(),
            "Unsupported type std::sync::mpsc::Sender<u8>: channel values cannot be described by a schema"
        );
    }

    #[test]
    fn test_recursive_type_display() {
        let error = ReflectError::RecursiveType {
            type_name: "app::Node".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recursive type app::Node cannot be expanded without references"
        );
    }
}
