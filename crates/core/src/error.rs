//! Error types for Sluice.
//!
//! Protocol and topology violations are errors; data-level anomalies such as
//! duplicate or unmatched keys never are.

use alloc::string::String;
use core::fmt;

/// Result type alias for Sluice operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Sluice operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fetch receiver was invoked after its terminal chunk.
    FetchAfterEnd {
        node: String,
    },
    /// A fetch returned without ever delivering its terminal chunk.
    FetchUnterminated {
        node: String,
    },
    /// A transaction named an operation that does not exist.
    UnsupportedAction {
        name: String,
    },
    /// Invalid pipeline structure (duplicate or missing edge, cycle).
    Topology {
        message: String,
    },
    /// Node id not present in the pipeline.
    NodeNotFound {
        node: u32,
    },
    /// Operator name not present in the registry.
    UnknownOperator {
        name: String,
    },
    /// Operator options could not be interpreted.
    InvalidOptions {
        message: String,
    },
    /// An action payload does not fit the action.
    InvalidPayload {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FetchAfterEnd { node } => {
                write!(f, "Fetch receiver of {} invoked after its last chunk", node)
            }
            Error::FetchUnterminated { node } => {
                write!(f, "Fetch on {} returned without a last chunk", node)
            }
            Error::UnsupportedAction { name } => {
                write!(f, "Unsupported action: {}", name)
            }
            Error::Topology { message } => {
                write!(f, "Topology error: {}", message)
            }
            Error::NodeNotFound { node } => {
                write!(f, "Node not found: {}", node)
            }
            Error::UnknownOperator { name } => {
                write!(f, "Unknown operator: {}", name)
            }
            Error::InvalidOptions { message } => {
                write!(f, "Invalid options: {}", message)
            }
            Error::InvalidPayload { message } => {
                write!(f, "Invalid payload: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates a fetch-after-end protocol error.
    pub fn fetch_after_end(node: impl Into<String>) -> Self {
        Error::FetchAfterEnd { node: node.into() }
    }

    /// Creates an unterminated fetch protocol error.
    pub fn fetch_unterminated(node: impl Into<String>) -> Self {
        Error::FetchUnterminated { node: node.into() }
    }

    /// Creates an unsupported action error.
    pub fn unsupported_action(name: impl Into<String>) -> Self {
        Error::UnsupportedAction { name: name.into() }
    }

    /// Creates a topology error.
    pub fn topology(message: impl Into<String>) -> Self {
        Error::Topology {
            message: message.into(),
        }
    }

    /// Creates a node not found error.
    pub fn node_not_found(node: u32) -> Self {
        Error::NodeNotFound { node }
    }

    /// Creates an unknown operator error.
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Error::UnknownOperator { name: name.into() }
    }

    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Error::InvalidOptions {
            message: message.into(),
        }
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Error::InvalidPayload {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by pipeline construction mistakes.
    pub fn is_topology(&self) -> bool {
        matches!(self, Error::Topology { .. } | Error::NodeNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::unsupported_action("upsert");
        assert!(err.to_string().contains("upsert"));

        let err = Error::topology("duplicate edge 1 -> 2");
        assert!(err.to_string().contains("duplicate edge"));

        let err = Error::fetch_after_end("set#3");
        assert!(err.to_string().contains("set#3"));
    }

    #[test]
    fn test_error_constructors() {
        match Error::node_not_found(7) {
            Error::NodeNotFound { node } => assert_eq!(node, 7),
            _ => panic!("Wrong error type"),
        }
        assert!(Error::topology("x").is_topology());
        assert!(!Error::unsupported_action("x").is_topology());
    }
}
