//! Error types for registration and dispatch

use crate::types::{Type, Unrepresentable};

/// Errors raised while a type's metadata is being declared
///
/// These fail fast: the declaration that triggered them is rejected and the
/// registry is left as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    /// Element already carries an annotation
    #[error("Element '{class}.{element}' already carries an annotation ({existing})")]
    DuplicateAnnotation {
        /// Owning class name
        class: String,
        /// Element name
        element: String,
        /// Descriptor of the annotation already attached
        existing: String,
    },

    /// Annotation payload type cannot be represented as static metadata
    #[error("Type '{ty}' on '{class}.{element}' is not representable: {reason}")]
    UnrepresentableType {
        /// Owning class name
        class: String,
        /// Element name
        element: String,
        /// Offending type descriptor
        ty: Type,
        /// Rejected category
        reason: Unrepresentable,
    },

    /// Element name declared twice on the same class
    #[error("Element '{class}.{element}' is already declared")]
    DuplicateElement {
        /// Owning class name
        class: String,
        /// Element name
        element: String,
    },

    /// Annotation targets an element the class does not declare
    #[error("Class '{class}' has no element named '{element}'")]
    UnknownElement {
        /// Owning class name
        class: String,
        /// Element name
        element: String,
    },
}

/// Per-element errors raised during a dispatch pass
///
/// The engine records these next to successful outcomes instead of aborting
/// the pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Method-shaped element failed while producing its value
    #[error("Element '{element}' failed during execution: {message}")]
    ElementExecution {
        /// Element name
        element: String,
        /// Failure message
        message: String,
    },

    /// Strategy could not be constructed
    #[error("Strategy '{strategy}' for element '{element}' could not be constructed: {message}")]
    StrategyConstruction {
        /// Element name
        element: String,
        /// Strategy name
        strategy: String,
        /// Failure message
        message: String,
    },

    /// Element produced null where a typed value was expected
    #[error("Element '{element}' produced null, expected a value of type '{expected}'")]
    NullResult {
        /// Element name
        element: String,
        /// Expected type descriptor
        expected: Type,
    },
}

impl DispatchError {
    /// Name of the element this error belongs to
    pub fn element(&self) -> &str {
        match self {
            DispatchError::ElementExecution { element, .. } => element,
            DispatchError::StrategyConstruction { element, .. } => element,
            DispatchError::NullResult { element, .. } => element,
        }
    }

    /// Short machine-readable kind, used by reporters
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ElementExecution { .. } => "element_execution",
            DispatchError::StrategyConstruction { .. } => "strategy_construction",
            DispatchError::NullResult { .. } => "null_result",
        }
    }
}

/// Failure reported by an accessor or a strategy
///
/// Accessors return this when a method-shaped element cannot produce a value;
/// strategies return it when `evaluate` cannot decide.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Fault {
    /// Value has the wrong type for the operation
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Code panicked
    #[error("panicked: {0}")]
    Panic(String),

    /// Any other failure
    #[error("{0}")]
    Message(String),
}

impl From<String> for Fault {
    fn from(s: String) -> Self {
        Fault::Message(s)
    }
}

impl From<&str> for Fault {
    fn from(s: &str) -> Self {
        Fault::Message(s.to_string())
    }
}

/// Result type for accessors and strategies
pub type FaultResult<T> = Result<T, Fault>;
