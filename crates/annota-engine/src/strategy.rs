//! Validation strategies
//!
//! A strategy annotation stores a [`StrategyDescriptor`]: a name plus a
//! constructor. The engine constructs a fresh strategy for every element it
//! dispatches and calls [`Strategy::evaluate`] once with the element's value.

use std::fmt;
use std::sync::Arc;

use crate::error::{Fault, FaultResult};
use crate::value::Value;

/// A constructible object with a single `evaluate` capability
pub trait Strategy: Send + Sync {
    /// Decide whether `value` is valid
    ///
    /// Returning `Err` (or panicking) is recorded as a failed verdict with
    /// the error text as diagnostic.
    fn evaluate(&self, value: &Value) -> FaultResult<bool>;
}

/// Constructor stored in a strategy descriptor
pub type StrategyCtor = Arc<dyn Fn() -> FaultResult<Box<dyn Strategy>> + Send + Sync>;

/// Names a strategy and knows how to construct it
#[derive(Clone)]
pub struct StrategyDescriptor {
    name: String,
    ctor: StrategyCtor,
}

impl StrategyDescriptor {
    /// Descriptor for a default-constructible strategy
    ///
    /// The name is the unqualified Rust type name.
    pub fn of<S>() -> Self
    where
        S: Strategy + Default + 'static,
    {
        Self {
            name: short_type_name::<S>().to_string(),
            ctor: Arc::new(|| Ok(Box::new(S::default()) as Box<dyn Strategy>)),
        }
    }

    /// Descriptor with an explicit, possibly failing constructor
    pub fn with_constructor(
        name: impl Into<String>,
        ctor: impl Fn() -> FaultResult<Box<dyn Strategy>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            ctor: Arc::new(ctor),
        }
    }

    /// Strategy name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a fresh strategy instance
    pub fn construct(&self) -> FaultResult<Box<dyn Strategy>> {
        (self.ctor)()
    }
}

impl fmt::Debug for StrategyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for StrategyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Generic arguments may contain `::` themselves
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ============================================================================
// Built-in strategies
// ============================================================================

fn mismatch(expected: &str, value: &Value) -> Fault {
    Fault::TypeMismatch {
        expected: expected.to_string(),
        got: value.type_name(),
    }
}

/// Valid when the value is a string with at least one character
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyString;

impl Strategy for NonEmptyString {
    fn evaluate(&self, value: &Value) -> FaultResult<bool> {
        let s = value.as_str().ok_or_else(|| mismatch("string", value))?;
        Ok(!s.is_empty())
    }
}

/// Valid when the value is a string with non-whitespace content
#[derive(Debug, Default, Clone, Copy)]
pub struct NotBlank;

impl Strategy for NotBlank {
    fn evaluate(&self, value: &Value) -> FaultResult<bool> {
        let s = value.as_str().ok_or_else(|| mismatch("string", value))?;
        Ok(!s.trim().is_empty())
    }
}

/// Valid when the value is a number strictly greater than zero
#[derive(Debug, Default, Clone, Copy)]
pub struct PositiveNumber;

impl Strategy for PositiveNumber {
    fn evaluate(&self, value: &Value) -> FaultResult<bool> {
        let n = value.as_number().ok_or_else(|| mismatch("number", value))?;
        Ok(n > 0.0)
    }
}

/// Valid when the value is a number greater than or equal to zero
#[derive(Debug, Default, Clone, Copy)]
pub struct NonNegativeNumber;

impl Strategy for NonNegativeNumber {
    fn evaluate(&self, value: &Value) -> FaultResult<bool> {
        let n = value.as_number().ok_or_else(|| mismatch("number", value))?;
        Ok(n >= 0.0)
    }
}

/// Descriptors for every built-in strategy
pub fn builtin_strategies() -> Vec<StrategyDescriptor> {
    vec![
        StrategyDescriptor::of::<NonEmptyString>(),
        StrategyDescriptor::of::<NotBlank>(),
        StrategyDescriptor::of::<PositiveNumber>(),
        StrategyDescriptor::of::<NonNegativeNumber>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_name() {
        assert_eq!(StrategyDescriptor::of::<NonEmptyString>().name(), "NonEmptyString");
        assert_eq!(StrategyDescriptor::of::<PositiveNumber>().name(), "PositiveNumber");
    }

    #[test]
    fn test_non_empty_string() {
        let s = NonEmptyString;
        assert_eq!(s.evaluate(&Value::from("Ada")), Ok(true));
        assert_eq!(s.evaluate(&Value::from("")), Ok(false));
        assert!(s.evaluate(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert_eq!(NotBlank.evaluate(&Value::from("   ")), Ok(false));
        assert_eq!(NotBlank.evaluate(&Value::from(" x ")), Ok(true));
    }

    #[test]
    fn test_positive_number() {
        let s = PositiveNumber;
        assert_eq!(s.evaluate(&Value::Int(30)), Ok(true));
        assert_eq!(s.evaluate(&Value::Int(-5)), Ok(false));
        assert_eq!(s.evaluate(&Value::Int(0)), Ok(false));
        assert_eq!(s.evaluate(&Value::Number(0.5)), Ok(true));
        assert_eq!(
            s.evaluate(&Value::Null),
            Err(Fault::TypeMismatch {
                expected: "number".to_string(),
                got: "null".to_string(),
            })
        );
    }

    #[test]
    fn test_non_negative_number() {
        assert_eq!(NonNegativeNumber.evaluate(&Value::Int(0)), Ok(true));
        assert_eq!(NonNegativeNumber.evaluate(&Value::Number(-0.1)), Ok(false));
    }

    #[test]
    fn test_fallible_constructor() {
        let desc = StrategyDescriptor::with_constructor("Broken", || {
            Err(Fault::Message("missing pattern".to_string()))
        });
        assert_eq!(desc.name(), "Broken");
        assert!(desc.construct().is_err());

        let ok = StrategyDescriptor::of::<NotBlank>();
        let strategy = ok.construct().unwrap();
        assert_eq!(strategy.evaluate(&Value::from("a")), Ok(true));
    }

    #[test]
    fn test_builtin_catalog() {
        let names: Vec<_> = builtin_strategies()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["NonEmptyString", "NotBlank", "PositiveNumber", "NonNegativeNumber"]
        );
    }
}
