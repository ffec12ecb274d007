//! Metadata-driven dispatch
//!
//! [`DispatchEngine::dispatch`] walks a class's declared elements in
//! declaration order, skips the ones without an annotation, and runs the
//! action the annotation selects:
//!
//! - expected type: execute the element, compare the produced value's exact
//!   runtime type with the annotation's type
//! - strategy: read the element, construct the strategy, evaluate the value
//!
//! Every annotated element admitted by the member filter yields exactly one
//! [`DispatchEntry`]: an [`OutcomeRecord`] or an [`ElementFailure`]. A failing
//! element never hides the elements after it unless `fail_fast` is set.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::config::DispatchOptions;
use crate::error::{DispatchError, Fault, FaultResult, RegistrationError};
use crate::reflect::{
    filtered_elements, is_exact_type, Annotation, AnnotationKind, ClassMetadata,
    DeclaredElement, ElementKind, Introspect,
};
use crate::strategy::StrategyDescriptor;
use crate::types::Type;
use crate::value::Value;

/// Result of dispatching one annotated element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    /// Element name
    pub element: String,
    /// Element shape
    pub kind: ElementKind,
    /// Annotation kind that drove the check
    pub annotation: AnnotationKind,
    /// Expected descriptor: type name or strategy name
    pub expected: String,
    /// Produced or read value
    pub value: Value,
    /// Runtime type name, or `valid` / `invalid` for strategies
    pub actual: String,
    /// Match / valid
    pub verdict: bool,
    /// Error text captured from a failing strategy
    pub diagnostic: Option<String>,
}

/// A per-element error, recorded in place of an outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFailure {
    /// Element name
    pub element: String,
    /// What went wrong
    pub error: DispatchError,
}

/// One entry of a dispatch pass
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEntry {
    /// The element was checked
    Outcome(OutcomeRecord),
    /// The element could not be checked
    Failed(ElementFailure),
}

impl DispatchEntry {
    /// Element name
    pub fn element(&self) -> &str {
        match self {
            DispatchEntry::Outcome(record) => &record.element,
            DispatchEntry::Failed(failure) => &failure.element,
        }
    }

    /// Get the outcome, if the element was checked
    pub fn as_outcome(&self) -> Option<&OutcomeRecord> {
        match self {
            DispatchEntry::Outcome(record) => Some(record),
            DispatchEntry::Failed(_) => None,
        }
    }

    /// Get the error, if the element could not be checked
    pub fn as_error(&self) -> Option<&DispatchError> {
        match self {
            DispatchEntry::Outcome(_) => None,
            DispatchEntry::Failed(failure) => Some(&failure.error),
        }
    }

    /// Whether the element was checked and passed
    pub fn passed(&self) -> bool {
        self.as_outcome().is_some_and(|record| record.verdict)
    }
}

/// All entries produced by one dispatch pass
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    /// Dispatched class name
    pub class: String,
    /// Entries in declaration order
    pub entries: Vec<DispatchEntry>,
    /// False if the pass stopped early because of `fail_fast`
    pub completed: bool,
}

impl DispatchReport {
    /// Successful outcomes
    pub fn outcomes(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.entries.iter().filter_map(DispatchEntry::as_outcome)
    }

    /// Recorded per-element errors
    pub fn failures(&self) -> impl Iterator<Item = &DispatchError> {
        self.entries.iter().filter_map(DispatchEntry::as_error)
    }

    /// Get the entry for an element
    pub fn entry(&self, element: &str) -> Option<&DispatchEntry> {
        self.entries.iter().find(|e| e.element() == element)
    }

    /// Whether every entry is an outcome with a true verdict
    pub fn all_passed(&self) -> bool {
        self.completed && self.entries.iter().all(DispatchEntry::passed)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pass found no annotated element
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the entries
    pub fn into_entries(self) -> Vec<DispatchEntry> {
        self.entries
    }
}

/// Walks annotated elements and runs their checks
///
/// The engine holds only its options; every pass is independent, so one
/// engine can serve many targets, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    options: DispatchOptions,
}

impl DispatchEngine {
    /// Create an engine with the given options
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    /// Engine options
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Dispatch over a type that describes itself
    ///
    /// Fails only if the type's metadata cannot be defined.
    pub fn run<T: Introspect>(&self, target: &T) -> Result<DispatchReport, RegistrationError> {
        let meta = T::class_metadata()?;
        Ok(self.dispatch(meta, target))
    }

    /// Dispatch over `target` using explicit metadata
    pub fn dispatch<T>(&self, meta: &ClassMetadata<T>, target: &T) -> DispatchReport {
        let _span = tracing::debug_span!("dispatch", class = meta.name()).entered();
        let filter = &self.options.members;
        let fail_fast = self.options.dispatch.fail_fast;

        let mut entries = Vec::new();
        let mut completed = true;

        for element in filtered_elements(meta, filter) {
            let Some(annotation) = meta.lookup(&element.name) else {
                continue;
            };

            let entry = match self.dispatch_element(element, annotation, target) {
                Ok(record) => {
                    tracing::debug!(
                        element = %record.element,
                        expected = %record.expected,
                        actual = %record.actual,
                        verdict = record.verdict,
                        "element dispatched"
                    );
                    DispatchEntry::Outcome(record)
                }
                Err(error) => {
                    tracing::warn!(element = %element.name, error = %error, "element failed");
                    DispatchEntry::Failed(ElementFailure {
                        element: element.name.clone(),
                        error,
                    })
                }
            };

            let failed = entry.as_error().is_some();
            entries.push(entry);
            if failed && fail_fast {
                completed = false;
                break;
            }
        }

        DispatchReport {
            class: meta.name().to_string(),
            entries,
            completed,
        }
    }

    fn dispatch_element<T>(
        &self,
        element: &DeclaredElement<T>,
        annotation: &Annotation,
        target: &T,
    ) -> Result<OutcomeRecord, DispatchError> {
        match annotation {
            Annotation::ExpectedType(expected) => self.check_type(element, expected, target),
            Annotation::Strategy(descriptor) => self.validate(element, descriptor, target),
        }
    }

    fn check_type<T>(
        &self,
        element: &DeclaredElement<T>,
        expected: &Type,
        target: &T,
    ) -> Result<OutcomeRecord, DispatchError> {
        let value = self.produce(element, target)?;
        let Some(actual) = value.runtime_type() else {
            return Err(DispatchError::NullResult {
                element: element.name.clone(),
                expected: expected.clone(),
            });
        };

        Ok(OutcomeRecord {
            element: element.name.clone(),
            kind: element.kind(),
            annotation: AnnotationKind::ExpectedType,
            expected: expected.to_string(),
            verdict: is_exact_type(&value, expected),
            actual: actual.to_string(),
            value,
            diagnostic: None,
        })
    }

    fn validate<T>(
        &self,
        element: &DeclaredElement<T>,
        descriptor: &StrategyDescriptor,
        target: &T,
    ) -> Result<OutcomeRecord, DispatchError> {
        let value = self.produce(element, target)?;

        let strategy = self.guarded(|| descriptor.construct()).map_err(|fault| {
            DispatchError::StrategyConstruction {
                element: element.name.clone(),
                strategy: descriptor.name().to_string(),
                message: fault.to_string(),
            }
        })?;

        // Evaluation is always guarded: a failing validator never escapes the pass
        let (verdict, diagnostic) = match recover(|| strategy.evaluate(&value)) {
            Ok(verdict) => (verdict, None),
            Err(fault) => (false, Some(fault.to_string())),
        };

        Ok(OutcomeRecord {
            element: element.name.clone(),
            kind: element.kind(),
            annotation: AnnotationKind::Strategy,
            expected: descriptor.name().to_string(),
            value,
            actual: if verdict { "valid" } else { "invalid" }.to_string(),
            verdict,
            diagnostic,
        })
    }

    /// Read a field or execute a method exactly once
    fn produce<T>(&self, element: &DeclaredElement<T>, target: &T) -> Result<Value, DispatchError> {
        self.guarded(|| element.produce(target))
            .map_err(|fault| DispatchError::ElementExecution {
                element: element.name.clone(),
                message: fault.to_string(),
            })
    }

    /// Run an accessor or strategy constructor, catching panics if enabled
    fn guarded<R>(&self, f: impl FnOnce() -> FaultResult<R>) -> FaultResult<R> {
        if self.options.dispatch.catch_panics {
            recover(f)
        } else {
            f()
        }
    }
}

/// Run `f`, turning a panic into [`Fault::Panic`]
///
/// The process panic hook still runs before the unwind is caught.
fn recover<R>(f: impl FnOnce() -> FaultResult<R>) -> FaultResult<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Fault::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassBuilder;
    use crate::strategy::{NonEmptyString, PositiveNumber};

    struct Sample {
        text: String,
        count: i64,
    }

    fn sample_meta() -> ClassMetadata<Sample> {
        ClassBuilder::new("Sample")
            .field("text", Type::string(), |s: &Sample| s.text.clone())
            .unwrap()
            .field("count", Type::int(), |s: &Sample| s.count)
            .unwrap()
            .method("label", Type::string(), |s: &Sample| format!("{}#{}", s.text, s.count))
            .unwrap()
            .validate_with::<NonEmptyString>("text")
            .unwrap()
            .validate_with::<PositiveNumber>("count")
            .unwrap()
            .expect_type("label", Type::string())
            .unwrap()
            .build()
    }

    #[test]
    fn test_dispatch_outcomes() {
        let engine = DispatchEngine::default();
        let report = engine.dispatch(
            &sample_meta(),
            &Sample {
                text: "a".to_string(),
                count: 2,
            },
        );

        assert!(report.completed);
        assert_eq!(report.len(), 3);
        assert!(report.all_passed());

        let label = report.entry("label").and_then(|e| e.as_outcome()).unwrap();
        assert_eq!(label.value, Value::from("a#2"));
        assert_eq!(label.actual, "string");
        assert_eq!(label.kind, ElementKind::Method);
        assert_eq!(label.annotation, AnnotationKind::ExpectedType);
    }

    #[test]
    fn test_strategy_outcome_fields() {
        let engine = DispatchEngine::default();
        let report = engine.dispatch(
            &sample_meta(),
            &Sample {
                text: String::new(),
                count: -1,
            },
        );

        let text = report.entry("text").and_then(|e| e.as_outcome()).unwrap();
        assert!(!text.verdict);
        assert_eq!(text.actual, "invalid");
        assert_eq!(text.expected, "NonEmptyString");
        assert_eq!(text.kind, ElementKind::Field);
        assert_eq!(text.diagnostic, None);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_report_helpers() {
        let report = DispatchReport {
            class: "Empty".to_string(),
            entries: Vec::new(),
            completed: true,
        };
        assert!(report.is_empty());
        assert!(report.all_passed());
        assert_eq!(report.outcomes().count(), 0);
        assert_eq!(report.failures().count(), 0);
        assert!(report.into_entries().is_empty());
    }
}
