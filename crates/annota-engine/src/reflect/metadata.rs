//! Element annotation storage
//!
//! Each class owns one [`MetadataRegistry`] mapping element names to the
//! single [`Annotation`] attached to them. Registration validates the payload
//! up front, so a registry that exists only holds representable metadata.
//!
//! The registry is filled while the class is being defined and is read-only
//! afterwards; lookups never fail, absence means "not subject to dispatch".

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::RegistrationError;
use crate::strategy::StrategyDescriptor;
use crate::types::Type;

/// The name of an element on a class
pub type PropertyKey = String;

/// Metadata bound to a declared element
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// The element's produced value must have exactly this runtime type
    ExpectedType(Type),
    /// The element's value is checked by this strategy
    Strategy(StrategyDescriptor),
}

/// Annotation kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// [`Annotation::ExpectedType`]
    ExpectedType,
    /// [`Annotation::Strategy`]
    Strategy,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::ExpectedType => write!(f, "expected-type"),
            AnnotationKind::Strategy => write!(f, "strategy"),
        }
    }
}

impl Annotation {
    /// Expected-type annotation
    pub fn expected(ty: Type) -> Self {
        Annotation::ExpectedType(ty)
    }

    /// Strategy annotation for a default-constructible strategy
    pub fn strategy<S>() -> Self
    where
        S: crate::strategy::Strategy + Default + 'static,
    {
        Annotation::Strategy(StrategyDescriptor::of::<S>())
    }

    /// Kind of this annotation
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::ExpectedType(_) => AnnotationKind::ExpectedType,
            Annotation::Strategy(_) => AnnotationKind::Strategy,
        }
    }

    /// Payload type descriptor, if the annotation carries one
    pub fn payload_type(&self) -> Option<&Type> {
        match self {
            Annotation::ExpectedType(ty) => Some(ty),
            Annotation::Strategy(_) => None,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::ExpectedType(ty) => write!(f, "{}", ty),
            Annotation::Strategy(desc) => write!(f, "{}", desc.name()),
        }
    }
}

/// Annotations attached to the elements of one class
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    /// Owning class name (for error messages)
    class: String,
    /// Element name -> annotation
    entries: FxHashMap<PropertyKey, Annotation>,
}

impl MetadataRegistry {
    /// Create an empty registry for `class`
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            entries: FxHashMap::default(),
        }
    }

    /// Owning class name
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Attach an annotation to an element
    ///
    /// Fails if the element already carries an annotation or if the payload
    /// type is not representable. The registry is unchanged on failure.
    pub fn attach(
        &mut self,
        element: impl Into<PropertyKey>,
        annotation: Annotation,
    ) -> Result<(), RegistrationError> {
        let element = element.into();

        if let Some(existing) = self.entries.get(&element) {
            return Err(RegistrationError::DuplicateAnnotation {
                class: self.class.clone(),
                element,
                existing: format!("{} {}", existing.kind(), existing),
            });
        }

        if let Some(ty) = annotation.payload_type() {
            if let Err(reason) = ty.check_representable() {
                return Err(RegistrationError::UnrepresentableType {
                    class: self.class.clone(),
                    element,
                    ty: ty.clone(),
                    reason,
                });
            }
        }

        tracing::trace!(
            class = %self.class,
            element = %element,
            kind = %annotation.kind(),
            payload = %annotation,
            "annotation attached"
        );
        self.entries.insert(element, annotation);
        Ok(())
    }

    /// Get the annotation attached to an element
    pub fn lookup(&self, element: &str) -> Option<&Annotation> {
        self.entries.get(element)
    }

    /// Check if an element carries an annotation
    pub fn has_annotation(&self, element: &str) -> bool {
        self.entries.contains_key(element)
    }

    /// Names of all annotated elements (unordered)
    pub fn annotated_elements(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    /// Number of annotated elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no element is annotated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
