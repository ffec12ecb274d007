//! Class metadata for dispatch
//!
//! A [`ClassMetadata`] is the static description of one Rust type as seen by
//! the dispatch engine: its ordered list of declared elements (fields and
//! no-argument methods) and the annotations attached to them. It is built
//! once through a [`ClassBuilder`], which rejects bad declarations as soon as
//! they are made.
//!
//! ```rust,ignore
//! let meta = ClassBuilder::<Person>::new("Person")
//!     .field("name", Type::string(), |p| p.name.clone())?
//!     .field("age", Type::int(), |p| p.age)?
//!     .validate_with::<NonEmptyString>("name")?
//!     .validate_with::<PositiveNumber>("age")?
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::metadata::{Annotation, MetadataRegistry};
use crate::error::{FaultResult, RegistrationError};
use crate::strategy::{Strategy, StrategyDescriptor};
use crate::types::Type;
use crate::value::Value;

/// Shape of a declared element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Stored value, read without side effects
    Field,
    /// No-argument method, executed to obtain its value
    Method,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Field => write!(f, "field"),
            ElementKind::Method => write!(f, "method"),
        }
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Part of the public surface
    #[default]
    Public,
    /// Hidden from the public surface
    Private,
}

/// How an element obtains its value from a target
pub enum Accessor<T> {
    /// Field read
    Field(Arc<dyn Fn(&T) -> Value + Send + Sync>),
    /// Method execution
    Method(Arc<dyn Fn(&T) -> FaultResult<Value> + Send + Sync>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field(f) => Accessor::Field(Arc::clone(f)),
            Accessor::Method(m) => Accessor::Method(Arc::clone(m)),
        }
    }
}

/// A named member of a class
pub struct DeclaredElement<T> {
    /// Element name, unique within the class
    pub name: String,
    /// Declared (static) type
    pub declared_type: Type,
    /// Visibility
    pub visibility: Visibility,
    /// Whether the element is static
    pub is_static: bool,
    /// Class the element is inherited from, `None` if declared here
    pub inherited_from: Option<String>,
    accessor: Accessor<T>,
}

impl<T> DeclaredElement<T> {
    /// Public instance field
    pub fn field<V, F>(name: impl Into<String>, declared_type: Type, getter: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::with_accessor(
            name,
            declared_type,
            Accessor::Field(Arc::new(move |target: &T| getter(target).into())),
        )
    }

    /// Public instance method that always produces a value
    pub fn method<V, F>(name: impl Into<String>, return_type: Type, body: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::with_accessor(
            name,
            return_type,
            Accessor::Method(Arc::new(move |target: &T| Ok(body(target).into()))),
        )
    }

    /// Public instance method that may fail
    pub fn try_method<V, F>(name: impl Into<String>, return_type: Type, body: F) -> Self
    where
        F: Fn(&T) -> FaultResult<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::with_accessor(
            name,
            return_type,
            Accessor::Method(Arc::new(move |target: &T| body(target).map(Into::into))),
        )
    }

    fn with_accessor(name: impl Into<String>, declared_type: Type, accessor: Accessor<T>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            visibility: Visibility::Public,
            is_static: false,
            inherited_from: None,
            accessor,
        }
    }

    /// Mark as private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as inherited from `class`
    pub fn inherited_from(mut self, class: impl Into<String>) -> Self {
        self.inherited_from = Some(class.into());
        self
    }

    /// Element shape
    pub fn kind(&self) -> ElementKind {
        match self.accessor {
            Accessor::Field(_) => ElementKind::Field,
            Accessor::Method(_) => ElementKind::Method,
        }
    }

    /// Whether the element is declared on its own class
    pub fn is_declared(&self) -> bool {
        self.inherited_from.is_none()
    }

    /// Whether the element is part of the public surface
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Read the field or execute the method
    ///
    /// A produced list whose items do not match its element type is a
    /// [`Fault::TypeMismatch`](crate::error::Fault::TypeMismatch).
    pub fn produce(&self, target: &T) -> FaultResult<Value> {
        let value = match &self.accessor {
            Accessor::Field(get) => get(target),
            Accessor::Method(call) => call(target)?,
        };
        value.check_homogeneous()?;
        Ok(value)
    }
}

impl<T> Clone for DeclaredElement<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declared_type: self.declared_type.clone(),
            visibility: self.visibility,
            is_static: self.is_static,
            inherited_from: self.inherited_from.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> fmt::Debug for DeclaredElement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredElement")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("declared_type", &self.declared_type)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("inherited_from", &self.inherited_from)
            .finish()
    }
}

// ============================================================================
// ClassMetadata
// ============================================================================

/// Dispatch metadata for a single class
pub struct ClassMetadata<T> {
    /// Class name
    name: String,
    /// Parent class name (if any)
    parent: Option<String>,
    /// Elements in declaration order
    elements: Vec<DeclaredElement<T>>,
    /// Element name to index mapping
    element_indices: FxHashMap<String, usize>,
    /// Annotations keyed by element name
    annotations: MetadataRegistry,
}

impl<T> ClassMetadata<T> {
    /// Start defining a class
    pub fn builder(name: impl Into<String>) -> ClassBuilder<T> {
        ClassBuilder::new(name)
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// All elements in declaration order
    pub fn elements(&self) -> &[DeclaredElement<T>] {
        &self.elements
    }

    /// Get element by name
    pub fn element(&self, name: &str) -> Option<&DeclaredElement<T>> {
        self.element_index(name).map(|idx| &self.elements[idx])
    }

    /// Get the declaration index of an element
    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.element_indices.get(name).copied()
    }

    /// Check if element exists
    pub fn has_element(&self, name: &str) -> bool {
        self.element_indices.contains_key(name)
    }

    /// Annotation attached to an element
    pub fn lookup(&self, element: &str) -> Option<&Annotation> {
        self.annotations.lookup(element)
    }

    /// The class's annotation registry
    pub fn annotations(&self) -> &MetadataRegistry {
        &self.annotations
    }

    /// Annotated elements in declaration order
    pub fn annotated(&self) -> impl Iterator<Item = (&DeclaredElement<T>, &Annotation)> + '_ {
        self.elements
            .iter()
            .filter_map(|el| self.annotations.lookup(&el.name).map(|a| (el, a)))
    }
}

impl<T> fmt::Debug for ClassMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("elements", &self.elements)
            .field("annotations", &self.annotations)
            .finish()
    }
}

// ============================================================================
// ClassBuilder
// ============================================================================

/// Builds a [`ClassMetadata`], failing fast on invalid declarations
pub struct ClassBuilder<T> {
    meta: ClassMetadata<T>,
}

impl<T> ClassBuilder<T> {
    /// Start a class definition
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            meta: ClassMetadata {
                annotations: MetadataRegistry::new(name.clone()),
                name,
                parent: None,
                elements: Vec::new(),
                element_indices: FxHashMap::default(),
            },
        }
    }

    /// Set the parent class name
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.meta.parent = Some(parent.into());
        self
    }

    /// Declare an element
    pub fn declare(mut self, element: DeclaredElement<T>) -> Result<Self, RegistrationError> {
        if self.meta.has_element(&element.name) {
            return Err(RegistrationError::DuplicateElement {
                class: self.meta.name.clone(),
                element: element.name,
            });
        }
        let index = self.meta.elements.len();
        self.meta.element_indices.insert(element.name.clone(), index);
        self.meta.elements.push(element);
        Ok(self)
    }

    /// Declare a public instance field
    pub fn field<V, F>(self, name: &str, ty: Type, getter: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.declare(DeclaredElement::field(name, ty, getter))
    }

    /// Declare a public instance method
    pub fn method<V, F>(self, name: &str, ty: Type, body: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.declare(DeclaredElement::method(name, ty, body))
    }

    /// Declare a public instance method that may fail
    pub fn try_method<V, F>(self, name: &str, ty: Type, body: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&T) -> FaultResult<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.declare(DeclaredElement::try_method(name, ty, body))
    }

    /// Attach an annotation to a declared element
    pub fn annotate(mut self, element: &str, annotation: Annotation) -> Result<Self, RegistrationError> {
        if !self.meta.has_element(element) {
            return Err(RegistrationError::UnknownElement {
                class: self.meta.name.clone(),
                element: element.to_string(),
            });
        }
        self.meta.annotations.attach(element, annotation)?;
        Ok(self)
    }

    /// Attach an expected-type annotation
    pub fn expect_type(self, element: &str, ty: Type) -> Result<Self, RegistrationError> {
        self.annotate(element, Annotation::ExpectedType(ty))
    }

    /// Attach a default-constructible strategy
    pub fn validate_with<S>(self, element: &str) -> Result<Self, RegistrationError>
    where
        S: Strategy + Default + 'static,
    {
        self.annotate(element, Annotation::Strategy(StrategyDescriptor::of::<S>()))
    }

    /// Attach a strategy descriptor
    pub fn validate_with_descriptor(
        self,
        element: &str,
        descriptor: StrategyDescriptor,
    ) -> Result<Self, RegistrationError> {
        self.annotate(element, Annotation::Strategy(descriptor))
    }

    /// Finish the definition
    pub fn build(self) -> ClassMetadata<T> {
        tracing::debug!(
            class = %self.meta.name,
            elements = self.meta.elements.len(),
            annotated = self.meta.annotations.len(),
            "class metadata defined"
        );
        self.meta
    }
}
