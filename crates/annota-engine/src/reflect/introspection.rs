//! Introspection over declared elements
//!
//! [`Introspect`] ties a Rust type to its [`ClassMetadata`], defined once per
//! process. [`MemberFilter`] decides which declared elements a dispatch pass
//! looks at; the default is the declared-only, instance-scope, public
//! surface of the target's own class.

use serde::{Deserialize, Serialize};

use super::class_metadata::{ClassMetadata, DeclaredElement};
use crate::error::RegistrationError;
use crate::types::Type;
use crate::value::Value;

/// Once-initialized storage for a type's metadata
pub type MetadataCell<T> = once_cell::sync::OnceCell<ClassMetadata<T>>;

/// A type whose declared elements can be dispatched over
///
/// Implementations usually keep the metadata in a [`MetadataCell`]:
///
/// ```rust,ignore
/// impl Introspect for Person {
///     fn class_metadata() -> Result<&'static ClassMetadata<Self>, RegistrationError> {
///         static META: MetadataCell<Person> = MetadataCell::new();
///         META.get_or_try_init(|| {
///             Ok(ClassBuilder::new("Person")
///                 .field("name", Type::string(), |p: &Person| p.name.clone())?
///                 .validate_with::<NonEmptyString>("name")?
///                 .build())
///         })
///     }
/// }
/// ```
///
/// A definition that fails is not cached; the error is returned again on
/// the next call.
pub trait Introspect: Sized + Send + Sync + 'static {
    /// The type's metadata, defined on first use
    fn class_metadata() -> Result<&'static ClassMetadata<Self>, RegistrationError>;
}

/// Which declared elements a dispatch pass considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemberFilter {
    /// Include elements inherited from a supertype
    pub include_inherited: bool,
    /// Include static elements
    pub include_static: bool,
    /// Include non-public elements
    pub include_non_public: bool,
}

impl MemberFilter {
    /// Declared-only, instance-scope, public elements
    pub fn declared_public() -> Self {
        Self::default()
    }

    /// Every element
    pub fn all() -> Self {
        Self {
            include_inherited: true,
            include_static: true,
            include_non_public: true,
        }
    }

    /// Check if an element passes this filter
    pub fn admits<T>(&self, element: &DeclaredElement<T>) -> bool {
        (self.include_inherited || element.is_declared())
            && (self.include_static || !element.is_static)
            && (self.include_non_public || element.is_public())
    }
}

/// Check if a value's runtime type is exactly `expected`
///
/// This is strict equality, not assignability: a `Dog` does not match
/// `Animal` and an `int` does not match `number`. Null never matches.
pub fn is_exact_type(value: &Value, expected: &Type) -> bool {
    value.runtime_type().as_ref() == Some(expected)
}

/// Elements of `meta` admitted by `filter`, in declaration order
pub fn filtered_elements<'a, T>(
    meta: &'a ClassMetadata<T>,
    filter: &'a MemberFilter,
) -> impl Iterator<Item = &'a DeclaredElement<T>> + 'a {
    meta.elements().iter().filter(move |el| filter.admits(*el))
}
