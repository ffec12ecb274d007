//! Element metadata and introspection
//!
//! - [`metadata`]: annotations and the per-class annotation registry
//! - [`class_metadata`]: declared elements, class metadata and its builder
//! - [`introspection`]: the [`Introspect`] trait and member filtering
//!
//! ## Usage
//!
//! ```rust,ignore
//! let meta = ClassBuilder::<Greeter>::new("Greeter")
//!     .method("message", Type::string(), |g: &Greeter| g.message())?
//!     .expect_type("message", Type::string())?
//!     .build();
//!
//! assert!(meta.lookup("message").is_some());
//! ```

mod class_metadata;
mod introspection;
mod metadata;

pub use class_metadata::{
    Accessor, ClassBuilder, ClassMetadata, DeclaredElement, ElementKind, Visibility,
};
pub use introspection::{filtered_elements, is_exact_type, Introspect, MemberFilter, MetadataCell};
pub use metadata::{Annotation, AnnotationKind, MetadataRegistry, PropertyKey};
