//! Annota engine: declarative element metadata and metadata-driven dispatch
//!
//! Types describe their fields and no-argument methods once, attaching at
//! most one annotation per element: an expected result type, or a
//! validation strategy. At run time the [`DispatchEngine`] walks a target's
//! annotated elements in declaration order and produces one
//! [`DispatchEntry`] per element.
//!
//! # Example
//!
//! ```ignore
//! use annota_engine::{ClassBuilder, DispatchEngine, Type};
//!
//! struct Greeter;
//!
//! let meta = ClassBuilder::<Greeter>::new("Greeter")
//!     .method("message", Type::string(), |_: &Greeter| "Hello, World!")?
//!     .method("number", Type::int(), |_: &Greeter| 42)?
//!     .expect_type("message", Type::string())?
//!     .expect_type("number", Type::string())?
//!     .build();
//!
//! let report = DispatchEngine::default().dispatch(&meta, &Greeter);
//! assert!(report.entries[0].passed());
//! assert!(!report.entries[1].passed());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: type descriptors and the representability check
//! - [`value`]: dynamically typed element values
//! - [`reflect`]: annotations, class metadata, introspection
//! - [`strategy`]: the validation capability and built-in strategies
//! - [`dispatch`]: the dispatch engine and its outcome records
//! - [`report`]: reporters and summaries
//! - [`config`]: engine options, loadable from TOML

#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod reflect;
pub mod report;
pub mod strategy;
pub mod types;
pub mod value;

pub use config::{ConfigError, DispatchOptions, DispatchSettings};
pub use dispatch::{DispatchEngine, DispatchEntry, DispatchReport, ElementFailure, OutcomeRecord};
pub use error::{DispatchError, Fault, FaultResult, RegistrationError};
pub use reflect::{
    Annotation, AnnotationKind, ClassBuilder, ClassMetadata, DeclaredElement, ElementKind,
    Introspect, MemberFilter, MetadataCell, MetadataRegistry, Visibility,
};
pub use report::{describe_outcome, JsonReporter, Reporter, Summary, TextReporter};
pub use strategy::{
    builtin_strategies, NonEmptyString, NonNegativeNumber, NotBlank, PositiveNumber, Strategy,
    StrategyDescriptor,
};
pub use types::{PrimitiveType, Type, Unrepresentable};
pub use value::{ObjectValue, Value};
