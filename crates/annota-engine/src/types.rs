//! Type descriptors for element metadata
//!
//! A [`Type`] is the token an expected-type annotation carries and the token
//! [`Value::runtime_type`](crate::value::Value::runtime_type) produces. Two
//! descriptors are compared with plain structural equality, so `int` never
//! matches `number` and a subclass never matches its base class.
//!
//! The [`representability`] check rejects descriptors that cannot be
//! attached as static metadata: dynamic escape hatches, nullable-qualified
//! types, anonymous structural or tuple shapes, and unresolved type
//! parameters.

use std::fmt;

use serde::Serialize;

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// 64-bit signed integer
    Int,
    /// IEEE 754 double precision
    Number,
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
}

impl PrimitiveType {
    /// Canonical name used in descriptors and reports
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Property of an anonymous structural type: `{ name: T }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertySignature {
    /// Property name
    pub name: String,
    /// Property type
    pub ty: Type,
}

/// A type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum Type {
    /// Primitive type (int, number, string, boolean)
    Primitive(PrimitiveType),

    /// Named (nominal) class type
    Class(String),

    /// Array type: T[]
    Array(Box<Type>),

    /// Named generic instantiation: Map<string, int>
    Generic {
        /// Base type name
        name: String,
        /// Concrete type arguments
        args: Vec<Type>,
    },

    /// Nullable-qualified type: T?
    Nullable(Box<Type>),

    /// Tuple type: [T1, T2, ..., Tn]
    Tuple(Vec<Type>),

    /// Anonymous structural type: { a: T1, b: T2 }
    Object(Vec<PropertySignature>),

    /// Unresolved type parameter: T
    TypeParam(String),

    /// Dynamic type, checked at runtime only
    Dynamic,

    /// Top type
    Unknown,
}

impl Type {
    /// `int`
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    /// `number`
    pub fn number() -> Self {
        Type::Primitive(PrimitiveType::Number)
    }

    /// `string`
    pub fn string() -> Self {
        Type::Primitive(PrimitiveType::String)
    }

    /// `boolean`
    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    /// Named class type
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    /// Array of `element`
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Generic instantiation `name<args...>`
    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Generic {
            name: name.into(),
            args,
        }
    }

    /// Nullable-qualified `inner?`
    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Get the primitive type, if any
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Check that this descriptor can be attached as static metadata
    pub fn check_representable(&self) -> Result<(), Unrepresentable> {
        representability(self)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(element) => match element.as_ref() {
                Type::Nullable(_) => write!(f, "({})[]", element),
                _ => write!(f, "{}[]", element),
            },
            Type::Generic { name, args } => {
                write!(f, "{}<", name)?;
                write_list(f, args)?;
                write!(f, ">")
            }
            Type::Nullable(inner) => write!(f, "{}?", inner),
            Type::Tuple(elements) => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Type::Object(props) => {
                if props.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", prop.name, prop.ty)?;
                }
                write!(f, " }}")
            }
            Type::TypeParam(name) => write!(f, "{}", name),
            Type::Dynamic => write!(f, "dynamic"),
            Type::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Representability
// ============================================================================

/// Why a type descriptor cannot be used as an annotation payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unrepresentable {
    /// `dynamic` / `unknown`: supply a closed, concrete type
    Dynamic,
    /// `T?`: supply the underlying non-nullable type
    Nullable,
    /// Tuple or anonymous object shape: supply a named type
    Anonymous,
    /// Unresolved type parameter: supply a concrete type argument
    TypeParameter,
}

impl fmt::Display for Unrepresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unrepresentable::Dynamic => {
                write!(f, "dynamic types cannot be used as metadata, use a concrete type")
            }
            Unrepresentable::Nullable => {
                write!(f, "nullable types cannot be used as metadata, use the underlying type")
            }
            Unrepresentable::Anonymous => {
                write!(f, "tuple and anonymous object types cannot be used as metadata, use a named type")
            }
            Unrepresentable::TypeParameter => {
                write!(f, "unresolved type parameters cannot be used as metadata")
            }
        }
    }
}

/// Walk a descriptor and report the first unrepresentable component
///
/// Array element types and generic arguments are checked too, so
/// `dynamic[]` and `List<string?>` are rejected like their components.
pub fn representability(ty: &Type) -> Result<(), Unrepresentable> {
    match ty {
        Type::Primitive(_) | Type::Class(_) => Ok(()),
        Type::Array(element) => representability(element),
        Type::Generic { args, .. } => args.iter().try_for_each(representability),
        Type::Nullable(_) => Err(Unrepresentable::Nullable),
        Type::Tuple(_) | Type::Object(_) => Err(Unrepresentable::Anonymous),
        Type::TypeParam(_) => Err(Unrepresentable::TypeParameter),
        Type::Dynamic | Type::Unknown => Err(Unrepresentable::Dynamic),
    }
}
