//! Values produced by declared elements
//!
//! Every accessor hands the engine a [`Value`]. The value knows its own exact
//! runtime type, which is what expected-type annotations are compared with.
//!
//! A list carries its element type as a tag. Items must match that tag
//! exactly; [`Value::list`] and [`Value::check_homogeneous`] enforce it.

use std::fmt;

use serde::Serialize;

use crate::error::{Fault, FaultResult};
use crate::types::{PrimitiveType, Type};

/// Dynamically typed value read from, or produced by, a declared element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Number(f64),
    /// String
    Str(String),
    /// Homogeneous list, tagged with its element type
    List {
        /// Element type
        element: Type,
        /// Items
        items: Vec<Value>,
    },
    /// Instance of a named class
    Object(ObjectValue),
}

/// Instance of a named class with its field values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectValue {
    /// Class name (exact runtime class)
    pub class: String,
    /// Field name and value pairs, in declaration order
    pub fields: Vec<(String, Value)>,
}

impl ObjectValue {
    /// Create an instance with no fields
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl Value {
    /// Create a list value
    ///
    /// Fails with [`Fault::TypeMismatch`] if an item's runtime type is not
    /// exactly `element`.
    pub fn list(element: Type, items: Vec<Value>) -> FaultResult<Self> {
        let list = Value::List { element, items };
        list.check_homogeneous()?;
        Ok(list)
    }

    /// Check that every list inside this value only holds items of its
    /// element type, recursing into nested lists and object fields
    pub fn check_homogeneous(&self) -> FaultResult<()> {
        match self {
            Value::List { element, items } => {
                for item in items {
                    if item.runtime_type().as_ref() != Some(element) {
                        return Err(Fault::TypeMismatch {
                            expected: element.to_string(),
                            got: item.type_name(),
                        });
                    }
                    item.check_homogeneous()?;
                }
                Ok(())
            }
            Value::Object(obj) => obj.fields.iter().try_for_each(|(_, v)| v.check_homogeneous()),
            _ => Ok(()),
        }
    }

    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64, widening integers
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Exact runtime type of this value
    ///
    /// Returns `None` for [`Value::Null`]: an absent value has no type to
    /// compare against.
    pub fn runtime_type(&self) -> Option<Type> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(Type::Primitive(PrimitiveType::Boolean)),
            Value::Int(_) => Some(Type::Primitive(PrimitiveType::Int)),
            Value::Number(_) => Some(Type::Primitive(PrimitiveType::Number)),
            Value::Str(_) => Some(Type::Primitive(PrimitiveType::String)),
            Value::List { element, .. } => Some(Type::array(element.clone())),
            Value::Object(obj) => Some(Type::Class(obj.class.clone())),
        }
    }

    /// Name of the runtime type, `null` for the absent value
    pub fn type_name(&self) -> String {
        self.runtime_type()
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "null".to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => {
                write!(f, "{}", obj.class)?;
                if obj.fields.is_empty() {
                    return Ok(());
                }
                write!(f, " {{ ")?;
                for (i, (name, value)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_types() {
        assert_eq!(Value::from("hi").runtime_type(), Some(Type::string()));
        assert_eq!(Value::from(42).runtime_type(), Some(Type::int()));
        assert_eq!(Value::from(4.2).runtime_type(), Some(Type::number()));
        assert_eq!(Value::from(true).runtime_type(), Some(Type::boolean()));
        assert_eq!(Value::Null.runtime_type(), None);
        assert_eq!(
            Value::list(Type::int(), vec![Value::Int(1)]).unwrap().runtime_type(),
            Some(Type::array(Type::int()))
        );
        assert_eq!(
            Value::from(ObjectValue::new("Dog")).runtime_type(),
            Some(Type::class("Dog"))
        );
    }

    #[test]
    fn test_list_items_must_match_element_type() {
        let err = Value::list(Type::int(), vec![Value::Int(1), Value::from("two")]).unwrap_err();
        assert_eq!(
            err,
            Fault::TypeMismatch {
                expected: "int".to_string(),
                got: "string".to_string(),
            }
        );

        // Null has no runtime type, so it never matches
        assert!(Value::list(Type::string(), vec![Value::Null]).is_err());

        let nested = Value::List {
            element: Type::array(Type::int()),
            items: vec![Value::List {
                element: Type::int(),
                items: vec![Value::Number(1.5)],
            }],
        };
        assert!(nested.check_homogeneous().is_err());

        let inside_object = Value::from(ObjectValue::new("Bag").with_field(
            "ids",
            Value::List {
                element: Type::int(),
                items: vec![Value::Bool(true)],
            },
        ));
        assert!(inside_object.check_homogeneous().is_err());

        assert!(Value::list(Type::number(), Vec::new()).is_ok());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<&str> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some(7)), Value::Int(7));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(3).as_number(), Some(3.0));
        assert_eq!(Value::Number(1.5).as_int(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("Hello, World!").to_string(), "\"Hello, World!\"");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::list(Type::int(), vec![Value::Int(1), Value::Int(2)])
                .unwrap()
                .to_string(),
            "[1, 2]"
        );
        assert_eq!(Value::Number(30.0).to_string(), "30.0");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        let person = ObjectValue::new("Person")
            .with_field("name", "Ada")
            .with_field("age", 36);
        assert_eq!(
            Value::from(person).to_string(),
            "Person { name: \"Ada\", age: 36 }"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from("x").type_name(), "string");
    }
}
