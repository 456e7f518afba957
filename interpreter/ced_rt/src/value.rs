//! Runtime values.

use ced_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The fields of a live object instance.
///
/// `class` names the dynamic class the object was constructed as, which is
/// what virtual dispatch consults. Fields from base classes live flattened
/// in the same map.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectData {
    pub class: Name,
    pub fields: FxHashMap<Name, Value>,
}

impl ObjectData {
    pub fn new(class: Name) -> Self {
        ObjectData {
            class,
            fields: FxHashMap::default(),
        }
    }
}

/// A runtime value.
///
/// Objects and arrays are reference types: cloning a `Value` clones the
/// handle, so assignment aliases the same storage the way interpreted C++
/// pointer semantics expect. Everything else is a plain copy.
#[derive(Clone, Debug)]
pub enum Value {
    Void,
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    Double(f64),
    Str(Rc<str>),
    Object(Rc<RefCell<ObjectData>>),
    Array(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn object(data: ObjectData) -> Self {
        Value::Object(Rc::new(RefCell::new(data)))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "nullptr",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    /// C-style truthiness, or `None` where no conversion exists.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            Value::Double(d) => Some(*d != 0.0),
            Value::Char(c) => Some(*c != '\0'),
            Value::Null => Some(false),
            Value::Object(_) | Value::Array(_) => Some(true),
            Value::Void | Value::Str(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(c) => Some(*c as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric value after the usual int-to-double promotion.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(n) => Some(*n as f64),
            Value::Char(c) => Some(*c as u32 as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Rendering for REPL echo and `printf`-less output.
    pub fn render(&self, interner: &StringInterner) -> String {
        match self {
            Value::Void => "(void)".to_owned(),
            Value::Null => "nullptr".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Char(c) => format!("'{c}'"),
            Value::Int(n) => n.to_string(),
            Value::Double(d) => {
                // Keep integral doubles recognizably floating.
                if d.fract() == 0.0 && d.is_finite() {
                    format!("{d:.1}")
                } else {
                    d.to_string()
                }
            }
            Value::Str(s) => format!("\"{s}\""),
            Value::Object(obj) => {
                format!("<{} object>", interner.lookup(obj.borrow().class))
            }
            Value::Array(arr) => {
                let parts: Vec<String> = arr
                    .borrow()
                    .iter()
                    .map(|v| v.render(interner))
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
        }
    }
}

/// Equality: by value for scalars and strings, by identity for objects and
/// arrays.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "(void)"),
            Value::Null => write!(f, "nullptr"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Object(_) => write!(f, "<object>"),
            Value::Array(_) => write!(f, "<array>"),
        }
    }
}
