//! Oracles that resolve well-known library fields and methods to concrete values
//!
//! Executors for field and invoke instructions normally only know the declared type of the
//! result. When an oracle is installed (see [`Lookups`]), they ask it first: for example
//! `Math.max(3, 5)` with both arguments known folds to `int 5`. An oracle that cannot help
//! returns [`LookupError::Miss`], and one whose computation fails (`Math.floorDiv(0, 0)`)
//! returns [`LookupError::Evaluation`]. Either way the executor falls back to an unknown value
//! of the declared type.
//!
//! The built-in tables are read-only and built once, on first use.

use crate::analysis::{FieldRef, MethodRef, Value};
use crate::jvm::{BinaryName, FieldType};
use thiserror::Error;

mod get_static;
mod invoke_static;
mod invoke_virtual;

pub use get_static::BasicGetStaticLookup;
pub use invoke_static::BasicInvokeStaticLookup;
pub use invoke_virtual::BasicInvokeVirtualLookup;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The oracle has nothing for this member or these arguments
    #[error("no lookup")]
    Miss,

    /// The computation would throw at runtime
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// Resolves `getfield`
pub trait GetFieldLookup: Send + Sync {
    fn get_field(&self, field: &FieldRef, owner: &Value) -> Result<Value, LookupError>;
}

/// Resolves `getstatic`
pub trait GetStaticLookup: Send + Sync {
    fn get_static(&self, field: &FieldRef) -> Result<Value, LookupError>;
}

/// Resolves `invokestatic`
pub trait InvokeStaticLookup: Send + Sync {
    fn invoke_static(&self, method: &MethodRef, arguments: &[Value]) -> Result<Value, LookupError>;
}

/// Resolves `invokevirtual` and `invokeinterface`
pub trait InvokeVirtualLookup: Send + Sync {
    fn invoke_virtual(
        &self,
        method: &MethodRef,
        receiver: &Value,
        arguments: &[Value],
    ) -> Result<Value, LookupError>;
}

impl<F> GetFieldLookup for F
where
    F: Fn(&FieldRef, &Value) -> Result<Value, LookupError> + Send + Sync,
{
    fn get_field(&self, field: &FieldRef, owner: &Value) -> Result<Value, LookupError> {
        self(field, owner)
    }
}

impl<F> GetStaticLookup for F
where
    F: Fn(&FieldRef) -> Result<Value, LookupError> + Send + Sync,
{
    fn get_static(&self, field: &FieldRef) -> Result<Value, LookupError> {
        self(field)
    }
}

impl<F> InvokeStaticLookup for F
where
    F: Fn(&MethodRef, &[Value]) -> Result<Value, LookupError> + Send + Sync,
{
    fn invoke_static(&self, method: &MethodRef, arguments: &[Value]) -> Result<Value, LookupError> {
        self(method, arguments)
    }
}

impl<F> InvokeVirtualLookup for F
where
    F: Fn(&MethodRef, &Value, &[Value]) -> Result<Value, LookupError> + Send + Sync,
{
    fn invoke_virtual(
        &self,
        method: &MethodRef,
        receiver: &Value,
        arguments: &[Value],
    ) -> Result<Value, LookupError> {
        self(method, receiver, arguments)
    }
}

/// Set of oracles consulted during an analysis
///
/// Every oracle is optional. The default has none installed.
#[derive(Default)]
pub struct Lookups {
    pub get_field: Option<Box<dyn GetFieldLookup>>,
    pub get_static: Option<Box<dyn GetStaticLookup>>,
    pub invoke_static: Option<Box<dyn InvokeStaticLookup>>,
    pub invoke_virtual: Option<Box<dyn InvokeVirtualLookup>>,
}

impl Lookups {
    /// No oracles
    pub fn none() -> Lookups {
        Lookups::default()
    }

    /// Built-in oracles for constants and pure methods of `java.lang`
    pub fn basic() -> Lookups {
        Lookups {
            get_field: None,
            get_static: Some(Box::new(BasicGetStaticLookup)),
            invoke_static: Some(Box::new(BasicInvokeStaticLookup)),
            invoke_virtual: Some(Box::new(BasicInvokeVirtualLookup)),
        }
    }

    pub(crate) fn resolve_get_field(&self, field: &FieldRef, owner: &Value) -> Option<Value> {
        let lookup = self.get_field.as_ref()?;
        accept(
            &field.key(),
            lookup.get_field(field, owner),
            &field.descriptor,
        )
    }

    pub(crate) fn resolve_get_static(&self, field: &FieldRef) -> Option<Value> {
        let lookup = self.get_static.as_ref()?;
        accept(&field.key(), lookup.get_static(field), &field.descriptor)
    }

    pub(crate) fn resolve_invoke_static(
        &self,
        method: &MethodRef,
        arguments: &[Value],
    ) -> Option<Value> {
        let lookup = self.invoke_static.as_ref()?;
        let return_type = method.descriptor.return_type.as_ref()?;
        accept(
            &method.key(),
            lookup.invoke_static(method, arguments),
            return_type,
        )
    }

    pub(crate) fn resolve_invoke_virtual(
        &self,
        method: &MethodRef,
        receiver: &Value,
        arguments: &[Value],
    ) -> Option<Value> {
        let lookup = self.invoke_virtual.as_ref()?;
        let return_type = method.descriptor.return_type.as_ref()?;
        accept(
            &method.key(),
            lookup.invoke_virtual(method, receiver, arguments),
            return_type,
        )
    }
}

/// Keep an oracle's answer only if it fits the declared type
fn accept(
    key: &str,
    result: Result<Value, LookupError>,
    expected: &FieldType<BinaryName>,
) -> Option<Value> {
    match result {
        Ok(value) if value.matches_sort(expected) => Some(value),
        Ok(value) => {
            log::debug!("discarding lookup of {}: {} is not a {}", key, value, expected);
            None
        }
        Err(LookupError::Miss) => None,
        Err(LookupError::Evaluation(message)) => {
            log::debug!("lookup of {} failed: {}", key, message);
            None
        }
    }
}

/// `Character.isWhitespace`: space, line and paragraph separators except the non-breaking ones,
/// plus the ASCII controls `\t`, `\n`, `\u000B`, `\f`, `\r` and `\u001C`..`\u001F`
pub(crate) fn java_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t'..='\r'
            | '\u{1c}'..='\u{20}'
            | '\u{1680}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

/// Concrete arguments, as expected by the built-in tables
///
/// Any argument that is unknown turns the lookup into a miss.
pub(crate) mod args {
    use super::LookupError;
    use crate::analysis::Value;

    pub fn int(arguments: &[Value], index: usize) -> Result<i32, LookupError> {
        arguments
            .get(index)
            .and_then(Value::int_value)
            .ok_or(LookupError::Miss)
    }

    pub fn long(arguments: &[Value], index: usize) -> Result<i64, LookupError> {
        match arguments.get(index) {
            Some(Value::Numeric {
                value: Some(number),
                ..
            }) => Ok(number.as_long()),
            _ => Err(LookupError::Miss),
        }
    }

    pub fn float(arguments: &[Value], index: usize) -> Result<f32, LookupError> {
        match arguments.get(index) {
            Some(Value::Numeric {
                value: Some(number),
                ..
            }) => Ok(number.as_float()),
            _ => Err(LookupError::Miss),
        }
    }

    pub fn double(arguments: &[Value], index: usize) -> Result<f64, LookupError> {
        match arguments.get(index) {
            Some(Value::Numeric {
                value: Some(number),
                ..
            }) => Ok(number.as_double()),
            _ => Err(LookupError::Miss),
        }
    }

    pub fn boolean(arguments: &[Value], index: usize) -> Result<bool, LookupError> {
        int(arguments, index).map(|value| value != 0)
    }

    pub fn char(arguments: &[Value], index: usize) -> Result<u16, LookupError> {
        int(arguments, index).map(|value| value as u16)
    }

    pub fn string(arguments: &[Value], index: usize) -> Result<&str, LookupError> {
        match arguments.get(index) {
            Some(Value::String(text)) => Ok(text),
            _ => Err(LookupError::Miss),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::BaseType;

    #[test]
    fn closures_are_lookups() {
        let field = FieldRef::new("com/example/Config", "DEBUG", "Z").unwrap();
        let lookups = Lookups {
            get_static: Some(Box::new(|field: &FieldRef| {
                if field.key() == "com/example/Config.DEBUG" {
                    Ok(Value::boolean(false))
                } else {
                    Err(LookupError::Miss)
                }
            })),
            ..Lookups::none()
        };
        assert_eq!(
            lookups.resolve_get_static(&field),
            Some(Value::boolean(false))
        );
    }

    #[test]
    fn mismatched_results_are_discarded() {
        let field = FieldRef::new("com/example/Config", "LEVEL", "J").unwrap();
        let lookups = Lookups {
            get_static: Some(Box::new(|_: &FieldRef| Ok(Value::int(3)))),
            ..Lookups::none()
        };
        assert_eq!(lookups.resolve_get_static(&field), None);

        let field = FieldRef::new("com/example/Config", "NAME", "Ljava/lang/String;").unwrap();
        let lookups = Lookups {
            get_static: Some(Box::new(|_: &FieldRef| Ok(Value::string("x")))),
            ..Lookups::none()
        };
        assert_eq!(lookups.resolve_get_static(&field), Some(Value::string("x")));
    }

    #[test]
    fn failures_are_misses() {
        let method = MethodRef::new("com/example/Util", "explode", "()I").unwrap();
        let lookups = Lookups {
            invoke_static: Some(Box::new(|_: &MethodRef, _: &[Value]| {
                Err(LookupError::Evaluation("/ by zero".to_owned()))
            })),
            ..Lookups::none()
        };
        assert_eq!(lookups.resolve_invoke_static(&method, &[]), None);
        assert_eq!(Lookups::none().resolve_invoke_static(&method, &[]), None);
    }

    #[test]
    fn argument_extraction() {
        let arguments = [
            Value::int(4),
            Value::unknown(BaseType::Int),
            Value::string("s"),
        ];
        assert_eq!(args::int(&arguments, 0), Ok(4));
        assert_eq!(args::int(&arguments, 1), Err(LookupError::Miss));
        assert_eq!(args::string(&arguments, 2), Ok("s"));
        assert_eq!(args::string(&arguments, 3), Err(LookupError::Miss));
    }
}
