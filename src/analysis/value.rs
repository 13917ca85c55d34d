use super::{Handle, Number};
use crate::jvm::class_graph::TypeHierarchy;
use crate::jvm::{ArrayType, BaseType, BinaryName, FieldType, RefType};
use crate::util::Width;
use std::fmt;

/// Abstract value occupying a stack slot or a local variable
///
/// Values range from fully concrete (`int 8`, a string literal, an array with known contents)
/// to "known type, unknown value". A `long` or `double` on the stack is always followed by a
/// [`Value::WideReserved`] slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Primitive of the given type, with its value when known
    Numeric {
        ty: BaseType,
        value: Option<Number>,
    },

    /// Non-null, non-array reference of the given class
    Object(BinaryName),

    Array(ArrayValue),

    /// `java/lang/String` with known contents
    String(String),

    /// `java/lang/Class` for a known type
    Type(RefType<BinaryName>),

    /// `java/lang/invoke/MethodHandle` for a known handle
    MethodHandle(Handle),

    /// Second slot of a `long` or `double`
    WideReserved,

    Null,

    /// Stand-in for a value that couldn't be produced (stack underflow, uninitialized local,
    /// incompatible merge)
    EmptyStack,
}

/// Array reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayValue {
    /// Number of dimensions (at least 1)
    pub dimensions: usize,

    /// Innermost element type (never itself an array)
    pub element_type: FieldType<BinaryName>,

    /// Contents of the array, when they are tracked
    pub backing: Option<ArrayBacking>,
}

/// Tracked contents of an array
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayBacking {
    /// Address of the instruction that allocated the array
    ///
    /// Copies of the same array share the site, which is how a store through one copy reaches
    /// the others.
    pub site: usize,

    pub elements: Vec<Value>,
}

impl ArrayValue {
    /// Array of the given type with untracked contents
    ///
    /// Returns `None` if the type is not an array type.
    pub fn of_type(array_type: &RefType<BinaryName>) -> Option<ArrayValue> {
        let (dimensions, element_type) = match array_type {
            RefType::Object(_) => return None,
            RefType::ObjectArray(array) => {
                (array.dimensions(), FieldType::object(array.element_type.clone()))
            }
            RefType::PrimitiveArray(array) => {
                (array.dimensions(), FieldType::Base(array.element_type))
            }
        };
        Some(ArrayValue {
            dimensions,
            element_type,
            backing: None,
        })
    }

    pub fn array_type(&self) -> RefType<BinaryName> {
        let additional_dimensions = self.dimensions.saturating_sub(1);
        match &self.element_type {
            FieldType::Base(element_type) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions,
                element_type: *element_type,
            }),
            FieldType::Ref(RefType::Object(element_type)) => RefType::ObjectArray(ArrayType {
                additional_dimensions,
                element_type: element_type.clone(),
            }),
            FieldType::Ref(nested) => nested.clone(),
        }
    }

    /// Type of the array's elements
    pub fn component_type(&self) -> FieldType<BinaryName> {
        if self.dimensions <= 1 {
            self.element_type.clone()
        } else {
            let inner = ArrayValue {
                dimensions: self.dimensions - 1,
                element_type: self.element_type.clone(),
                backing: None,
            };
            FieldType::Ref(inner.array_type())
        }
    }

    /// Length of the array, when known
    pub fn length(&self) -> Option<usize> {
        self.backing.as_ref().map(|backing| backing.elements.len())
    }

    fn without_backing(&self) -> ArrayValue {
        ArrayValue {
            dimensions: self.dimensions,
            element_type: self.element_type.clone(),
            backing: None,
        }
    }
}

impl Value {
    pub const fn int(value: i32) -> Value {
        Value::Numeric {
            ty: BaseType::Int,
            value: Some(Number::Int(value)),
        }
    }

    pub const fn long(value: i64) -> Value {
        Value::Numeric {
            ty: BaseType::Long,
            value: Some(Number::Long(value)),
        }
    }

    pub const fn float(value: f32) -> Value {
        Value::Numeric {
            ty: BaseType::Float,
            value: Some(Number::Float(value)),
        }
    }

    pub const fn double(value: f64) -> Value {
        Value::Numeric {
            ty: BaseType::Double,
            value: Some(Number::Double(value)),
        }
    }

    pub const fn boolean(value: bool) -> Value {
        Value::Numeric {
            ty: BaseType::Boolean,
            value: Some(Number::Int(value as i32)),
        }
    }

    /// Known value of an `int`-like type, narrowed to fit the type
    pub fn int_typed(ty: BaseType, value: i32) -> Value {
        Value::Numeric {
            ty,
            value: Some(Number::Int(value).convert(ty)),
        }
    }

    /// Concrete number, typed by its representation on the stack
    pub const fn number(value: Number) -> Value {
        let ty = match value {
            Number::Int(_) => BaseType::Int,
            Number::Long(_) => BaseType::Long,
            Number::Float(_) => BaseType::Float,
            Number::Double(_) => BaseType::Double,
        };
        Value::Numeric {
            ty,
            value: Some(value),
        }
    }

    /// Primitive of the given type with unknown value
    pub const fn unknown(ty: BaseType) -> Value {
        Value::Numeric { ty, value: None }
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    /// Value of the given type, with nothing else known about it
    pub fn of_type(field_type: &FieldType<BinaryName>) -> Value {
        match field_type {
            FieldType::Base(base_type) => Value::unknown(*base_type),
            FieldType::Ref(ref_type) => Value::of_ref_type(ref_type),
        }
    }

    pub fn of_ref_type(ref_type: &RefType<BinaryName>) -> Value {
        match ArrayValue::of_type(ref_type) {
            Some(array) => Value::Array(array),
            None => match ref_type {
                RefType::Object(name) => Value::Object(name.clone()),
                _ => Value::Object(BinaryName::OBJECT),
            },
        }
    }

    /// Default value of fields and array elements of the given type
    pub fn default_of(field_type: &FieldType<BinaryName>) -> Value {
        match field_type {
            FieldType::Base(base_type) => Value::Numeric {
                ty: *base_type,
                value: Some(Number::Int(0).convert(*base_type)),
            },
            FieldType::Ref(_) => Value::Null,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Numeric { .. })
    }

    /// Is this a `long` or `double`?
    pub fn is_wide_numeric(&self) -> bool {
        matches!(self, Value::Numeric { ty, .. } if ty.width() == 2)
    }

    /// Is this a non-null, non-array reference (literals included)?
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::String(_) | Value::Type(_) | Value::MethodHandle(_)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_wide_reserved(&self) -> bool {
        matches!(self, Value::WideReserved)
    }

    pub fn is_empty_stack(&self) -> bool {
        matches!(self, Value::EmptyStack)
    }

    /// Can this be used where a reference is expected? (includes `null`)
    pub fn is_reference(&self) -> bool {
        self.is_object() || self.is_array() || self.is_null()
    }

    pub fn numeric_type(&self) -> Option<BaseType> {
        match self {
            Value::Numeric { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    /// Concrete number, if this is a numeric value that is known
    pub fn number_value(&self) -> Option<Number> {
        match self {
            Value::Numeric { value, .. } => *value,
            _ => None,
        }
    }

    /// Concrete value, if this is a known `int` (or narrower)
    pub fn int_value(&self) -> Option<i32> {
        match self {
            Value::Numeric {
                ty,
                value: Some(value),
            } if ty.is_int_like() => Some(value.as_int()),
            _ => None,
        }
    }

    /// Is this a numeric value whose stack type is the given type?
    pub fn has_computational_type(&self, ty: BaseType) -> bool {
        matches!(self, Value::Numeric { ty: found, .. }
            if found.computational_type() == ty.computational_type())
    }

    /// Can this value be passed where the given type is expected?
    ///
    /// Only the sort is compared: primitives must have the same stack type and references must
    /// be references, without checking subtyping.
    pub fn matches_sort(&self, field_type: &FieldType<BinaryName>) -> bool {
        match field_type {
            FieldType::Base(base_type) => self.has_computational_type(*base_type),
            FieldType::Ref(_) => self.is_reference(),
        }
    }

    /// Class of a non-null, non-array reference
    pub fn class_name(&self) -> Option<BinaryName> {
        match self {
            Value::Object(name) => Some(name.clone()),
            Value::String(_) => Some(BinaryName::STRING),
            Value::Type(_) => Some(BinaryName::CLASS),
            Value::MethodHandle(_) => Some(BinaryName::METHODHANDLE),
            _ => None,
        }
    }

    /// Drop everything known about the value besides its type
    pub fn generalized(&self) -> Value {
        match self {
            Value::Numeric { ty, .. } => Value::unknown(*ty),
            Value::String(_) | Value::Type(_) | Value::MethodHandle(_) => {
                Value::Object(self.class_name().unwrap_or(BinaryName::OBJECT))
            }
            Value::Array(array) => Value::Array(array.without_backing()),
            other => other.clone(),
        }
    }

    /// Least upper bound of two values reaching the same slot
    ///
    /// Returns [`Value::EmptyStack`] when the values have nothing in common.
    pub fn join(&self, other: &Value, hierarchy: &dyn TypeHierarchy) -> Value {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (
                Value::Numeric {
                    ty: ty1,
                    value: value1,
                },
                Value::Numeric {
                    ty: ty2,
                    value: value2,
                },
            ) if ty1.computational_type() == ty2.computational_type() => Value::Numeric {
                ty: ty1.widest(*ty2),
                value: if value1 == value2 { *value1 } else { None },
            },

            (Value::Null, value) | (value, Value::Null) if value.is_reference() => {
                value.generalized()
            }

            (Value::Array(array1), Value::Array(array2)) => {
                if array1.dimensions != array2.dimensions {
                    Value::Object(BinaryName::OBJECT)
                } else if array1.element_type == array2.element_type {
                    Value::Array(ArrayValue {
                        dimensions: array1.dimensions,
                        element_type: array1.element_type.clone(),
                        backing: if array1.backing == array2.backing {
                            array1.backing.clone()
                        } else {
                            None
                        },
                    })
                } else {
                    match (&array1.element_type, &array2.element_type) {
                        (
                            FieldType::Ref(RefType::Object(class1)),
                            FieldType::Ref(RefType::Object(class2)),
                        ) => Value::Array(ArrayValue {
                            dimensions: array1.dimensions,
                            element_type: FieldType::object(
                                hierarchy.common_supertype(class1, class2),
                            ),
                            backing: None,
                        }),
                        _ => Value::Object(BinaryName::OBJECT),
                    }
                }
            }

            (value1, value2) if value1.is_object() && value2.is_object() => {
                match (value1.class_name(), value2.class_name()) {
                    (Some(class1), Some(class2)) => {
                        Value::Object(hierarchy.common_supertype(&class1, &class2))
                    }
                    _ => Value::Object(BinaryName::OBJECT),
                }
            }

            (value1, value2) if value1.is_reference() && value2.is_reference() => {
                Value::Object(BinaryName::OBJECT)
            }

            _ => Value::EmptyStack,
        }
    }
}

impl Width for Value {
    fn width(&self) -> usize {
        if self.is_wide_numeric() {
            2
        } else {
            1
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Value {
        Value::number(number)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric {
                ty,
                value: Some(value),
            } => {
                if *ty == BaseType::Boolean {
                    write!(f, "boolean {}", value.as_int() != 0)
                } else if *ty == BaseType::Char {
                    match char::from_u32(value.as_int() as u32) {
                        Some(c) if !c.is_control() => write!(f, "char {:?}", c),
                        _ => write!(f, "char {}", value),
                    }
                } else {
                    write!(f, "{} {}", ty.keyword(), value)
                }
            }
            Value::Numeric { ty, value: None } => write!(f, "{} ?", ty.keyword()),
            Value::Object(name) => write!(f, "{}", name),
            Value::Array(array) => {
                write!(f, "{}", array.array_type())?;
                if let Some(length) = array.length() {
                    write!(f, " (length {})", length)?;
                }
                Ok(())
            }
            Value::String(text) => write!(f, "{:?}", text),
            Value::Type(typ) => write!(f, "class {}", typ),
            Value::MethodHandle(handle) => {
                write!(f, "handle {}.{}{}", handle.owner, handle.name, handle.descriptor)
            }
            Value::WideReserved => f.write_str("top"),
            Value::Null => f.write_str("null"),
            Value::EmptyStack => f.write_str("empty"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas, ObjectHierarchy};
    use crate::jvm::ParseDescriptor;

    fn int_array() -> Value {
        Value::Array(ArrayValue {
            dimensions: 1,
            element_type: FieldType::int(),
            backing: Some(ArrayBacking {
                site: 0,
                elements: vec![Value::int(0), Value::int(0)],
            }),
        })
    }

    #[test]
    fn numeric_joins() {
        let h = &ObjectHierarchy;
        assert_eq!(Value::int(5).join(&Value::int(5), h), Value::int(5));
        assert_eq!(
            Value::int(5).join(&Value::int(7), h),
            Value::unknown(BaseType::Int)
        );
        assert_eq!(
            Value::boolean(true).join(&Value::int(1), h),
            Value::int(1)
        );
        assert_eq!(
            Value::unknown(BaseType::Byte).join(&Value::unknown(BaseType::Short), h),
            Value::unknown(BaseType::Short)
        );
        assert_eq!(Value::int(1).join(&Value::long(1), h), Value::EmptyStack);
        assert_eq!(
            Value::double(f64::NAN).join(&Value::double(f64::NAN), h),
            Value::double(f64::NAN)
        );
    }

    #[test]
    fn reference_joins() {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();

        assert_eq!(
            Value::Null.join(&Value::string("hi"), &graph),
            Value::Object(BinaryName::STRING)
        );
        assert_eq!(
            Value::string("a").join(&Value::string("b"), &graph),
            Value::Object(BinaryName::STRING)
        );
        assert_eq!(
            Value::Object(BinaryName::INTEGER).join(&Value::Object(BinaryName::LONG), &graph),
            Value::Object(BinaryName::NUMBER)
        );
        assert_eq!(
            Value::Object(BinaryName::INTEGER).join(&Value::int(1), &graph),
            Value::EmptyStack
        );
        assert_eq!(
            Value::Null.join(&Value::int(1), &graph),
            Value::EmptyStack
        );
        assert_eq!(
            int_array().join(&Value::Object(BinaryName::STRING), &graph),
            Value::Object(BinaryName::OBJECT)
        );
    }

    #[test]
    fn array_joins() {
        let h = &ObjectHierarchy;
        let array = int_array();
        assert_eq!(array.join(&array, h), array);

        let untracked = Value::of_type(&FieldType::parse("[I").unwrap());
        assert_eq!(array.join(&untracked, h), untracked);
        assert_eq!(Value::Null.join(&array, h), untracked);

        let strings = Value::of_type(&FieldType::parse("[Ljava/lang/String;").unwrap());
        let integers = Value::of_type(&FieldType::parse("[Ljava/lang/Integer;").unwrap());
        assert_eq!(
            strings.join(&integers, h),
            Value::of_type(&FieldType::parse("[Ljava/lang/Object;").unwrap())
        );
        assert_eq!(
            untracked.join(&strings, h),
            Value::Object(BinaryName::OBJECT)
        );
    }

    #[test]
    fn array_types() {
        let typ: RefType<BinaryName> = RefType::parse("[[Ljava/lang/String;").unwrap();
        let array = ArrayValue::of_type(&typ).unwrap();
        assert_eq!(array.dimensions, 2);
        assert_eq!(array.element_type, FieldType::object(BinaryName::STRING));
        assert_eq!(array.array_type(), typ);
        assert_eq!(
            array.component_type(),
            FieldType::parse("[Ljava/lang/String;").unwrap()
        );
        assert!(ArrayValue::of_type(&RefType::Object(BinaryName::STRING)).is_none());
    }

    #[test]
    fn sorts() {
        assert!(Value::unknown(BaseType::Char).matches_sort(&FieldType::int()));
        assert!(!Value::long(1).matches_sort(&FieldType::int()));
        assert!(Value::Null.matches_sort(&FieldType::object(BinaryName::STRING)));
        assert!(!Value::EmptyStack.matches_sort(&FieldType::object(BinaryName::STRING)));
        assert!(int_array().matches_sort(&FieldType::object(BinaryName::OBJECT)));
        assert_eq!(Value::long(1).width(), 2);
        assert_eq!(Value::WideReserved.width(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(Value::int(8).to_string(), "int 8");
        assert_eq!(Value::unknown(BaseType::Long).to_string(), "long ?");
        assert_eq!(Value::boolean(true).to_string(), "boolean true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(int_array().to_string(), "[I (length 2)");
        assert_eq!(Value::string("hi").to_string(), "\"hi\"");
    }
}
