use super::{BinaryName, InvalidName, Name};
use crate::util::Width;
use std::fmt;
use thiserror::Error;

/// Why a field or method descriptor failed to parse
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor ended while expecting {0}")]
    UnexpectedEnd(&'static str),

    #[error("found `{found}` at offset {offset} while expecting {expected}")]
    UnexpectedChar {
        found: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected trailing input `{0}`")]
    Leftover(String),

    #[error(transparent)]
    ClassName(#[from] InvalidName),
}

/// Cursor over a descriptor string
pub struct DescriptorReader<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> DescriptorReader<'a> {
    pub fn new(source: &'a str) -> DescriptorReader<'a> {
        DescriptorReader { source, offset: 0 }
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Unparsed remainder
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// Consume the next character if it is `expected`
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.offset += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: char, what: &'static str) -> Result<(), DescriptorError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.fail(what))
        }
    }

    /// Error for whatever comes next, given what should have been there instead
    pub fn fail(&self, expected: &'static str) -> DescriptorError {
        match self.peek() {
            Some(found) => DescriptorError::UnexpectedChar {
                found,
                offset: self.offset,
                expected,
            },
            None => DescriptorError::UnexpectedEnd(expected),
        }
    }

    /// Consume everything up to and including `end`, returning what came before it
    fn take_until(&mut self, end: char, what: &'static str) -> Result<&'a str, DescriptorError> {
        let rest = self.rest();
        let length = rest.find(end).ok_or(DescriptorError::UnexpectedEnd(what))?;
        self.offset += length + end.len_utf8();
        Ok(&rest[..length])
    }
}

pub trait ParseDescriptor: Sized {
    /// Parse a complete descriptor
    fn parse(source: &str) -> Result<Self, DescriptorError> {
        let mut reader = DescriptorReader::new(source);
        let parsed = Self::read(&mut reader)?;
        match reader.rest() {
            "" => Ok(parsed),
            leftover => Err(DescriptorError::Leftover(leftover.to_owned())),
        }
    }

    /// Parse a descriptor from the front of the reader
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError>;
}

pub trait RenderDescriptor {
    fn render(&self) -> String {
        let mut rendered = String::new();
        self.render_to(&mut rendered);
        rendered
    }

    fn render_to(&self, out: &mut String);
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl Width for BaseType {
    fn width(&self) -> usize {
        match self {
            BaseType::Long | BaseType::Double => 2,
            _ => 1,
        }
    }
}

impl BaseType {
    /// Position of the type in the JVM's primitive sort ordering
    ///
    /// `boolean < char < byte < short < int < float < long < double`. Merging two numeric values
    /// keeps the one with the larger sort.
    pub const fn sort(self) -> u8 {
        match self {
            BaseType::Boolean => 1,
            BaseType::Char => 2,
            BaseType::Byte => 3,
            BaseType::Short => 4,
            BaseType::Int => 5,
            BaseType::Float => 6,
            BaseType::Long => 7,
            BaseType::Double => 8,
        }
    }

    /// Types that the JVM represents as `int` on the stack
    pub const fn is_int_like(self) -> bool {
        self.sort() <= BaseType::Int.sort()
    }

    /// The type used on the operand stack for values of this type
    pub const fn computational_type(self) -> BaseType {
        if self.is_int_like() {
            BaseType::Int
        } else {
            self
        }
    }

    /// Pick the wider of two types, by sort
    pub fn widest(self, other: BaseType) -> BaseType {
        if other.sort() > self.sort() {
            other
        } else {
            self
        }
    }

    /// Java keyword for the type
    pub const fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }

    pub const fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    pub const fn from_descriptor_char(c: char) -> Option<BaseType> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }
}

impl RenderDescriptor for BaseType {
    fn render_to(&self, out: &mut String) {
        out.push(self.descriptor_char());
    }
}

impl ParseDescriptor for BaseType {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        match reader.peek().and_then(BaseType::from_descriptor_char) {
            Some(base_type) => {
                reader.eat(base_type.descriptor_char());
                Ok(base_type)
            }
            None => Err(reader.fail("a primitive type")),
        }
    }
}

impl RenderDescriptor for BinaryName {
    fn render_to(&self, out: &mut String) {
        out.push('L');
        out.push_str(self.as_str());
        out.push(';');
    }
}

impl ParseDescriptor for BinaryName {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        reader.expect('L', "a class type")?;
        let name = reader.take_until(';', "`;` after a class name")?;
        Ok(BinaryName::from_str(name)?)
    }
}

/// Reference type
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType<Class> {
    Object(Class),
    ObjectArray(ArrayType<Class>),
    PrimitiveArray(ArrayType<BaseType>),
}

/// Array type, split into its innermost element type and its nesting
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// Dimensions beyond the first (`A[]` has 0, `A[][][][]` has 3)
    pub additional_dimensions: usize,

    /// Innermost non-array type (`A` for `A[][]`)
    pub element_type: T,
}

impl<T> ArrayType<T> {
    const fn single(element_type: T) -> ArrayType<T> {
        ArrayType {
            additional_dimensions: 0,
            element_type,
        }
    }

    pub const fn dimensions(&self) -> usize {
        self.additional_dimensions + 1
    }

    /// Array of this array
    fn nested(self) -> ArrayType<T> {
        ArrayType {
            additional_dimensions: self.additional_dimensions + 1,
            element_type: self.element_type,
        }
    }
}

impl<T: Clone> ArrayType<T> {
    /// Component type if it is itself an array
    fn unnested(&self) -> Option<ArrayType<T>> {
        let additional_dimensions = self.additional_dimensions.checked_sub(1)?;
        Some(ArrayType {
            additional_dimensions,
            element_type: self.element_type.clone(),
        })
    }
}

impl<T: RenderDescriptor> RenderDescriptor for ArrayType<T> {
    fn render_to(&self, out: &mut String) {
        out.extend(std::iter::repeat('[').take(self.dimensions()));
        self.element_type.render_to(out);
    }
}

impl<C> RefType<C> {
    /// Array type whose elements have the given type
    pub fn array(component: FieldType<C>) -> RefType<C> {
        match component {
            FieldType::Base(base_type) => RefType::PrimitiveArray(ArrayType::single(base_type)),
            FieldType::Ref(RefType::Object(class)) => {
                RefType::ObjectArray(ArrayType::single(class))
            }
            FieldType::Ref(RefType::PrimitiveArray(array)) => {
                RefType::PrimitiveArray(array.nested())
            }
            FieldType::Ref(RefType::ObjectArray(array)) => RefType::ObjectArray(array.nested()),
        }
    }
}

impl<C: Clone> RefType<C> {
    /// Type of the elements, if this is an array type
    pub fn component_type(&self) -> Option<FieldType<C>> {
        let component = match self {
            RefType::Object(_) => return None,
            RefType::ObjectArray(array) => match array.unnested() {
                Some(inner) => FieldType::Ref(RefType::ObjectArray(inner)),
                None => FieldType::object(array.element_type.clone()),
            },
            RefType::PrimitiveArray(array) => match array.unnested() {
                Some(inner) => FieldType::Ref(RefType::PrimitiveArray(inner)),
                None => FieldType::Base(array.element_type),
            },
        };
        Some(component)
    }
}

impl<C: RenderDescriptor> RenderDescriptor for RefType<C> {
    fn render_to(&self, out: &mut String) {
        match self {
            RefType::Object(class) => class.render_to(out),
            RefType::PrimitiveArray(array) => array.render_to(out),
            RefType::ObjectArray(array) => array.render_to(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for RefType<C> {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        let mut dimensions = 0;
        while reader.eat('[') {
            dimensions += 1;
        }
        let additional_dimensions = match dimensions {
            0 if reader.peek() == Some('L') => return C::read(reader).map(RefType::Object),
            0 => return Err(reader.fail("a class or array type")),
            dimensions => dimensions - 1,
        };
        if reader.peek() == Some('L') {
            Ok(RefType::ObjectArray(ArrayType {
                additional_dimensions,
                element_type: C::read(reader)?,
            }))
        } else {
            Ok(RefType::PrimitiveArray(ArrayType {
                additional_dimensions,
                element_type: BaseType::read(reader)?,
            }))
        }
    }
}

/// Type of a class, instance, or local variable
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType<Class> {
    Base(BaseType),
    Ref(RefType<Class>),
}

impl<C> Width for FieldType<C> {
    fn width(&self) -> usize {
        match self {
            FieldType::Base(base_type) => base_type.width(),
            FieldType::Ref(_) => 1,
        }
    }
}

impl<C> FieldType<C> {
    pub fn array(component: FieldType<C>) -> FieldType<C> {
        FieldType::Ref(RefType::array(component))
    }

    pub const fn object(class_name: C) -> FieldType<C> {
        FieldType::Ref(RefType::Object(class_name))
    }

    pub const fn int() -> FieldType<C> {
        FieldType::Base(BaseType::Int)
    }

    pub const fn long() -> FieldType<C> {
        FieldType::Base(BaseType::Long)
    }

    pub const fn float() -> FieldType<C> {
        FieldType::Base(BaseType::Float)
    }

    pub const fn double() -> FieldType<C> {
        FieldType::Base(BaseType::Double)
    }

    pub const fn char() -> FieldType<C> {
        FieldType::Base(BaseType::Char)
    }

    pub const fn short() -> FieldType<C> {
        FieldType::Base(BaseType::Short)
    }

    pub const fn byte() -> FieldType<C> {
        FieldType::Base(BaseType::Byte)
    }
}

impl<C: RenderDescriptor> RenderDescriptor for FieldType<C> {
    fn render_to(&self, out: &mut String) {
        match self {
            FieldType::Base(base_type) => base_type.render_to(out),
            FieldType::Ref(ref_type) => ref_type.render_to(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for FieldType<C> {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        match reader.peek() {
            Some('L' | '[') => RefType::read(reader).map(FieldType::Ref),
            Some(c) if BaseType::from_descriptor_char(c).is_some() => {
                BaseType::read(reader).map(FieldType::Base)
            }
            _ => Err(reader.fail("a field type")),
        }
    }
}

/// Parameter and return types of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor<Class> {
    pub parameters: Vec<FieldType<Class>>,

    /// `None` for `void`
    pub return_type: Option<FieldType<Class>>,
}

impl<C: RenderDescriptor> RenderDescriptor for MethodDescriptor<C> {
    fn render_to(&self, out: &mut String) {
        out.push('(');
        for parameter in &self.parameters {
            parameter.render_to(out);
        }
        out.push(')');
        match &self.return_type {
            Some(return_type) => return_type.render_to(out),
            None => out.push('V'),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for MethodDescriptor<C> {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        reader.expect('(', "`(` opening the parameters")?;
        let mut parameters = vec![];
        while !reader.eat(')') {
            parameters.push(FieldType::read(reader)?);
        }
        let return_type = if reader.eat('V') {
            None
        } else {
            Some(FieldType::read(reader)?)
        };
        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}

macro_rules! display_as_descriptor {
    ($($descriptor:ident),*) => {
        $(
            impl<C: RenderDescriptor> fmt::Display for $descriptor<C> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.render())
                }
            }
        )*
    };
}

display_as_descriptor!(FieldType, RefType, MethodDescriptor);
