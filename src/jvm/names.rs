use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Names of methods, fields, and local variables
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.2>
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct UnqualifiedName(Cow<'static, str>);

/// Names of classes and interfaces, with `/` separating packages
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct BinaryName(Cow<'static, str>);

/// A string was rejected as a class or member name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} name `{name}` {problem}")]
pub struct InvalidName {
    pub kind: &'static str,
    pub name: String,
    pub problem: &'static str,
}

pub trait Name: Sized {
    /// What sort of name this is, for error messages
    const KIND: &'static str;

    /// Why the string can't be used as a name, if it can't
    fn problem(name: &str) -> Option<&'static str>;

    fn as_str(&self) -> &str;

    /// Wrap an already validated string
    fn wrap(name: String) -> Self;

    fn from_string(name: String) -> Result<Self, InvalidName> {
        match Self::problem(&name) {
            None => Ok(Self::wrap(name)),
            Some(problem) => Err(InvalidName {
                kind: Self::KIND,
                name,
                problem,
            }),
        }
    }

    fn from_str(name: &str) -> Result<Self, InvalidName> {
        Self::from_string(name.to_owned())
    }
}

/// Problem with a single segment of a name
fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("has an empty segment")
    } else if segment.contains(&['.', ';', '['][..]) {
        Some("contains one of `.`, `;`, or `[`")
    } else {
        None
    }
}

impl Name for UnqualifiedName {
    const KIND: &'static str = "member";

    fn problem(name: &str) -> Option<&'static str> {
        if name.contains('/') {
            Some("contains `/`")
        } else {
            segment_problem(name)
        }
    }

    fn as_str(&self) -> &str {
        &self.0
    }

    fn wrap(name: String) -> Self {
        UnqualifiedName(Cow::Owned(name))
    }
}

impl Name for BinaryName {
    const KIND: &'static str = "class";

    fn problem(name: &str) -> Option<&'static str> {
        name.split('/').find_map(segment_problem)
    }

    fn as_str(&self) -> &str {
        &self.0
    }

    fn wrap(name: String) -> Self {
        BinaryName(Cow::Owned(name))
    }
}

impl AsRef<str> for UnqualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BinaryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

macro_rules! show_as_str {
    ($($name:ty),*) => {
        $(
            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

show_as_str!(UnqualifiedName, BinaryName);

impl UnqualifiedName {
    const fn name(value: &'static str) -> UnqualifiedName {
        UnqualifiedName(Cow::Borrowed(value))
    }

    /// Name of the receiver local in instance methods
    pub const THIS: Self = Self::name("this");
}

impl BinaryName {
    const fn name(value: &'static str) -> BinaryName {
        BinaryName(Cow::Borrowed(value))
    }

    // `java.lang`
    pub const OBJECT: Self = Self::name("java/lang/Object");
    pub const CHARSEQUENCE: Self = Self::name("java/lang/CharSequence");
    pub const COMPARABLE: Self = Self::name("java/lang/Comparable");
    pub const STRING: Self = Self::name("java/lang/String");
    pub const CLASS: Self = Self::name("java/lang/Class");
    pub const NUMBER: Self = Self::name("java/lang/Number");
    pub const BYTE: Self = Self::name("java/lang/Byte");
    pub const SHORT: Self = Self::name("java/lang/Short");
    pub const CHARACTER: Self = Self::name("java/lang/Character");
    pub const INTEGER: Self = Self::name("java/lang/Integer");
    pub const LONG: Self = Self::name("java/lang/Long");
    pub const FLOAT: Self = Self::name("java/lang/Float");
    pub const DOUBLE: Self = Self::name("java/lang/Double");
    pub const BOOLEAN: Self = Self::name("java/lang/Boolean");
    pub const VOID: Self = Self::name("java/lang/Void");
    pub const MATH: Self = Self::name("java/lang/Math");
    pub const STRICTMATH: Self = Self::name("java/lang/StrictMath");
    pub const SYSTEM: Self = Self::name("java/lang/System");
    pub const ITERABLE: Self = Self::name("java/lang/Iterable");
    pub const CLONEABLE: Self = Self::name("java/lang/Cloneable");
    pub const THROWABLE: Self = Self::name("java/lang/Throwable");
    pub const ERROR: Self = Self::name("java/lang/Error");
    pub const EXCEPTION: Self = Self::name("java/lang/Exception");
    pub const RUNTIMEEXCEPTION: Self = Self::name("java/lang/RuntimeException");
    pub const ARITHMETICEXCEPTION: Self = Self::name("java/lang/ArithmeticException");
    pub const ILLEGALARGUMENTEXCEPTION: Self = Self::name("java/lang/IllegalArgumentException");
    pub const ILLEGALSTATEEXCEPTION: Self = Self::name("java/lang/IllegalStateException");
    pub const NULLPOINTEREXCEPTION: Self = Self::name("java/lang/NullPointerException");
    pub const NUMBERFORMATEXCEPTION: Self = Self::name("java/lang/NumberFormatException");
    pub const INDEXOUTOFBOUNDSEXCEPTION: Self =
        Self::name("java/lang/IndexOutOfBoundsException");

    // `java.lang.invoke`
    pub const METHODHANDLE: Self = Self::name("java/lang/invoke/MethodHandle");
    pub const METHODTYPE: Self = Self::name("java/lang/invoke/MethodType");
    pub const CALLSITE: Self = Self::name("java/lang/invoke/CallSite");

    // `java.io`
    pub const SERIALIZABLE: Self = Self::name("java/io/Serializable");
    pub const IOEXCEPTION: Self = Self::name("java/io/IOException");

    // `java.util`
    pub const COLLECTION: Self = Self::name("java/util/Collection");
    pub const LIST: Self = Self::name("java/util/List");
    pub const SET: Self = Self::name("java/util/Set");
    pub const MAP: Self = Self::name("java/util/Map");
    pub const RANDOMACCESS: Self = Self::name("java/util/RandomAccess");
    pub const ABSTRACTCOLLECTION: Self = Self::name("java/util/AbstractCollection");
    pub const ABSTRACTLIST: Self = Self::name("java/util/AbstractList");
    pub const ABSTRACTSET: Self = Self::name("java/util/AbstractSet");
    pub const ABSTRACTMAP: Self = Self::name("java/util/AbstractMap");
    pub const ARRAYLIST: Self = Self::name("java/util/ArrayList");
    pub const LINKEDLIST: Self = Self::name("java/util/LinkedList");
    pub const HASHSET: Self = Self::name("java/util/HashSet");
    pub const HASHMAP: Self = Self::name("java/util/HashMap");
}
