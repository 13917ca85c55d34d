use crate::jvm::BaseType;
use std::fmt;

/// Concrete value of a primitive
///
/// Sub-int types (`boolean`, `byte`, `char`, `short`) are stored as `Int`, just like they are on
/// the JVM operand stack.
#[derive(Copy, Clone, Debug)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

/// Floating point values compare by bit pattern, so that `NaN` equals itself and the fixpoint
/// loop sees a repeated `NaN` constant as unchanged
impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Long(a), Number::Long(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            (Number::Double(a), Number::Double(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Number {
    pub fn as_int(self) -> i32 {
        match self {
            Number::Int(i) => i,
            Number::Long(l) => l as i32,
            Number::Float(f) => f as i32,
            Number::Double(d) => d as i32,
        }
    }

    pub fn as_long(self) -> i64 {
        match self {
            Number::Int(i) => i as i64,
            Number::Long(l) => l,
            Number::Float(f) => f as i64,
            Number::Double(d) => d as i64,
        }
    }

    pub fn as_float(self) -> f32 {
        match self {
            Number::Int(i) => i as f32,
            Number::Long(l) => l as f32,
            Number::Float(f) => f,
            Number::Double(d) => d as f32,
        }
    }

    pub fn as_double(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Long(l) => l as f64,
            Number::Float(f) => f as f64,
            Number::Double(d) => d,
        }
    }

    /// Convert to the given type, following the JVM conversion instructions
    ///
    /// Float to integer conversions saturate and map `NaN` to zero. Narrowing to `byte`, `char`,
    /// or `short` truncates and then sign (or zero, for `char`) extends back to an `int`.
    pub fn convert(self, to: BaseType) -> Number {
        match to {
            BaseType::Int => Number::Int(self.as_int()),
            BaseType::Long => Number::Long(self.as_long()),
            BaseType::Float => Number::Float(self.as_float()),
            BaseType::Double => Number::Double(self.as_double()),
            BaseType::Byte => Number::Int(self.as_int() as i8 as i32),
            BaseType::Char => Number::Int(self.as_int() as u16 as i32),
            BaseType::Short => Number::Int(self.as_int() as i16 as i32),
            BaseType::Boolean => Number::Int(self.as_int() & 1),
        }
    }

    /// Type of the value on the operand stack
    pub fn base_type(self) -> BaseType {
        match self {
            Number::Int(_) => BaseType::Int,
            Number::Long(_) => BaseType::Long,
            Number::Float(_) => BaseType::Float,
            Number::Double(_) => BaseType::Double,
        }
    }

    pub fn is_nan(self) -> bool {
        match self {
            Number::Float(f) => f.is_nan(),
            Number::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    pub fn negate(self) -> Number {
        match self {
            Number::Int(i) => Number::Int(i.wrapping_neg()),
            Number::Long(l) => Number::Long(l.wrapping_neg()),
            Number::Float(f) => Number::Float(-f),
            Number::Double(d) => Number::Double(-d),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Long(l) => write!(f, "{}", l),
            Number::Float(x) => write!(f, "{:?}", x),
            Number::Double(x) => write!(f, "{:?}", x),
        }
    }
}

/// Two-operand arithmetic and bitwise operations
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// Compute `lhs op rhs` at the given computational type
    ///
    /// Returns `None` when there is no value to produce: integer division by zero (which throws
    /// at runtime) and bitwise operations on floating point types.
    pub fn apply(self, typ: BaseType, lhs: Number, rhs: Number) -> Option<Number> {
        match typ.computational_type() {
            BaseType::Int => self.apply_int(lhs.as_int(), rhs.as_int()).map(Number::Int),
            BaseType::Long => self.apply_long(lhs.as_long(), rhs).map(Number::Long),
            BaseType::Float => {
                let (a, b) = (lhs.as_float(), rhs.as_float());
                let result = match self {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Rem => a % b,
                    _ => return None,
                };
                Some(Number::Float(result))
            }
            _ => {
                let (a, b) = (lhs.as_double(), rhs.as_double());
                let result = match self {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Rem => a % b,
                    _ => return None,
                };
                Some(Number::Double(result))
            }
        }
    }

    fn apply_int(self, a: i32, b: i32) -> Option<i32> {
        let shift = (b & 0x1f) as u32;
        Some(match self {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return None,
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return None,
            BinaryOp::Rem => a.wrapping_rem(b),
            BinaryOp::Shl => a.wrapping_shl(shift),
            BinaryOp::Shr => a.wrapping_shr(shift),
            BinaryOp::UShr => ((a as u32) >> shift) as i32,
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
        })
    }

    /// Shift amounts for `long` shifts are `int`s, so the right operand is kept as a `Number`
    fn apply_long(self, a: i64, rhs: Number) -> Option<i64> {
        let shift = (rhs.as_int() & 0x3f) as u32;
        let b = rhs.as_long();
        Some(match self {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return None,
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return None,
            BinaryOp::Rem => a.wrapping_rem(b),
            BinaryOp::Shl => a.wrapping_shl(shift),
            BinaryOp::Shr => a.wrapping_shr(shift),
            BinaryOp::UShr => ((a as u64) >> shift) as i64,
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
        })
    }
}

/// Result of `lcmp`
pub fn compare_longs(a: i64, b: i64) -> i32 {
    a.cmp(&b) as i32
}

/// Result of `fcmp<op>` and `dcmp<op>`
///
/// When either operand is `NaN`, the comparison is unordered and the result is `nan_result`
/// (`-1` for the `l` variants, `1` for the `g` variants).
pub fn compare_floats(a: f64, b: f64, nan_result: i32) -> i32 {
    match a.partial_cmp(&b) {
        Some(ordering) => ordering as i32,
        None => nan_result,
    }
}
