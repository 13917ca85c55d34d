use super::args;
use super::{java_whitespace, InvokeStaticLookup, LookupError};
use crate::analysis::{MethodRef, Value};
use crate::jvm::BaseType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Pure static methods of `java.lang` (`Math`, the boxed primitives, `String.valueOf`, ...)
///
/// Methods are only evaluated when every argument is known. Methods whose result depends on
/// Unicode tables are only evaluated for ASCII characters.
#[derive(Copy, Clone, Debug, Default)]
pub struct BasicInvokeStaticLookup;

impl InvokeStaticLookup for BasicInvokeStaticLookup {
    fn invoke_static(&self, method: &MethodRef, arguments: &[Value]) -> Result<Value, LookupError> {
        let function = METHODS
            .get(method.key().as_str())
            .ok_or(LookupError::Miss)?;
        function(arguments)
    }
}

type StaticMethod = fn(&[Value]) -> Result<Value, LookupError>;

fn arithmetic(message: &str) -> LookupError {
    LookupError::Evaluation(format!("java/lang/ArithmeticException: {}", message))
}

fn number_format(input: &str) -> LookupError {
    LookupError::Evaluation(format!(
        "java/lang/NumberFormatException: For input string: \"{}\"",
        input
    ))
}

fn char_value(c: u16) -> Value {
    Value::int_typed(BaseType::Char, c as i32)
}

/// Character as an ASCII `char`, or a miss for anything else
fn ascii(c: u16) -> Result<u8, LookupError> {
    if c < 0x80 {
        Ok(c as u8)
    } else {
        Err(LookupError::Miss)
    }
}

fn floor_div_i32(a: i32, b: i32) -> Result<i32, LookupError> {
    if b == 0 {
        return Err(arithmetic("/ by zero"));
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a ^ b) < 0 {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_mod_i32(a: i32, b: i32) -> Result<i32, LookupError> {
    if b == 0 {
        return Err(arithmetic("/ by zero"));
    }
    let remainder = a.wrapping_rem(b);
    if remainder != 0 && (remainder ^ b) < 0 {
        Ok(remainder + b)
    } else {
        Ok(remainder)
    }
}

fn floor_div_i64(a: i64, b: i64) -> Result<i64, LookupError> {
    if b == 0 {
        return Err(arithmetic("/ by zero"));
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a ^ b) < 0 {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_mod_i64(a: i64, b: i64) -> Result<i64, LookupError> {
    if b == 0 {
        return Err(arithmetic("/ by zero"));
    }
    let remainder = a.wrapping_rem(b);
    if remainder != 0 && (remainder ^ b) < 0 {
        Ok(remainder + b)
    } else {
        Ok(remainder)
    }
}

/// `Math.max`, where `NaN` wins and `0.0` beats `-0.0`
fn java_max(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        a
    } else if a == 0.0 && b == 0.0 && a.is_sign_negative() {
        b
    } else if a >= b {
        a
    } else {
        b
    }
}

/// `Math.min`, where `NaN` wins and `-0.0` beats `0.0`
fn java_min(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        a
    } else if a == 0.0 && b == 0.0 && b.is_sign_negative() {
        b
    } else if a <= b {
        a
    } else {
        b
    }
}

/// `Math.round`: round half up, then saturate
fn java_round(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// `Math.rint`: round half to even
fn java_rint(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

fn java_signum(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

fn java_pow(x: f64, y: f64) -> f64 {
    if y.is_nan() || (x.abs() == 1.0 && y.is_infinite()) {
        f64::NAN
    } else {
        x.powf(y)
    }
}

/// `Float.floatToIntBits` (all `NaN`s collapse to one bit pattern)
fn float_bits(x: f32) -> i32 {
    if x.is_nan() {
        0x7fc0_0000
    } else {
        x.to_bits() as i32
    }
}

fn double_bits(x: f64) -> i64 {
    if x.is_nan() {
        0x7ff8_0000_0000_0000
    } else {
        x.to_bits() as i64
    }
}

/// `Float.compare` and `Double.compare`: `-0.0 < 0.0` and `NaN` is the largest value
fn total_compare(a: f64, b: f64) -> i32 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        double_bits(a).cmp(&double_bits(b)) as i32
    }
}

/// Render an integer the way `Integer.toString(int, int)` does
fn to_radix_string(value: i64, radix: i32) -> String {
    let radix = if (2..=36).contains(&radix) {
        radix as u64
    } else {
        10
    };
    let mut magnitude = value.unsigned_abs();
    let mut digits = vec![];
    loop {
        let digit = (magnitude % radix) as u32;
        digits.push(std::char::from_digit(digit, radix as u32).unwrap_or('?'));
        magnitude /= radix;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn parse_radix_i64(text: &str, radix: i32, min: i64, max: i64) -> Result<i64, LookupError> {
    if !(2..=36).contains(&radix) {
        return Err(LookupError::Evaluation(format!(
            "java/lang/NumberFormatException: radix {} out of range",
            radix
        )));
    }
    if !text.is_ascii() {
        return Err(LookupError::Miss);
    }
    match i64::from_str_radix(text, radix as u32) {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(number_format(text)),
    }
}

fn parse_java_double(text: &str) -> Result<f64, LookupError> {
    let trimmed = text.trim_matches(|c: char| c <= ' ');
    let unsuffixed = trimmed
        .strip_suffix(&['d', 'D', 'f', 'F'][..])
        .unwrap_or(trimmed);
    match unsuffixed {
        "NaN" | "+NaN" | "-NaN" => Ok(f64::NAN),
        "Infinity" | "+Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ if unsuffixed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) =>
        {
            unsuffixed.parse().map_err(|_| number_format(text))
        }
        _ => Err(LookupError::Miss),
    }
}

static METHODS: Lazy<HashMap<String, StaticMethod>> = Lazy::new(|| {
    let mut methods: HashMap<String, StaticMethod> = HashMap::new();

    for owner in ["java/lang/Math", "java/lang/StrictMath"] {
        let mut add = |signature: &str, function: StaticMethod| {
            methods.insert(format!("{}.{}", owner, signature), function);
        };

        add("abs(I)I", |a| Ok(Value::int(args::int(a, 0)?.wrapping_abs())));
        add("abs(J)J", |a| Ok(Value::long(args::long(a, 0)?.wrapping_abs())));
        add("abs(F)F", |a| Ok(Value::float(args::float(a, 0)?.abs())));
        add("abs(D)D", |a| Ok(Value::double(args::double(a, 0)?.abs())));
        add("max(II)I", |a| Ok(Value::int(args::int(a, 0)?.max(args::int(a, 1)?))));
        add("max(JJ)J", |a| {
            Ok(Value::long(args::long(a, 0)?.max(args::long(a, 1)?)))
        });
        add("max(FF)F", |a| {
            let (x, y) = (args::float(a, 0)?, args::float(a, 1)?);
            Ok(Value::float(java_max(x as f64, y as f64) as f32))
        });
        add("max(DD)D", |a| {
            Ok(Value::double(java_max(args::double(a, 0)?, args::double(a, 1)?)))
        });
        add("min(II)I", |a| Ok(Value::int(args::int(a, 0)?.min(args::int(a, 1)?))));
        add("min(JJ)J", |a| {
            Ok(Value::long(args::long(a, 0)?.min(args::long(a, 1)?)))
        });
        add("min(FF)F", |a| {
            let (x, y) = (args::float(a, 0)?, args::float(a, 1)?);
            Ok(Value::float(java_min(x as f64, y as f64) as f32))
        });
        add("min(DD)D", |a| {
            Ok(Value::double(java_min(args::double(a, 0)?, args::double(a, 1)?)))
        });
        add("floorDiv(II)I", |a| {
            floor_div_i32(args::int(a, 0)?, args::int(a, 1)?).map(Value::int)
        });
        add("floorDiv(JJ)J", |a| {
            floor_div_i64(args::long(a, 0)?, args::long(a, 1)?).map(Value::long)
        });
        add("floorMod(II)I", |a| {
            floor_mod_i32(args::int(a, 0)?, args::int(a, 1)?).map(Value::int)
        });
        add("floorMod(JJ)J", |a| {
            floor_mod_i64(args::long(a, 0)?, args::long(a, 1)?).map(Value::long)
        });
        add("addExact(II)I", |a| {
            let sum = args::int(a, 0)?.checked_add(args::int(a, 1)?);
            sum.map(Value::int).ok_or_else(|| arithmetic("integer overflow"))
        });
        add("addExact(JJ)J", |a| {
            let sum = args::long(a, 0)?.checked_add(args::long(a, 1)?);
            sum.map(Value::long).ok_or_else(|| arithmetic("long overflow"))
        });
        add("subtractExact(II)I", |a| {
            let difference = args::int(a, 0)?.checked_sub(args::int(a, 1)?);
            difference
                .map(Value::int)
                .ok_or_else(|| arithmetic("integer overflow"))
        });
        add("subtractExact(JJ)J", |a| {
            let difference = args::long(a, 0)?.checked_sub(args::long(a, 1)?);
            difference
                .map(Value::long)
                .ok_or_else(|| arithmetic("long overflow"))
        });
        add("multiplyExact(II)I", |a| {
            let product = args::int(a, 0)?.checked_mul(args::int(a, 1)?);
            product
                .map(Value::int)
                .ok_or_else(|| arithmetic("integer overflow"))
        });
        add("multiplyExact(JJ)J", |a| {
            let product = args::long(a, 0)?.checked_mul(args::long(a, 1)?);
            product
                .map(Value::long)
                .ok_or_else(|| arithmetic("long overflow"))
        });
        add("negateExact(I)I", |a| {
            let negated = args::int(a, 0)?.checked_neg();
            negated
                .map(Value::int)
                .ok_or_else(|| arithmetic("integer overflow"))
        });
        add("negateExact(J)J", |a| {
            let negated = args::long(a, 0)?.checked_neg();
            negated
                .map(Value::long)
                .ok_or_else(|| arithmetic("long overflow"))
        });
        add("toIntExact(J)I", |a| {
            let value = args::long(a, 0)?;
            i32::try_from(value)
                .map(Value::int)
                .map_err(|_| arithmetic("integer overflow"))
        });
        add("sqrt(D)D", |a| Ok(Value::double(args::double(a, 0)?.sqrt())));
        add("pow(DD)D", |a| {
            Ok(Value::double(java_pow(args::double(a, 0)?, args::double(a, 1)?)))
        });
        add("ceil(D)D", |a| Ok(Value::double(args::double(a, 0)?.ceil())));
        add("floor(D)D", |a| Ok(Value::double(args::double(a, 0)?.floor())));
        add("rint(D)D", |a| Ok(Value::double(java_rint(args::double(a, 0)?))));
        add("round(F)I", |a| {
            Ok(Value::int(java_round(args::float(a, 0)? as f64) as i32))
        });
        add("round(D)J", |a| {
            Ok(Value::long(java_round(args::double(a, 0)?) as i64))
        });
        add("signum(F)F", |a| {
            Ok(Value::float(java_signum(args::float(a, 0)? as f64) as f32))
        });
        add("signum(D)D", |a| {
            Ok(Value::double(java_signum(args::double(a, 0)?)))
        });
        add("toRadians(D)D", |a| {
            Ok(Value::double(args::double(a, 0)? * 0.017453292519943295))
        });
        add("toDegrees(D)D", |a| {
            Ok(Value::double(args::double(a, 0)? * 57.29577951308232))
        });
    }

    let mut add = |key: &str, function: StaticMethod| {
        methods.insert(key.to_owned(), function);
    };

    // Integer
    add("java/lang/Integer.bitCount(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.count_ones() as i32))
    });
    add("java/lang/Integer.numberOfLeadingZeros(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.leading_zeros() as i32))
    });
    add("java/lang/Integer.numberOfTrailingZeros(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.trailing_zeros() as i32))
    });
    add("java/lang/Integer.highestOneBit(I)I", |a| {
        let value = args::int(a, 0)? as u32;
        let bit = if value == 0 {
            0
        } else {
            0x8000_0000u32 >> value.leading_zeros()
        };
        Ok(Value::int(bit as i32))
    });
    add("java/lang/Integer.lowestOneBit(I)I", |a| {
        let value = args::int(a, 0)?;
        Ok(Value::int(value & value.wrapping_neg()))
    });
    add("java/lang/Integer.reverse(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.reverse_bits()))
    });
    add("java/lang/Integer.reverseBytes(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.swap_bytes()))
    });
    add("java/lang/Integer.rotateLeft(II)I", |a| {
        let distance = (args::int(a, 1)? & 0x1f) as u32;
        Ok(Value::int(args::int(a, 0)?.rotate_left(distance)))
    });
    add("java/lang/Integer.rotateRight(II)I", |a| {
        let distance = (args::int(a, 1)? & 0x1f) as u32;
        Ok(Value::int(args::int(a, 0)?.rotate_right(distance)))
    });
    add("java/lang/Integer.signum(I)I", |a| {
        Ok(Value::int(args::int(a, 0)?.signum()))
    });
    add("java/lang/Integer.hashCode(I)I", |a| Ok(Value::int(args::int(a, 0)?)));
    add("java/lang/Integer.sum(II)I", |a| {
        Ok(Value::int(args::int(a, 0)?.wrapping_add(args::int(a, 1)?)))
    });
    add("java/lang/Integer.max(II)I", |a| {
        Ok(Value::int(args::int(a, 0)?.max(args::int(a, 1)?)))
    });
    add("java/lang/Integer.min(II)I", |a| {
        Ok(Value::int(args::int(a, 0)?.min(args::int(a, 1)?)))
    });
    add("java/lang/Integer.compare(II)I", |a| {
        Ok(Value::int(args::int(a, 0)?.cmp(&args::int(a, 1)?) as i32))
    });
    add("java/lang/Integer.compareUnsigned(II)I", |a| {
        let (x, y) = (args::int(a, 0)? as u32, args::int(a, 1)? as u32);
        Ok(Value::int(x.cmp(&y) as i32))
    });
    add("java/lang/Integer.divideUnsigned(II)I", |a| {
        let (x, y) = (args::int(a, 0)? as u32, args::int(a, 1)? as u32);
        x.checked_div(y)
            .map(|quotient| Value::int(quotient as i32))
            .ok_or_else(|| arithmetic("/ by zero"))
    });
    add("java/lang/Integer.remainderUnsigned(II)I", |a| {
        let (x, y) = (args::int(a, 0)? as u32, args::int(a, 1)? as u32);
        x.checked_rem(y)
            .map(|remainder| Value::int(remainder as i32))
            .ok_or_else(|| arithmetic("/ by zero"))
    });
    add("java/lang/Integer.toString(I)Ljava/lang/String;", |a| {
        Ok(Value::string(args::int(a, 0)?.to_string()))
    });
    add("java/lang/Integer.toString(II)Ljava/lang/String;", |a| {
        Ok(Value::string(to_radix_string(
            args::int(a, 0)? as i64,
            args::int(a, 1)?,
        )))
    });
    add("java/lang/Integer.toHexString(I)Ljava/lang/String;", |a| {
        Ok(Value::string(format!("{:x}", args::int(a, 0)? as u32)))
    });
    add("java/lang/Integer.toOctalString(I)Ljava/lang/String;", |a| {
        Ok(Value::string(format!("{:o}", args::int(a, 0)? as u32)))
    });
    add("java/lang/Integer.toBinaryString(I)Ljava/lang/String;", |a| {
        Ok(Value::string(format!("{:b}", args::int(a, 0)? as u32)))
    });
    add("java/lang/Integer.parseInt(Ljava/lang/String;)I", |a| {
        let text = args::string(a, 0)?;
        let value = parse_radix_i64(text, 10, i32::MIN as i64, i32::MAX as i64)?;
        Ok(Value::int(value as i32))
    });
    add("java/lang/Integer.parseInt(Ljava/lang/String;I)I", |a| {
        let text = args::string(a, 0)?;
        let value = parse_radix_i64(text, args::int(a, 1)?, i32::MIN as i64, i32::MAX as i64)?;
        Ok(Value::int(value as i32))
    });

    // Long
    add("java/lang/Long.bitCount(J)I", |a| {
        Ok(Value::int(args::long(a, 0)?.count_ones() as i32))
    });
    add("java/lang/Long.numberOfLeadingZeros(J)I", |a| {
        Ok(Value::int(args::long(a, 0)?.leading_zeros() as i32))
    });
    add("java/lang/Long.numberOfTrailingZeros(J)I", |a| {
        Ok(Value::int(args::long(a, 0)?.trailing_zeros() as i32))
    });
    add("java/lang/Long.reverse(J)J", |a| {
        Ok(Value::long(args::long(a, 0)?.reverse_bits()))
    });
    add("java/lang/Long.reverseBytes(J)J", |a| {
        Ok(Value::long(args::long(a, 0)?.swap_bytes()))
    });
    add("java/lang/Long.signum(J)I", |a| {
        Ok(Value::int(args::long(a, 0)?.signum() as i32))
    });
    add("java/lang/Long.hashCode(J)I", |a| {
        let value = args::long(a, 0)?;
        Ok(Value::int((value ^ ((value as u64) >> 32) as i64) as i32))
    });
    add("java/lang/Long.sum(JJ)J", |a| {
        Ok(Value::long(args::long(a, 0)?.wrapping_add(args::long(a, 1)?)))
    });
    add("java/lang/Long.max(JJ)J", |a| {
        Ok(Value::long(args::long(a, 0)?.max(args::long(a, 1)?)))
    });
    add("java/lang/Long.min(JJ)J", |a| {
        Ok(Value::long(args::long(a, 0)?.min(args::long(a, 1)?)))
    });
    add("java/lang/Long.compare(JJ)I", |a| {
        Ok(Value::int(args::long(a, 0)?.cmp(&args::long(a, 1)?) as i32))
    });
    add("java/lang/Long.toString(J)Ljava/lang/String;", |a| {
        Ok(Value::string(args::long(a, 0)?.to_string()))
    });
    add("java/lang/Long.toHexString(J)Ljava/lang/String;", |a| {
        Ok(Value::string(format!("{:x}", args::long(a, 0)? as u64)))
    });
    add("java/lang/Long.toBinaryString(J)Ljava/lang/String;", |a| {
        Ok(Value::string(format!("{:b}", args::long(a, 0)? as u64)))
    });
    add("java/lang/Long.parseLong(Ljava/lang/String;)J", |a| {
        let text = args::string(a, 0)?;
        parse_radix_i64(text, 10, i64::MIN, i64::MAX).map(Value::long)
    });

    // Float and Double
    add("java/lang/Float.floatToIntBits(F)I", |a| {
        Ok(Value::int(float_bits(args::float(a, 0)?)))
    });
    add("java/lang/Float.floatToRawIntBits(F)I", |a| {
        Ok(Value::int(args::float(a, 0)?.to_bits() as i32))
    });
    add("java/lang/Float.intBitsToFloat(I)F", |a| {
        Ok(Value::float(f32::from_bits(args::int(a, 0)? as u32)))
    });
    add("java/lang/Float.isNaN(F)Z", |a| {
        Ok(Value::boolean(args::float(a, 0)?.is_nan()))
    });
    add("java/lang/Float.isInfinite(F)Z", |a| {
        Ok(Value::boolean(args::float(a, 0)?.is_infinite()))
    });
    add("java/lang/Float.isFinite(F)Z", |a| {
        Ok(Value::boolean(args::float(a, 0)?.is_finite()))
    });
    add("java/lang/Float.compare(FF)I", |a| {
        let (x, y) = (args::float(a, 0)?, args::float(a, 1)?);
        Ok(Value::int(total_compare(x as f64, y as f64)))
    });
    add("java/lang/Double.doubleToLongBits(D)J", |a| {
        Ok(Value::long(double_bits(args::double(a, 0)?)))
    });
    add("java/lang/Double.doubleToRawLongBits(D)J", |a| {
        Ok(Value::long(args::double(a, 0)?.to_bits() as i64))
    });
    add("java/lang/Double.longBitsToDouble(J)D", |a| {
        Ok(Value::double(f64::from_bits(args::long(a, 0)? as u64)))
    });
    add("java/lang/Double.isNaN(D)Z", |a| {
        Ok(Value::boolean(args::double(a, 0)?.is_nan()))
    });
    add("java/lang/Double.isInfinite(D)Z", |a| {
        Ok(Value::boolean(args::double(a, 0)?.is_infinite()))
    });
    add("java/lang/Double.isFinite(D)Z", |a| {
        Ok(Value::boolean(args::double(a, 0)?.is_finite()))
    });
    add("java/lang/Double.compare(DD)I", |a| {
        Ok(Value::int(total_compare(args::double(a, 0)?, args::double(a, 1)?)))
    });
    add("java/lang/Double.parseDouble(Ljava/lang/String;)D", |a| {
        parse_java_double(args::string(a, 0)?).map(Value::double)
    });

    // Byte and Short
    add("java/lang/Byte.toUnsignedInt(B)I", |a| {
        Ok(Value::int(args::int(a, 0)? & 0xff))
    });
    add("java/lang/Byte.compare(BB)I", |a| {
        Ok(Value::int(args::int(a, 0)? - args::int(a, 1)?))
    });
    add("java/lang/Short.toUnsignedInt(S)I", |a| {
        Ok(Value::int(args::int(a, 0)? & 0xffff))
    });
    add("java/lang/Short.compare(SS)I", |a| {
        Ok(Value::int(args::int(a, 0)? - args::int(a, 1)?))
    });
    add("java/lang/Short.reverseBytes(S)S", |a| {
        let value = args::int(a, 0)? as i16;
        Ok(Value::int_typed(BaseType::Short, value.swap_bytes() as i32))
    });

    // Character
    add("java/lang/Character.isDigit(C)Z", |a| {
        Ok(Value::boolean(ascii(args::char(a, 0)?)?.is_ascii_digit()))
    });
    add("java/lang/Character.isLetter(C)Z", |a| {
        Ok(Value::boolean(ascii(args::char(a, 0)?)?.is_ascii_alphabetic()))
    });
    add("java/lang/Character.isLetterOrDigit(C)Z", |a| {
        Ok(Value::boolean(ascii(args::char(a, 0)?)?.is_ascii_alphanumeric()))
    });
    add("java/lang/Character.isUpperCase(C)Z", |a| {
        Ok(Value::boolean(ascii(args::char(a, 0)?)?.is_ascii_uppercase()))
    });
    add("java/lang/Character.isLowerCase(C)Z", |a| {
        Ok(Value::boolean(ascii(args::char(a, 0)?)?.is_ascii_lowercase()))
    });
    add("java/lang/Character.isWhitespace(C)Z", |a| {
        let c = char::from_u32(args::char(a, 0)? as u32);
        Ok(Value::boolean(c.map_or(false, java_whitespace)))
    });
    add("java/lang/Character.toUpperCase(C)C", |a| {
        let c = ascii(args::char(a, 0)?)?;
        Ok(char_value(c.to_ascii_uppercase() as u16))
    });
    add("java/lang/Character.toLowerCase(C)C", |a| {
        let c = ascii(args::char(a, 0)?)?;
        Ok(char_value(c.to_ascii_lowercase() as u16))
    });
    add("java/lang/Character.isHighSurrogate(C)Z", |a| {
        Ok(Value::boolean((0xd800..=0xdbff).contains(&args::char(a, 0)?)))
    });
    add("java/lang/Character.isLowSurrogate(C)Z", |a| {
        Ok(Value::boolean((0xdc00..=0xdfff).contains(&args::char(a, 0)?)))
    });
    add("java/lang/Character.isSurrogate(C)Z", |a| {
        Ok(Value::boolean((0xd800..=0xdfff).contains(&args::char(a, 0)?)))
    });
    add("java/lang/Character.isBmpCodePoint(I)Z", |a| {
        Ok(Value::boolean((args::int(a, 0)? as u32) >> 16 == 0))
    });
    add("java/lang/Character.isValidCodePoint(I)Z", |a| {
        Ok(Value::boolean((0..=0x10ffff).contains(&args::int(a, 0)?)))
    });
    add("java/lang/Character.charCount(I)I", |a| {
        Ok(Value::int(if args::int(a, 0)? >= 0x10000 { 2 } else { 1 }))
    });
    add("java/lang/Character.compare(CC)I", |a| {
        Ok(Value::int(args::char(a, 0)? as i32 - args::char(a, 1)? as i32))
    });
    add("java/lang/Character.hashCode(C)I", |a| {
        Ok(Value::int(args::char(a, 0)? as i32))
    });
    add("java/lang/Character.digit(CI)I", |a| {
        let c = ascii(args::char(a, 0)?)?;
        let radix = args::int(a, 1)?;
        let digit = if (2..=36).contains(&radix) {
            (c as char).to_digit(radix as u32)
        } else {
            None
        };
        Ok(Value::int(digit.map_or(-1, |digit| digit as i32)))
    });
    add("java/lang/Character.forDigit(II)C", |a| {
        let (digit, radix) = (args::int(a, 0)?, args::int(a, 1)?);
        let c = if (2..=36).contains(&radix) && (0..radix).contains(&digit) {
            std::char::from_digit(digit as u32, radix as u32).map_or(0, |c| c as u16)
        } else {
            0
        };
        Ok(char_value(c))
    });
    add("java/lang/Character.toString(C)Ljava/lang/String;", |a| {
        Ok(Value::string(String::from_utf16_lossy(&[args::char(a, 0)?])))
    });

    // Boolean
    add("java/lang/Boolean.parseBoolean(Ljava/lang/String;)Z", |a| {
        Ok(Value::boolean(args::string(a, 0)?.eq_ignore_ascii_case("true")))
    });
    add("java/lang/Boolean.toString(Z)Ljava/lang/String;", |a| {
        Ok(Value::string(args::boolean(a, 0)?.to_string()))
    });
    add("java/lang/Boolean.hashCode(Z)I", |a| {
        Ok(Value::int(if args::boolean(a, 0)? { 1231 } else { 1237 }))
    });
    add("java/lang/Boolean.compare(ZZ)I", |a| {
        let (x, y) = (args::boolean(a, 0)?, args::boolean(a, 1)?);
        Ok(Value::int(x.cmp(&y) as i32))
    });
    add("java/lang/Boolean.logicalAnd(ZZ)Z", |a| {
        Ok(Value::boolean(args::boolean(a, 0)? && args::boolean(a, 1)?))
    });
    add("java/lang/Boolean.logicalOr(ZZ)Z", |a| {
        Ok(Value::boolean(args::boolean(a, 0)? || args::boolean(a, 1)?))
    });
    add("java/lang/Boolean.logicalXor(ZZ)Z", |a| {
        Ok(Value::boolean(args::boolean(a, 0)? ^ args::boolean(a, 1)?))
    });

    // String
    add("java/lang/String.valueOf(I)Ljava/lang/String;", |a| {
        Ok(Value::string(args::int(a, 0)?.to_string()))
    });
    add("java/lang/String.valueOf(J)Ljava/lang/String;", |a| {
        Ok(Value::string(args::long(a, 0)?.to_string()))
    });
    add("java/lang/String.valueOf(C)Ljava/lang/String;", |a| {
        Ok(Value::string(String::from_utf16_lossy(&[args::char(a, 0)?])))
    });
    add("java/lang/String.valueOf(Z)Ljava/lang/String;", |a| {
        Ok(Value::string(args::boolean(a, 0)?.to_string()))
    });

    methods
});

#[cfg(test)]
mod test {
    use super::*;

    fn call(
        owner: &str,
        name: &str,
        descriptor: &str,
        arguments: &[Value],
    ) -> Result<Value, LookupError> {
        let method = MethodRef::new(owner, name, descriptor).unwrap();
        BasicInvokeStaticLookup.invoke_static(&method, arguments)
    }

    #[test]
    fn math() {
        assert_eq!(
            call("java/lang/Math", "max", "(II)I", &[Value::int(3), Value::int(5)]),
            Ok(Value::int(5))
        );
        assert_eq!(
            call("java/lang/Math", "abs", "(I)I", &[Value::int(i32::MIN)]),
            Ok(Value::int(i32::MIN))
        );
        assert_eq!(
            call("java/lang/Math", "floorDiv", "(II)I", &[Value::int(-7), Value::int(2)]),
            Ok(Value::int(-4))
        );
        assert_eq!(
            call("java/lang/Math", "floorMod", "(II)I", &[Value::int(-7), Value::int(2)]),
            Ok(Value::int(1))
        );
        assert_eq!(
            call("java/lang/StrictMath", "sqrt", "(D)D", &[Value::double(16.0)]),
            Ok(Value::double(4.0))
        );
        assert_eq!(
            call("java/lang/Math", "round", "(D)J", &[Value::double(-2.5)]),
            Ok(Value::long(-2))
        );
        assert_eq!(
            call("java/lang/Math", "rint", "(D)D", &[Value::double(2.5)]),
            Ok(Value::double(2.0))
        );
        assert_eq!(
            call("java/lang/Math", "max", "(DD)D", &[Value::double(f64::NAN), Value::double(1.0)]),
            Ok(Value::double(f64::NAN))
        );
    }

    #[test]
    fn throwing_methods_report_evaluation_errors() {
        assert!(matches!(
            call("java/lang/Math", "floorDiv", "(II)I", &[Value::int(0), Value::int(0)]),
            Err(LookupError::Evaluation(_))
        ));
        assert!(matches!(
            call("java/lang/Math", "toIntExact", "(J)I", &[Value::long(1 << 40)]),
            Err(LookupError::Evaluation(_))
        ));
        assert!(matches!(
            call(
                "java/lang/Integer",
                "parseInt",
                "(Ljava/lang/String;)I",
                &[Value::string("x")]
            ),
            Err(LookupError::Evaluation(_))
        ));
    }

    #[test]
    fn unknown_arguments_miss() {
        assert_eq!(
            call(
                "java/lang/Math",
                "max",
                "(II)I",
                &[Value::int(3), Value::unknown(BaseType::Int)]
            ),
            Err(LookupError::Miss)
        );
        assert_eq!(
            call("java/lang/Math", "random", "()D", &[]),
            Err(LookupError::Miss)
        );
    }

    #[test]
    fn integers() {
        assert_eq!(
            call(
                "java/lang/Integer",
                "toString",
                "(II)Ljava/lang/String;",
                &[Value::int(-255), Value::int(16)]
            ),
            Ok(Value::string("-ff"))
        );
        assert_eq!(
            call("java/lang/Integer", "toHexString", "(I)Ljava/lang/String;", &[Value::int(-1)]),
            Ok(Value::string("ffffffff"))
        );
        assert_eq!(
            call(
                "java/lang/Integer",
                "parseInt",
                "(Ljava/lang/String;)I",
                &[Value::string("-42")]
            ),
            Ok(Value::int(-42))
        );
        assert_eq!(
            call("java/lang/Integer", "highestOneBit", "(I)I", &[Value::int(-1)]),
            Ok(Value::int(i32::MIN))
        );
        assert_eq!(
            call("java/lang/Long", "hashCode", "(J)I", &[Value::long(1 << 32)]),
            Ok(Value::int(1))
        );
    }

    #[test]
    fn floats() {
        assert_eq!(
            call("java/lang/Float", "floatToIntBits", "(F)I", &[Value::float(f32::NAN)]),
            Ok(Value::int(0x7fc0_0000))
        );
        assert_eq!(
            call(
                "java/lang/Double",
                "compare",
                "(DD)I",
                &[Value::double(-0.0), Value::double(0.0)]
            ),
            Ok(Value::int(-1))
        );
        assert_eq!(
            call(
                "java/lang/Double",
                "compare",
                "(DD)I",
                &[Value::double(f64::NAN), Value::double(1.0)]
            ),
            Ok(Value::int(1))
        );
    }

    #[test]
    fn characters() {
        assert_eq!(
            call("java/lang/Character", "toUpperCase", "(C)C", &[char_value(b'q' as u16)]),
            Ok(char_value(b'Q' as u16))
        );
        assert_eq!(
            call("java/lang/Character", "isWhitespace", "(C)Z", &[char_value(0x1c)]),
            Ok(Value::boolean(true))
        );
        assert_eq!(
            call("java/lang/Character", "isWhitespace", "(C)Z", &[char_value(0x2003)]),
            Ok(Value::boolean(true))
        );
        assert_eq!(
            call("java/lang/Character", "isWhitespace", "(C)Z", &[char_value(0x00a0)]),
            Ok(Value::boolean(false))
        );
        assert_eq!(
            call("java/lang/Character", "isLetter", "(C)Z", &[char_value(0x00e9)]),
            Err(LookupError::Miss)
        );
        assert_eq!(
            call(
                "java/lang/Character",
                "digit",
                "(CI)I",
                &[char_value(b'f' as u16), Value::int(16)]
            ),
            Ok(Value::int(15))
        );
    }
}
