use super::args;
use super::{java_whitespace, InvokeVirtualLookup, LookupError};
use crate::analysis::{MethodRef, Value};
use crate::jvm::{BaseType, BinaryName};
use crate::util::utf16;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Methods of `java/lang/String` called on a string literal
///
/// Indices and lengths are in UTF-16 code units, matching the JVM. Case mapping is only
/// evaluated for ASCII strings.
#[derive(Copy, Clone, Debug, Default)]
pub struct BasicInvokeVirtualLookup;

impl InvokeVirtualLookup for BasicInvokeVirtualLookup {
    fn invoke_virtual(
        &self,
        method: &MethodRef,
        receiver: &Value,
        arguments: &[Value],
    ) -> Result<Value, LookupError> {
        let text = match receiver {
            Value::String(text) if method.owner == BinaryName::STRING => text,
            _ => return Err(LookupError::Miss),
        };
        let signature = format!("{}{}", method.name, method.descriptor);
        let function = STRING_METHODS
            .get(signature.as_str())
            .ok_or(LookupError::Miss)?;
        function(text, arguments)
    }
}

type StringMethod = fn(&str, &[Value]) -> Result<Value, LookupError>;

/// Longest string `repeat` will build
const MAX_REPEATED_LENGTH: usize = 1 << 16;

fn out_of_bounds(message: String) -> LookupError {
    LookupError::Evaluation(format!(
        "java/lang/StringIndexOutOfBoundsException: {}",
        message
    ))
}

/// Rebuild a string from code units, giving up on unpaired surrogates
fn from_units(units: &[u16]) -> Result<Value, LookupError> {
    String::from_utf16(units)
        .map(Value::String)
        .map_err(|_| LookupError::Miss)
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|found| found + from)
}

fn index_value(index: Option<usize>) -> Value {
    Value::int(index.map_or(-1, |index| index as i32))
}

fn substring(text: &str, begin: i32, end: Option<i32>) -> Result<Value, LookupError> {
    let units = utf16(text);
    let length = units.len() as i32;
    let end = end.unwrap_or(length);
    if begin < 0 || end > length || begin > end {
        return Err(out_of_bounds(format!(
            "begin {}, end {}, length {}",
            begin, end, length
        )));
    }
    from_units(&units[begin as usize..end as usize])
}

/// `String.hashCode`: `s[0]*31^(n-1) + ... + s[n-1]` with wrapping arithmetic
fn java_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

fn ascii_only(text: &str) -> Result<&str, LookupError> {
    if text.is_ascii() {
        Ok(text)
    } else {
        Err(LookupError::Miss)
    }
}

static STRING_METHODS: Lazy<HashMap<&'static str, StringMethod>> = Lazy::new(|| {
    let mut methods: HashMap<&'static str, StringMethod> = HashMap::new();
    let mut add = |signature: &'static str, function: StringMethod| {
        methods.insert(signature, function);
    };

    add("length()I", |text, _| {
        Ok(Value::int(text.encode_utf16().count() as i32))
    });
    add("isEmpty()Z", |text, _| Ok(Value::boolean(text.is_empty())));
    add("isBlank()Z", |text, _| {
        Ok(Value::boolean(text.chars().all(java_whitespace)))
    });
    add("charAt(I)C", |text, a| {
        let index = args::int(a, 0)?;
        let units = utf16(text);
        usize::try_from(index)
            .ok()
            .and_then(|index| units.get(index))
            .map(|unit| Value::int_typed(BaseType::Char, *unit as i32))
            .ok_or_else(|| {
                out_of_bounds(format!("index {}, length {}", index, units.len()))
            })
    });
    add("indexOf(I)I", |text, a| {
        let c = args::int(a, 0)?;
        // A surrogate matches either half of a pair
        let needle = match u32::try_from(c) {
            Ok(unit @ 0..=0xffff) => vec![unit as u16],
            Ok(c) => match char::from_u32(c) {
                Some(c) => utf16(&c.to_string()),
                None => return Ok(Value::int(-1)),
            },
            Err(_) => return Ok(Value::int(-1)),
        };
        Ok(index_value(find_units(&utf16(text), &needle, 0)))
    });
    add("indexOf(Ljava/lang/String;)I", |text, a| {
        let needle = utf16(args::string(a, 0)?);
        Ok(index_value(find_units(&utf16(text), &needle, 0)))
    });
    add("indexOf(Ljava/lang/String;I)I", |text, a| {
        let needle = utf16(args::string(a, 0)?);
        let from = args::int(a, 1)?.max(0) as usize;
        Ok(index_value(find_units(&utf16(text), &needle, from)))
    });
    add("lastIndexOf(Ljava/lang/String;)I", |text, a| {
        let (haystack, needle) = (utf16(text), utf16(args::string(a, 0)?));
        let found = (0..=haystack.len())
            .rev()
            .find(|&at| haystack[at..].starts_with(&needle));
        Ok(index_value(found))
    });
    add("substring(I)Ljava/lang/String;", |text, a| {
        substring(text, args::int(a, 0)?, None)
    });
    add("substring(II)Ljava/lang/String;", |text, a| {
        substring(text, args::int(a, 0)?, Some(args::int(a, 1)?))
    });
    add("concat(Ljava/lang/String;)Ljava/lang/String;", |text, a| {
        Ok(Value::string(format!("{}{}", text, args::string(a, 0)?)))
    });
    add("equals(Ljava/lang/Object;)Z", |text, a| match a.get(0) {
        Some(Value::String(other)) => Ok(Value::boolean(text == other)),
        Some(Value::Null) => Ok(Value::boolean(false)),
        _ => Err(LookupError::Miss),
    });
    add("equalsIgnoreCase(Ljava/lang/String;)Z", |text, a| {
        let other = args::string(a, 0)?;
        Ok(Value::boolean(
            ascii_only(text)?.eq_ignore_ascii_case(ascii_only(other)?),
        ))
    });
    add("compareTo(Ljava/lang/String;)I", |text, a| {
        let (units, other) = (utf16(text), utf16(args::string(a, 0)?));
        let difference = units
            .iter()
            .zip(&other)
            .find(|(unit, other_unit)| unit != other_unit)
            .map(|(unit, other_unit)| *unit as i32 - *other_unit as i32)
            .unwrap_or(units.len() as i32 - other.len() as i32);
        Ok(Value::int(difference))
    });
    add("hashCode()I", |text, _| Ok(Value::int(java_hash(text))));
    add("trim()Ljava/lang/String;", |text, _| {
        Ok(Value::string(text.trim_matches(|c: char| c <= ' ')))
    });
    add("strip()Ljava/lang/String;", |text, _| {
        Ok(Value::string(text.trim_matches(java_whitespace)))
    });
    add("toUpperCase()Ljava/lang/String;", |text, _| {
        Ok(Value::string(ascii_only(text)?.to_ascii_uppercase()))
    });
    add("toLowerCase()Ljava/lang/String;", |text, _| {
        Ok(Value::string(ascii_only(text)?.to_ascii_lowercase()))
    });
    add("contains(Ljava/lang/CharSequence;)Z", |text, a| {
        Ok(Value::boolean(text.contains(args::string(a, 0)?)))
    });
    add("startsWith(Ljava/lang/String;)Z", |text, a| {
        Ok(Value::boolean(text.starts_with(args::string(a, 0)?)))
    });
    add("endsWith(Ljava/lang/String;)Z", |text, a| {
        Ok(Value::boolean(text.ends_with(args::string(a, 0)?)))
    });
    add("repeat(I)Ljava/lang/String;", |text, a| {
        let count = args::int(a, 0)?;
        if count < 0 {
            return Err(LookupError::Evaluation(format!(
                "java/lang/IllegalArgumentException: count is negative: {}",
                count
            )));
        }
        if text.len().saturating_mul(count as usize) > MAX_REPEATED_LENGTH {
            return Err(LookupError::Miss);
        }
        Ok(Value::string(text.repeat(count as usize)))
    });
    add("intern()Ljava/lang/String;", |text, _| Ok(Value::string(text)));
    add("toString()Ljava/lang/String;", |text, _| {
        Ok(Value::string(text))
    });

    methods
});
