use super::{GetStaticLookup, LookupError};
use crate::analysis::{FieldRef, Value};
use crate::jvm::BaseType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Constant fields of the boxed primitive classes and `Math`
#[derive(Copy, Clone, Debug, Default)]
pub struct BasicGetStaticLookup;

impl GetStaticLookup for BasicGetStaticLookup {
    fn get_static(&self, field: &FieldRef) -> Result<Value, LookupError> {
        CONSTANT_FIELDS
            .get(field.key().as_str())
            .cloned()
            .ok_or(LookupError::Miss)
    }
}

static CONSTANT_FIELDS: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let mut fields = HashMap::new();
    let mut add = |key: &'static str, value: Value| {
        fields.insert(key, value);
    };

    add("java/lang/Byte.BYTES", Value::int(1));
    add("java/lang/Byte.SIZE", Value::int(8));
    add("java/lang/Byte.MIN_VALUE", Value::int_typed(BaseType::Byte, i8::MIN as i32));
    add("java/lang/Byte.MAX_VALUE", Value::int_typed(BaseType::Byte, i8::MAX as i32));

    add("java/lang/Short.BYTES", Value::int(2));
    add("java/lang/Short.SIZE", Value::int(16));
    add("java/lang/Short.MIN_VALUE", Value::int_typed(BaseType::Short, i16::MIN as i32));
    add("java/lang/Short.MAX_VALUE", Value::int_typed(BaseType::Short, i16::MAX as i32));

    add("java/lang/Character.BYTES", Value::int(2));
    add("java/lang/Character.SIZE", Value::int(16));
    add("java/lang/Character.MIN_RADIX", Value::int(2));
    add("java/lang/Character.MAX_RADIX", Value::int(36));
    add("java/lang/Character.MIN_VALUE", Value::int_typed(BaseType::Char, 0));
    add("java/lang/Character.MAX_VALUE", Value::int_typed(BaseType::Char, 0xffff));
    add("java/lang/Character.MIN_CODE_POINT", Value::int(0));
    add("java/lang/Character.MAX_CODE_POINT", Value::int(0x10ffff));
    add("java/lang/Character.MIN_SUPPLEMENTARY_CODE_POINT", Value::int(0x10000));
    add("java/lang/Character.MIN_HIGH_SURROGATE", Value::int_typed(BaseType::Char, 0xd800));
    add("java/lang/Character.MAX_HIGH_SURROGATE", Value::int_typed(BaseType::Char, 0xdbff));
    add("java/lang/Character.MIN_LOW_SURROGATE", Value::int_typed(BaseType::Char, 0xdc00));
    add("java/lang/Character.MAX_LOW_SURROGATE", Value::int_typed(BaseType::Char, 0xdfff));
    add("java/lang/Character.MIN_SURROGATE", Value::int_typed(BaseType::Char, 0xd800));
    add("java/lang/Character.MAX_SURROGATE", Value::int_typed(BaseType::Char, 0xdfff));

    add("java/lang/Integer.BYTES", Value::int(4));
    add("java/lang/Integer.SIZE", Value::int(32));
    add("java/lang/Integer.MIN_VALUE", Value::int(i32::MIN));
    add("java/lang/Integer.MAX_VALUE", Value::int(i32::MAX));

    add("java/lang/Long.BYTES", Value::int(8));
    add("java/lang/Long.SIZE", Value::int(64));
    add("java/lang/Long.MIN_VALUE", Value::long(i64::MIN));
    add("java/lang/Long.MAX_VALUE", Value::long(i64::MAX));

    add("java/lang/Float.BYTES", Value::int(4));
    add("java/lang/Float.SIZE", Value::int(32));
    add("java/lang/Float.MIN_VALUE", Value::float(f32::from_bits(1)));
    add("java/lang/Float.MAX_VALUE", Value::float(f32::MAX));
    add("java/lang/Float.MIN_NORMAL", Value::float(f32::MIN_POSITIVE));
    add("java/lang/Float.MIN_EXPONENT", Value::int(-126));
    add("java/lang/Float.MAX_EXPONENT", Value::int(127));
    add("java/lang/Float.NaN", Value::float(f32::NAN));
    add("java/lang/Float.POSITIVE_INFINITY", Value::float(f32::INFINITY));
    add("java/lang/Float.NEGATIVE_INFINITY", Value::float(f32::NEG_INFINITY));

    add("java/lang/Double.BYTES", Value::int(8));
    add("java/lang/Double.SIZE", Value::int(64));
    add("java/lang/Double.MIN_VALUE", Value::double(f64::from_bits(1)));
    add("java/lang/Double.MAX_VALUE", Value::double(f64::MAX));
    add("java/lang/Double.MIN_NORMAL", Value::double(f64::MIN_POSITIVE));
    add("java/lang/Double.MIN_EXPONENT", Value::int(-1022));
    add("java/lang/Double.MAX_EXPONENT", Value::int(1023));
    add("java/lang/Double.NaN", Value::double(f64::NAN));
    add("java/lang/Double.POSITIVE_INFINITY", Value::double(f64::INFINITY));
    add("java/lang/Double.NEGATIVE_INFINITY", Value::double(f64::NEG_INFINITY));

    add("java/lang/Math.E", Value::double(std::f64::consts::E));
    add("java/lang/Math.PI", Value::double(std::f64::consts::PI));
    add("java/lang/Math.TAU", Value::double(std::f64::consts::TAU));
    add("java/lang/StrictMath.E", Value::double(std::f64::consts::E));
    add("java/lang/StrictMath.PI", Value::double(std::f64::consts::PI));

    fields
});
