use super::{pop_expecting, pop_reference, ExecutionContext};
use crate::analysis::{ArrayValue, ExecutorErrorKind, Frame, Opcode, Value};
use crate::jvm::{BaseType, BinaryName, FieldType, RefType};

/// Array element loads and stores, and `arraylength`
pub(super) fn execute(
    frame: &mut Frame,
    opcode: Opcode,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match opcode {
        IALoad | LALoad | FALoad | DALoad | AALoad | BALoad | CALoad | SALoad => {
            load(frame, opcode)
        }
        IAStore | LAStore | FAStore | DAStore | AAStore | BAStore | CAStore | SAStore => {
            store(frame, opcode, ctx)
        }
        ArrayLength => array_length(frame),
        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

/// Element type the opcode works on, as a fallback for bad arrays
fn opcode_element_type(opcode: Opcode) -> FieldType<BinaryName> {
    use Opcode::*;

    match opcode {
        LALoad | LAStore => FieldType::long(),
        FALoad | FAStore => FieldType::float(),
        DALoad | DAStore => FieldType::double(),
        AALoad | AAStore => FieldType::object(BinaryName::OBJECT),
        BALoad | BAStore => FieldType::byte(),
        CALoad | CAStore => FieldType::char(),
        SALoad | SAStore => FieldType::short(),
        _ => FieldType::int(),
    }
}

/// Can the opcode access arrays with the given component type?
fn accepts_component(opcode: Opcode, component: &FieldType<BinaryName>) -> bool {
    use Opcode::*;

    match (opcode, component) {
        (IALoad | IAStore, FieldType::Base(ty)) => ty.is_int_like(),
        (BALoad | BAStore, FieldType::Base(BaseType::Byte | BaseType::Boolean)) => true,
        (CALoad | CAStore, FieldType::Base(BaseType::Char)) => true,
        (SALoad | SAStore, FieldType::Base(BaseType::Short)) => true,
        (LALoad | LAStore, FieldType::Base(BaseType::Long)) => true,
        (FALoad | FAStore, FieldType::Base(BaseType::Float)) => true,
        (DALoad | DAStore, FieldType::Base(BaseType::Double)) => true,
        (AALoad | AAStore, FieldType::Ref(_)) => true,
        _ => false,
    }
}

/// Pop the array operand, checking that the opcode can access it
fn pop_array(frame: &mut Frame, opcode: Opcode) -> Option<ArrayValue> {
    match frame.pop() {
        Value::Array(array) if accepts_component(opcode, &array.component_type()) => Some(array),
        Value::Null => {
            frame.mark_wonky(format!("{} on null array", opcode));
            None
        }
        other => {
            let expected = RefType::array(opcode_element_type(opcode));
            frame.mark_wonky(format!("{} expected {}, found {}", opcode, expected, other));
            None
        }
    }
}

/// Position in the tracked contents, marking the frame wonky if the index is known to be out of
/// bounds
fn checked_index(frame: &mut Frame, opcode: Opcode, index: i32, length: usize) -> Option<usize> {
    match usize::try_from(index) {
        Ok(position) if position < length => Some(position),
        _ => {
            frame.mark_wonky(format!(
                "{} index {} out of bounds for length {}",
                opcode, index, length
            ));
            None
        }
    }
}

fn load(frame: &mut Frame, opcode: Opcode) {
    let index = pop_expecting(frame, opcode, BaseType::Int).int_value();
    let array = match pop_array(frame, opcode) {
        Some(array) => array,
        None => {
            frame.push_value(Value::of_type(&opcode_element_type(opcode)));
            return;
        }
    };

    let component = array.component_type();
    let element = match (index, &array.backing) {
        (Some(index), Some(backing)) => {
            match checked_index(frame, opcode, index, backing.elements.len()) {
                Some(position) => backing.elements[position].clone(),
                None => Value::of_type(&component),
            }
        }
        (Some(index), None) if index < 0 => {
            frame.mark_wonky(format!("{} with negative index {}", opcode, index));
            Value::of_type(&component)
        }
        _ => Value::of_type(&component),
    };
    frame.push_value(element);
}

/// Convert a popped value to what the array will hold
///
/// Primitive values are narrowed to the component type (`bastore` truncates to a byte).
fn as_element(value: Value, component: &FieldType<BinaryName>) -> Value {
    match (component, value.number_value()) {
        (FieldType::Base(ty), Some(number)) => Value::Numeric {
            ty: *ty,
            value: Some(number.convert(*ty)),
        },
        (FieldType::Base(ty), None) => Value::unknown(*ty),
        (FieldType::Ref(_), _) => value,
    }
}

fn store(frame: &mut Frame, opcode: Opcode, ctx: &ExecutionContext) {
    let value = match opcode_element_type(opcode) {
        FieldType::Base(ty) => pop_expecting(frame, opcode, ty),
        FieldType::Ref(_) => {
            pop_reference(frame, opcode).unwrap_or(Value::Object(BinaryName::OBJECT))
        }
    };
    let index = pop_expecting(frame, opcode, BaseType::Int).int_value();
    let array = match pop_array(frame, opcode) {
        Some(array) => array,
        None => return,
    };

    let component = array.component_type();
    if let (Some(class), FieldType::Ref(RefType::Object(component_class))) =
        (value.class_name(), &component)
    {
        if ctx.hierarchy.is_assignable(&class, component_class) == Some(false) {
            frame.mark_wonky(format!("{} of {} into {}", opcode, value, array.array_type()));
        }
    }

    let mut backing = match array.backing {
        Some(backing) => backing,
        None => {
            if let Some(index) = index.filter(|index| *index < 0) {
                frame.mark_wonky(format!("{} with negative index {}", opcode, index));
            }
            return;
        }
    };
    let element = as_element(value, &component);
    match index {
        Some(index) => match checked_index(frame, opcode, index, backing.elements.len()) {
            Some(position) => backing.elements[position] = element,
            None => return,
        },

        // Any element could have been overwritten
        None => {
            for existing in &mut backing.elements {
                *existing = existing.join(&element, ctx.hierarchy);
            }
        }
    }
    frame.update_array(&backing);
}

fn array_length(frame: &mut Frame) {
    let length = match pop_reference(frame, Opcode::ArrayLength) {
        Some(Value::Array(array)) => match array.length() {
            Some(length) => Value::int(length as i32),
            None => Value::unknown(BaseType::Int),
        },
        Some(Value::Null) => {
            frame.mark_wonky("arraylength on null array");
            Value::unknown(BaseType::Int)
        }
        Some(other) => {
            frame.mark_wonky(format!("arraylength expected an array, found {}", other));
            Value::unknown(BaseType::Int)
        }
        None => Value::unknown(BaseType::Int),
    };
    frame.push(length);
}
