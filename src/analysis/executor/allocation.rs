use super::{pop_expecting, type_operand, unexpected, ExecutionContext};
use crate::analysis::{
    ArrayBacking, ArrayValue, ExecutorErrorKind, Frame, Instruction, Opcode, Operand, Value,
};
use crate::jvm::{BaseType, BinaryName, FieldType, RefType};

/// `new`, `newarray`, `anewarray`, `multianewarray`
pub(super) fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match insn.opcode {
        New => {
            let value = match type_operand(insn)? {
                RefType::Object(class) => Value::Object(class.clone()),
                array_type => {
                    frame.mark_wonky(format!("new of array type {}", array_type));
                    Value::of_ref_type(array_type)
                }
            };
            frame.push(value);
        }

        NewArray => {
            let element_type = match &insn.operand {
                Operand::Primitive(element_type) => FieldType::Base(*element_type),
                _ => return Err(unexpected("primitive type")),
            };
            let array_type = RefType::array(element_type);
            let size = pop_size(frame, NewArray);
            frame.push(new_array(&array_type, size, 1, ctx));
        }

        ANewArray => {
            let component = FieldType::Ref(type_operand(insn)?.clone());
            let array_type = RefType::array(component);
            let size = pop_size(frame, ANewArray);
            frame.push(new_array(&array_type, size, 1, ctx));
        }

        MultiANewArray => {
            let (array_type, dimensions) = match &insn.operand {
                Operand::MultiArray {
                    array_type,
                    dimensions,
                } => (array_type, *dimensions as usize),
                _ => return Err(unexpected("array type and dimensions")),
            };

            // The outermost size is deepest on the stack
            let mut sizes: Vec<Option<i32>> = (0..dimensions)
                .map(|_| pop_size(frame, MultiANewArray))
                .collect();
            sizes.reverse();

            let available = ArrayValue::of_type(array_type).map_or(0, |array| array.dimensions);
            if dimensions == 0 || dimensions > available {
                frame.mark_wonky(format!(
                    "multianewarray of {} dimensions for {}",
                    dimensions, array_type
                ));
                frame.push(Value::of_ref_type(array_type));
            } else {
                let size = sizes.first().copied().flatten();
                frame.push(new_array(array_type, size, dimensions, ctx));
            }
        }

        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

/// Pop an array size, marking the frame wonky if it is known to be negative
fn pop_size(frame: &mut Frame, opcode: Opcode) -> Option<i32> {
    let size = pop_expecting(frame, opcode, BaseType::Int).int_value();
    match size {
        Some(size) if size < 0 => {
            frame.mark_wonky(format!("{} with negative size {}", opcode, size));
            None
        }
        size => size,
    }
}

/// Array freshly allocated at the current address
///
/// The outermost dimension is tracked when its size is known and small enough. Elements start
/// with their default value, unless more than one dimension gets allocated: then they are inner
/// arrays, untracked rather than `null`.
fn new_array(
    array_type: &RefType<BinaryName>,
    size: Option<i32>,
    allocated_dimensions: usize,
    ctx: &ExecutionContext,
) -> Value {
    let mut array = match ArrayValue::of_type(array_type) {
        Some(array) => array,
        None => return Value::of_ref_type(array_type),
    };
    let length = size.and_then(|size| usize::try_from(size).ok());
    if let Some(length) = length.filter(|length| ctx.settings.tracks_array_of_length(*length)) {
        let component = array.component_type();
        let element = if allocated_dimensions == 1 {
            Value::default_of(&component)
        } else {
            Value::of_type(&component)
        };
        array.backing = Some(ArrayBacking {
            site: ctx.address,
            elements: vec![element; length],
        });
    }
    Value::Array(array)
}
