use super::{pop_non_null, pop_reference, type_operand, ExecutionContext};
use crate::analysis::{ExecutorErrorKind, Frame, Instruction, Opcode, Value};
use crate::jvm::class_graph::TypeHierarchy;
use crate::jvm::{BaseType, BinaryName, RefType};

/// `checkcast`, `instanceof`, `monitorenter`, `monitorexit`
pub(super) fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match insn.opcode {
        CheckCast => {
            let target = type_operand(insn)?;
            let value = match pop_reference(frame, CheckCast) {
                Some(Value::Null) => Value::Null,
                Some(value) if is_instance(&value, target, ctx.hierarchy) => value,
                _ => Value::of_ref_type(target),
            };
            frame.push(value);
        }

        // TODO: push a known boolean when the answer follows from the hierarchy
        InstanceOf => {
            type_operand(insn)?;
            pop_reference(frame, InstanceOf);
            frame.push(Value::unknown(BaseType::Int));
        }

        MonitorEnter | MonitorExit => {
            pop_non_null(frame, insn.opcode);
        }

        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

/// Is the value definitely an instance of `target`?
fn is_instance(
    value: &Value,
    target: &RefType<BinaryName>,
    hierarchy: &dyn TypeHierarchy,
) -> bool {
    match (value, target) {
        (Value::Array(_), RefType::Object(class)) => {
            class == &BinaryName::OBJECT
                || class == &BinaryName::CLONEABLE
                || class == &BinaryName::SERIALIZABLE
        }
        (Value::Array(array), _) => &array.array_type() == target,
        (value, RefType::Object(class)) => match value.class_name() {
            Some(name) => hierarchy.is_assignable(&name, class) == Some(true),
            None => false,
        },
        _ => false,
    }
}
