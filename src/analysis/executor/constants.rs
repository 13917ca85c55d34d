use super::unexpected;
use crate::analysis::{Constant, ExecutorErrorKind, Frame, Instruction, Opcode, Operand, Value};
use crate::jvm::{BaseType, BinaryName};

/// `aconst_null`, `iconst_<i>`, ..., `bipush`, `sipush`, `ldc`
pub(super) fn execute(frame: &mut Frame, insn: &Instruction) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    let value = match insn.opcode {
        AConstNull => Value::Null,
        IConstM1 => Value::int(-1),
        IConst0 => Value::int(0),
        IConst1 => Value::int(1),
        IConst2 => Value::int(2),
        IConst3 => Value::int(3),
        IConst4 => Value::int(4),
        IConst5 => Value::int(5),
        LConst0 => Value::long(0),
        LConst1 => Value::long(1),
        FConst0 => Value::float(0.0),
        FConst1 => Value::float(1.0),
        FConst2 => Value::float(2.0),
        DConst0 => Value::double(0.0),
        DConst1 => Value::double(1.0),

        BiPush | SiPush => {
            let value = match insn.operand {
                Operand::Int(value) => value,
                _ => return Err(unexpected("int")),
            };
            let fits = if insn.opcode == BiPush {
                i8::try_from(value).is_ok()
            } else {
                i16::try_from(value).is_ok()
            };
            if fits {
                Value::int(value)
            } else {
                frame.mark_wonky(format!("{} operand {} is out of range", insn.opcode, value));
                Value::unknown(BaseType::Int)
            }
        }

        Ldc => match &insn.operand {
            Operand::Constant(constant) => constant_value(constant),
            _ => return Err(unexpected("constant")),
        },

        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    };
    frame.push_value(value);
    Ok(())
}

fn constant_value(constant: &Constant) -> Value {
    match constant {
        Constant::Int(value) => Value::int(*value),
        Constant::Long(value) => Value::long(*value),
        Constant::Float(value) => Value::float(*value),
        Constant::Double(value) => Value::double(*value),
        Constant::String(text) => Value::string(text.as_str()),
        Constant::Type(typ) => Value::Type(typ.clone()),
        Constant::MethodType(_) => Value::Object(BinaryName::METHODTYPE),
        Constant::Handle(handle) => Value::MethodHandle(handle.clone()),
    }
}
