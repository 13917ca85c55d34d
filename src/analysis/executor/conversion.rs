use super::pop_expecting;
use crate::analysis::{ExecutorErrorKind, Frame, Opcode, Value};
use crate::jvm::BaseType;

/// Primitive conversions (`i2l`, `d2i`, `i2b`, ...)
pub(super) fn execute(frame: &mut Frame, opcode: Opcode) -> Result<(), ExecutorErrorKind> {
    use BaseType::*;
    use Opcode::*;

    let (from, to) = match opcode {
        I2L => (Int, Long),
        I2F => (Int, Float),
        I2D => (Int, Double),
        L2I => (Long, Int),
        L2F => (Long, Float),
        L2D => (Long, Double),
        F2I => (Float, Int),
        F2L => (Float, Long),
        F2D => (Float, Double),
        D2I => (Double, Int),
        D2L => (Double, Long),
        D2F => (Double, Float),
        I2B => (Int, Byte),
        I2C => (Int, Char),
        I2S => (Int, Short),
        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    };
    let operand = pop_expecting(frame, opcode, from);
    frame.push_value(Value::Numeric {
        ty: to,
        value: operand.number_value().map(|number| number.convert(to)),
    });
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;
    use crate::analysis::Instruction;

    #[test]
    fn conversions() {
        let frame = run(vec![Value::int(-1)], Instruction::new(Opcode::I2L));
        assert_eq!(frame.stack(), [Value::long(-1), Value::WideReserved]);

        let frame = run(vec![Value::double(f64::NAN)], Instruction::new(Opcode::D2I));
        assert_eq!(frame.stack(), [Value::int(0)]);

        let frame = run(vec![Value::float(1e20)], Instruction::new(Opcode::F2I));
        assert_eq!(frame.stack(), [Value::int(i32::MAX)]);

        let frame = run(vec![Value::int(0x1_ff80)], Instruction::new(Opcode::I2S));
        assert_eq!(frame.stack(), [Value::int_typed(BaseType::Short, -128)]);

        let frame = run(vec![Value::int(-1)], Instruction::new(Opcode::I2C));
        assert_eq!(frame.stack(), [Value::int_typed(BaseType::Char, 0xffff)]);
    }

    #[test]
    fn unknown_and_mismatched_operands() {
        let frame = run(
            vec![Value::unknown(BaseType::Long)],
            Instruction::new(Opcode::L2F),
        );
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Float)]);
        assert!(!frame.is_wonky());

        let frame = run(vec![Value::int(3)], Instruction::new(Opcode::D2F));
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Float)]);
        assert!(frame.is_wonky());
    }
}
