use super::{pop_expecting, pop_reference, unexpected};
use crate::analysis::{ExecutorErrorKind, Frame, Instruction, Opcode, Operand, Value};
use crate::jvm::{BaseType, BinaryName};

/// Local variable loads, stores, and `iinc`
pub(super) fn execute(frame: &mut Frame, insn: &Instruction) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match (insn.opcode, &insn.operand) {
        (ILoad, Operand::Variable(name)) => load(frame, insn.opcode, name, Some(BaseType::Int)),
        (LLoad, Operand::Variable(name)) => load(frame, insn.opcode, name, Some(BaseType::Long)),
        (FLoad, Operand::Variable(name)) => load(frame, insn.opcode, name, Some(BaseType::Float)),
        (DLoad, Operand::Variable(name)) => {
            load(frame, insn.opcode, name, Some(BaseType::Double))
        }
        (ALoad, Operand::Variable(name)) => load(frame, insn.opcode, name, None),

        (IStore, Operand::Variable(name)) => store(frame, insn.opcode, name, Some(BaseType::Int)),
        (LStore, Operand::Variable(name)) => {
            store(frame, insn.opcode, name, Some(BaseType::Long))
        }
        (FStore, Operand::Variable(name)) => {
            store(frame, insn.opcode, name, Some(BaseType::Float))
        }
        (DStore, Operand::Variable(name)) => {
            store(frame, insn.opcode, name, Some(BaseType::Double))
        }
        (AStore, Operand::Variable(name)) => store(frame, insn.opcode, name, None),

        (IInc, Operand::Increment { variable, amount }) => increment(frame, variable, *amount),

        (IInc, _) => return Err(unexpected("increment")),
        (ILoad | LLoad | FLoad | DLoad | ALoad | IStore | LStore | FStore | DStore | AStore, _) => {
            return Err(unexpected("variable"))
        }
        (other, _) => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

/// Value pushed when a load finds nothing usable
///
/// `expected` is the stack type of the opcode, or `None` for references.
fn fallback(expected: Option<BaseType>) -> Value {
    match expected {
        Some(ty) => Value::unknown(ty),
        None => Value::Object(BinaryName::OBJECT),
    }
}

fn fits(value: &Value, expected: Option<BaseType>) -> bool {
    match expected {
        Some(ty) => value.has_computational_type(ty),
        None => value.is_reference(),
    }
}

fn describe(expected: Option<BaseType>) -> &'static str {
    match expected {
        Some(ty) => ty.keyword(),
        None => "a reference",
    }
}

fn load(frame: &mut Frame, opcode: Opcode, name: &str, expected: Option<BaseType>) {
    let value = match frame.get_local(name) {
        Some(value) if fits(value, expected) => value.clone(),
        None | Some(Value::EmptyStack) => {
            frame.mark_wonky(format!("{} of uninitialized local {}", opcode, name));
            fallback(expected)
        }
        Some(value) => {
            let message = format!(
                "{} expected {}, local {} holds {}",
                opcode,
                describe(expected),
                name,
                value
            );
            frame.mark_wonky(message);
            fallback(expected)
        }
    };
    frame.push_value(value);
}

fn store(frame: &mut Frame, opcode: Opcode, name: &str, expected: Option<BaseType>) {
    let value = match expected {
        Some(ty) => pop_expecting(frame, opcode, ty),
        None => pop_reference(frame, opcode).unwrap_or_else(|| fallback(None)),
    };
    frame.set_local(name, value);
}

fn increment(frame: &mut Frame, name: &str, amount: i32) {
    let current = match frame.get_local(name) {
        Some(Value::Numeric { ty, value }) if ty.is_int_like() => *value,
        None | Some(Value::EmptyStack) => {
            frame.mark_wonky(format!("iinc of uninitialized local {}", name));
            return;
        }
        Some(other) => {
            let message = format!("iinc expected int, local {} holds {}", name, other);
            frame.mark_wonky(message);
            return;
        }
    };
    if let Some(current) = current {
        frame.set_local(name, Value::int(current.as_int().wrapping_add(amount)));
    }
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;

    fn run_with_locals(locals: Vec<(&str, Value)>, insn: Instruction) -> Frame {
        let mut frame = Frame::with_locals(locals);
        super::execute(&mut frame, &insn).unwrap();
        frame
    }

    #[test]
    fn loads() {
        let frame = run_with_locals(
            vec![("x", Value::int(3))],
            Instruction::variable(Opcode::ILoad, "x"),
        );
        assert_eq!(frame.stack(), [Value::int(3)]);
        assert!(!frame.is_wonky());

        let frame = run_with_locals(
            vec![("x", Value::long(3))],
            Instruction::variable(Opcode::LLoad, "x"),
        );
        assert_eq!(frame.stack(), [Value::long(3), Value::WideReserved]);

        let frame = run_with_locals(
            vec![("s", Value::Null)],
            Instruction::variable(Opcode::ALoad, "s"),
        );
        assert_eq!(frame.stack(), [Value::Null]);
        assert!(!frame.is_wonky());
    }

    #[test]
    fn bad_loads_push_fallbacks() {
        let frame = run_with_locals(vec![], Instruction::variable(Opcode::DLoad, "missing"));
        assert_eq!(
            frame.stack(),
            [Value::unknown(BaseType::Double), Value::WideReserved]
        );
        assert_eq!(frame.diagnostics(), ["dload of uninitialized local missing"]);

        let frame = run_with_locals(
            vec![("x", Value::int(3))],
            Instruction::variable(Opcode::ALoad, "x"),
        );
        assert_eq!(frame.stack(), [Value::Object(BinaryName::OBJECT)]);
        assert_eq!(
            frame.diagnostics(),
            ["aload expected a reference, local x holds int 3"]
        );
    }

    #[test]
    fn stores() {
        let mut frame = frame_with_stack(vec![Value::double(2.5)]);
        super::execute(&mut frame, &Instruction::variable(Opcode::DStore, "d")).unwrap();
        assert!(frame.stack().is_empty());
        assert_eq!(frame.get_local("d"), Some(&Value::double(2.5)));
        assert!(!frame.is_wonky());

        // Only one slot of an int is on the stack
        let mut frame = frame_with_stack(vec![Value::int(1)]);
        super::execute(&mut frame, &Instruction::variable(Opcode::LStore, "l")).unwrap();
        assert_eq!(frame.get_local("l"), Some(&Value::unknown(BaseType::Long)));
        assert!(frame.is_wonky());

        let mut frame = frame_with_stack(vec![Value::float(1.0)]);
        super::execute(&mut frame, &Instruction::variable(Opcode::AStore, "a")).unwrap();
        assert_eq!(frame.get_local("a"), Some(&Value::Object(BinaryName::OBJECT)));
        assert!(frame.is_wonky());
    }

    #[test]
    fn increments() {
        let frame = run_with_locals(vec![("i", Value::int(i32::MAX))], Instruction::iinc("i", 1));
        assert_eq!(frame.get_local("i"), Some(&Value::int(i32::MIN)));

        let frame = run_with_locals(
            vec![("i", Value::unknown(BaseType::Int))],
            Instruction::iinc("i", 1),
        );
        assert_eq!(frame.get_local("i"), Some(&Value::unknown(BaseType::Int)));
        assert!(!frame.is_wonky());

        let frame = run_with_locals(vec![("f", Value::float(1.0))], Instruction::iinc("f", 1));
        assert_eq!(frame.get_local("f"), Some(&Value::float(1.0)));
        assert!(frame.is_wonky());

        let frame = run_with_locals(vec![], Instruction::iinc("i", 1));
        assert!(frame.locals().is_empty());
        assert!(frame.is_wonky());
    }
}
