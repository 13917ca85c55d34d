use super::{pop_expecting, pop_reference, unexpected, ExecutionContext};
use crate::analysis::{ExecutorErrorKind, Frame, Instruction, Opcode, Operand, Value};
use crate::jvm::{BaseType, BinaryName, FieldType};

/// Branches, switches, returns, and `athrow`
///
/// Only the operands are checked here. Where control goes next is up to the caller, which
/// resolves the labels in the instruction.
pub(super) fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    let opcode = insn.opcode;
    match opcode {
        IfEq | IfNe | IfLt | IfGe | IfGt | IfLe => {
            jump_operand(insn)?;
            pop_expecting(frame, opcode, BaseType::Int);
        }
        IfICmpEq | IfICmpNe | IfICmpLt | IfICmpGe | IfICmpGt | IfICmpLe => {
            jump_operand(insn)?;
            pop_expecting(frame, opcode, BaseType::Int);
            pop_expecting(frame, opcode, BaseType::Int);
        }
        IfACmpEq | IfACmpNe => {
            jump_operand(insn)?;
            pop_reference(frame, opcode);
            pop_reference(frame, opcode);
        }
        IfNull | IfNonNull => {
            jump_operand(insn)?;
            pop_reference(frame, opcode);
        }
        Goto | GotoW => {
            jump_operand(insn)?;
        }

        TableSwitch | LookupSwitch => {
            match &insn.operand {
                Operand::TableSwitch { .. } | Operand::LookupSwitch { .. } => (),
                _ => return Err(unexpected("switch")),
            }
            pop_expecting(frame, opcode, BaseType::Int);
        }

        IReturn | LReturn | FReturn | DReturn | AReturn | Return => {
            match opcode {
                IReturn => pop_expecting(frame, opcode, BaseType::Int),
                LReturn => pop_expecting(frame, opcode, BaseType::Long),
                FReturn => pop_expecting(frame, opcode, BaseType::Float),
                DReturn => pop_expecting(frame, opcode, BaseType::Double),
                AReturn => pop_reference(frame, opcode).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            if let Some(method) = ctx.method {
                let return_type = method.return_type.as_ref();
                if return_opcode(return_type) != opcode {
                    let declared = match return_type {
                        Some(return_type) => return_type.to_string(),
                        None => "void".to_owned(),
                    };
                    frame.mark_wonky(format!("{} in a method returning {}", opcode, declared));
                }
            }
        }

        AThrow => {
            match pop_reference(frame, opcode) {
                Some(Value::Null) | None => (),
                Some(Value::Array(array)) => {
                    frame.mark_wonky(format!("athrow of {}", array.array_type()));
                }
                Some(value) => {
                    let class = value.class_name().unwrap_or(BinaryName::OBJECT);
                    let hierarchy = ctx.hierarchy;
                    if hierarchy.is_assignable(&class, &BinaryName::THROWABLE) == Some(false) {
                        frame.mark_wonky(format!("athrow of non-throwable {}", class));
                    }
                }
            }
            frame.clear_stack();
        }

        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

fn jump_operand(insn: &Instruction) -> Result<&str, ExecutorErrorKind> {
    match &insn.operand {
        Operand::Jump(label) => Ok(label.as_str()),
        _ => Err(unexpected("label")),
    }
}

/// Return instruction matching a declared return type
fn return_opcode(return_type: Option<&FieldType<BinaryName>>) -> Opcode {
    match return_type {
        None => Opcode::Return,
        Some(FieldType::Ref(_)) => Opcode::AReturn,
        Some(FieldType::Base(base_type)) => match base_type.computational_type() {
            BaseType::Long => Opcode::LReturn,
            BaseType::Float => Opcode::FReturn,
            BaseType::Double => Opcode::DReturn,
            _ => Opcode::IReturn,
        },
    }
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;
    use crate::analysis::MethodSignature;
    use crate::jvm::MethodAccessFlags;

    #[test]
    fn conditional_jumps_check_operands() {
        let frame = run(vec![Value::int(1)], Instruction::jump(Opcode::IfEq, "L1"));
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        let frame = run(
            vec![Value::Null, Value::string("x")],
            Instruction::jump(Opcode::IfACmpNe, "L1"),
        );
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        let frame = run(
            vec![Value::int(1), Value::Null],
            Instruction::jump(Opcode::IfICmpLt, "L1"),
        );
        assert!(frame.stack().is_empty());
        assert_eq!(frame.diagnostics(), ["if_icmplt expected int, found null"]);

        let frame = run(vec![Value::int(0)], Instruction::jump(Opcode::IfNull, "L1"));
        assert_eq!(frame.diagnostics(), ["ifnull expected a reference, found int 0"]);
    }

    #[test]
    fn jumps_need_labels() {
        let mut frame = frame_with_stack(vec![Value::int(1)]);
        assert_eq!(
            execute(&mut frame, &Instruction::new(Opcode::IfNe), &context()),
            Err(ExecutorErrorKind::UnexpectedOperand { expected: "label" })
        );

        let frame = run(vec![], Instruction::jump(Opcode::Goto, "L1"));
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());
    }

    #[test]
    fn switches_pop_an_int() {
        let insn = Instruction::table_switch(0, 1, &["A", "B"], "C");
        let frame = run(vec![Value::unknown(BaseType::Char)], insn);
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        let insn = Instruction::lookup_switch(&[(10, "A")], "B");
        let frame = run(vec![Value::long(10)], insn);
        assert!(frame.is_wonky());
    }

    #[test]
    fn returns_check_the_method() {
        let method =
            MethodSignature::new("com/example/A", "f", "()J", MethodAccessFlags::STATIC).unwrap();
        let ctx = ExecutionContext {
            method: Some(&method),
            ..context()
        };

        let mut frame = frame_with_stack(vec![Value::long(1)]);
        execute(&mut frame, &Instruction::new(Opcode::LReturn), &ctx).unwrap();
        assert!(!frame.is_wonky());

        let mut frame = frame_with_stack(vec![Value::int(1)]);
        execute(&mut frame, &Instruction::new(Opcode::IReturn), &ctx).unwrap();
        assert_eq!(frame.diagnostics(), ["ireturn in a method returning J"]);

        // Without a signature, only the operand is checked
        let frame = run(vec![Value::int(1)], Instruction::new(Opcode::IReturn));
        assert!(!frame.is_wonky());
        let frame = run(vec![Value::int(1)], Instruction::new(Opcode::AReturn));
        assert!(frame.is_wonky());
    }

    #[test]
    fn void_returns() {
        let method =
            MethodSignature::new("com/example/A", "g", "(Z)V", MethodAccessFlags::STATIC).unwrap();
        let ctx = ExecutionContext {
            method: Some(&method),
            ..context()
        };
        let mut frame = Frame::new();
        execute(&mut frame, &Instruction::new(Opcode::Return), &ctx).unwrap();
        assert!(!frame.is_wonky());

        let mut frame = frame_with_stack(vec![Value::Null]);
        execute(&mut frame, &Instruction::new(Opcode::AReturn), &ctx).unwrap();
        assert_eq!(frame.diagnostics(), ["areturn in a method returning void"]);
    }

    #[test]
    fn throws_clear_the_stack() {
        let frame = run(
            vec![
                Value::int(1),
                Value::Object(BinaryName::NULLPOINTEREXCEPTION),
            ],
            Instruction::new(Opcode::AThrow),
        );
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        let frame = run(vec![Value::Null], Instruction::new(Opcode::AThrow));
        assert!(!frame.is_wonky());

        let frame = run(
            vec![Value::int(1), Value::int(2)],
            Instruction::new(Opcode::AThrow),
        );
        assert!(frame.stack().is_empty());
        assert!(frame.is_wonky());
    }
}
