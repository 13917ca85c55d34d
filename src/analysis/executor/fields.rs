use super::{pop_for_type, pop_non_null, unexpected, ExecutionContext};
use crate::analysis::{ExecutorErrorKind, FieldRef, Frame, Instruction, Opcode, Operand, Value};

/// `getstatic`, `putstatic`, `getfield`, `putfield`
pub(super) fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    let field: &FieldRef = match &insn.operand {
        Operand::Field(field) => field,
        _ => return Err(unexpected("field")),
    };

    match insn.opcode {
        GetStatic => {
            let value = ctx
                .lookups
                .resolve_get_static(field)
                .unwrap_or_else(|| Value::of_type(&field.descriptor));
            frame.push_value(value);
        }
        PutStatic => {
            pop_for_type(frame, PutStatic, &field.descriptor);
        }
        GetField => {
            let value = match pop_non_null(frame, GetField) {
                Some(owner) => ctx.lookups.resolve_get_field(field, &owner),
                None => None,
            };
            frame.push_value(value.unwrap_or_else(|| Value::of_type(&field.descriptor)));
        }
        PutField => {
            pop_for_type(frame, PutField, &field.descriptor);
            pop_non_null(frame, PutField);
        }
        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;
    use crate::analysis::Settings;
    use crate::jvm::class_graph::ObjectHierarchy;
    use crate::jvm::{BaseType, BinaryName};
    use crate::lookup::{LookupError, Lookups};

    fn field(opcode: Opcode, name: &str, descriptor: &str) -> Instruction {
        Instruction::field(opcode, "com/example/Point", name, descriptor).unwrap()
    }

    #[test]
    fn static_constants_are_looked_up() {
        let insn = Instruction::field(Opcode::GetStatic, "java/lang/Integer", "MAX_VALUE", "I")
            .unwrap();
        let frame = run(vec![], insn);
        assert_eq!(frame.stack(), [Value::int(i32::MAX)]);

        let frame = run(vec![], field(Opcode::GetStatic, "ORIGIN_X", "J"));
        assert_eq!(
            frame.stack(),
            [Value::unknown(BaseType::Long), Value::WideReserved]
        );
    }

    #[test]
    fn instance_fields_need_an_owner() {
        let frame = run(
            vec![Value::Object(BinaryName::OBJECT)],
            field(Opcode::GetField, "name", "Ljava/lang/String;"),
        );
        assert_eq!(frame.stack(), [Value::Object(BinaryName::STRING)]);
        assert!(!frame.is_wonky());

        let frame = run(vec![Value::Null], field(Opcode::GetField, "x", "D"));
        assert_eq!(
            frame.stack(),
            [Value::unknown(BaseType::Double), Value::WideReserved]
        );
        assert_eq!(frame.diagnostics(), ["getfield on null"]);
    }

    #[test]
    fn field_oracle_sees_the_owner() {
        let lookups = Lookups {
            get_field: Some(Box::new(|field: &FieldRef, owner: &Value| {
                match (field.name.as_ref(), owner) {
                    ("length", Value::String(text)) => Ok(Value::int(text.len() as i32)),
                    _ => Err(LookupError::Miss),
                }
            })),
            ..Lookups::none()
        };
        let settings = Settings::default();
        let ctx = ExecutionContext::new(&lookups, &settings, &ObjectHierarchy);

        let mut frame = frame_with_stack(vec![Value::string("abc")]);
        let insn = field(Opcode::GetField, "length", "I");
        execute(&mut frame, &insn, &ctx).unwrap();
        assert_eq!(frame.stack(), [Value::int(3)]);

        let mut frame = frame_with_stack(vec![Value::Object(BinaryName::OBJECT)]);
        execute(&mut frame, &insn, &ctx).unwrap();
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Int)]);
    }

    #[test]
    fn puts_check_the_value() {
        let frame = run(
            vec![Value::Object(BinaryName::OBJECT), Value::long(4)],
            field(Opcode::PutField, "x", "J"),
        );
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        let frame = run(
            vec![Value::int(4)],
            field(Opcode::PutStatic, "name", "Ljava/lang/String;"),
        );
        assert!(frame.stack().is_empty());
        assert_eq!(
            frame.diagnostics(),
            ["putstatic expected a reference, found int 4"]
        );
    }

    #[test]
    fn field_operands_are_required() {
        let mut frame = Frame::new();
        assert_eq!(
            execute(&mut frame, &Instruction::new(Opcode::GetStatic), &context()),
            Err(ExecutorErrorKind::UnexpectedOperand { expected: "field" })
        );
    }
}
