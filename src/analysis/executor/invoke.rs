use super::{pop_for_type, pop_non_null, unexpected, ExecutionContext};
use crate::analysis::{ExecutorErrorKind, Frame, Instruction, Opcode, Operand, Value};
use crate::jvm::{BinaryName, MethodDescriptor};

/// Method invocations
///
/// Arguments are popped rightmost first and checked against the descriptor. Non-static calls
/// also pop a receiver, which must not be `null`. The result is whatever the lookups can tell
/// about the call, and otherwise an unknown value of the declared return type.
pub(super) fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    let opcode = insn.opcode;
    let (method, descriptor): (_, &MethodDescriptor<BinaryName>) = match opcode {
        InvokeDynamic => match &insn.operand {
            Operand::InvokeDynamic(call_site) => (None, &call_site.descriptor),
            _ => return Err(unexpected("call site")),
        },
        InvokeVirtual | InvokeSpecial | InvokeStatic | InvokeInterface => match &insn.operand {
            Operand::Method(method) => (Some(method), &method.descriptor),
            _ => return Err(unexpected("method")),
        },
        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    };

    let mut arguments: Vec<Value> = descriptor
        .parameters
        .iter()
        .rev()
        .map(|parameter| pop_for_type(frame, opcode, parameter))
        .collect();
    arguments.reverse();

    let receiver = match opcode {
        InvokeStatic | InvokeDynamic => None,
        _ => pop_non_null(frame, opcode),
    };

    let return_type = match &descriptor.return_type {
        Some(return_type) => return_type,
        None => return Ok(()),
    };
    let resolved = match (opcode, method, &receiver) {
        (InvokeStatic, Some(method), _) => ctx.lookups.resolve_invoke_static(method, &arguments),
        (InvokeVirtual | InvokeInterface, Some(method), Some(receiver)) => ctx
            .lookups
            .resolve_invoke_virtual(method, receiver, &arguments),
        _ => None,
    };
    frame.push_value(resolved.unwrap_or_else(|| Value::of_type(return_type)));
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;
    use crate::analysis::{DynamicCallSite, Handle, HandleKind, Settings};
    use crate::jvm::class_graph::ObjectHierarchy;
    use crate::jvm::{BaseType, FieldType, Name, ParseDescriptor, UnqualifiedName};
    use crate::lookup::Lookups;

    fn method(opcode: Opcode, owner: &str, name: &str, descriptor: &str) -> Instruction {
        Instruction::method(opcode, owner, name, descriptor).unwrap()
    }

    #[test]
    fn static_calls_fold_through_lookups() {
        let insn = method(Opcode::InvokeStatic, "java/lang/Math", "max", "(II)I");
        let frame = run(vec![Value::int(3), Value::int(9)], insn.clone());
        assert_eq!(frame.stack(), [Value::int(9)]);

        let frame = run(vec![Value::int(3), Value::unknown(BaseType::Int)], insn);
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Int)]);
        assert!(!frame.is_wonky());

        // Division by zero is not folded, but isn't wonky either
        let insn = method(Opcode::InvokeStatic, "java/lang/Math", "floorDiv", "(JJ)J");
        let frame = run(vec![Value::long(1), Value::long(0)], insn);
        assert_eq!(
            frame.stack(),
            [Value::unknown(BaseType::Long), Value::WideReserved]
        );
        assert!(!frame.is_wonky());
    }

    #[test]
    fn arguments_are_popped_in_reverse() {
        let insn = method(
            Opcode::InvokeStatic,
            "com/example/Util",
            "mix",
            "(JIDLjava/lang/String;)V",
        );
        let frame = run(
            vec![
                Value::long(1),
                Value::int(2),
                Value::double(3.0),
                Value::string("four"),
            ],
            insn.clone(),
        );
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());

        // Swapped arguments
        let frame = run(
            vec![
                Value::int(2),
                Value::long(1),
                Value::double(3.0),
                Value::string("four"),
            ],
            insn,
        );
        assert!(frame.is_wonky());
    }

    #[test]
    fn virtual_calls_need_receivers() {
        let insn = method(Opcode::InvokeVirtual, "java/lang/String", "length", "()I");
        let frame = run(vec![Value::string("hello")], insn.clone());
        assert_eq!(frame.stack(), [Value::int(5)]);

        let frame = run(vec![Value::Null], insn.clone());
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Int)]);
        assert_eq!(frame.diagnostics(), ["invokevirtual on null"]);

        let frame = run(vec![Value::int(0)], insn);
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Int)]);
        assert!(frame.is_wonky());

        let insn = method(Opcode::InvokeSpecial, "java/lang/Object", "<init>", "()V");
        let frame = run(vec![Value::Object(BinaryName::OBJECT)], insn);
        assert!(frame.stack().is_empty());
        assert!(!frame.is_wonky());
    }

    #[test]
    fn results_follow_the_descriptor() {
        let insn = method(
            Opcode::InvokeInterface,
            "java/util/List",
            "toArray",
            "()[Ljava/lang/Object;",
        );
        let frame = run(vec![Value::Object(BinaryName::LIST)], insn);
        assert_eq!(
            frame.stack(),
            [Value::of_type(&FieldType::parse("[Ljava/lang/Object;").unwrap())]
        );

        let frame = run(
            vec![],
            method(Opcode::InvokeStatic, "java/lang/System", "nanoTime", "()J"),
        );
        assert_eq!(
            frame.stack(),
            [Value::unknown(BaseType::Long), Value::WideReserved]
        );
    }

    #[test]
    fn lookups_are_optional() {
        let lookups = Lookups::none();
        let settings = Settings::default();
        let ctx = ExecutionContext::new(&lookups, &settings, &ObjectHierarchy);
        let mut frame = frame_with_stack(vec![Value::int(-4)]);
        let insn = method(Opcode::InvokeStatic, "java/lang/Math", "abs", "(I)I");
        execute(&mut frame, &insn, &ctx).unwrap();
        assert_eq!(frame.stack(), [Value::unknown(BaseType::Int)]);
    }

    #[test]
    fn dynamic_call_sites() {
        let bootstrap = Handle {
            kind: HandleKind::InvokeStatic,
            owner: BinaryName::from_str("java/lang/invoke/StringConcatFactory").unwrap(),
            name: UnqualifiedName::from_str("makeConcatWithConstants").unwrap(),
            descriptor: "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;\
                         Ljava/lang/invoke/MethodType;Ljava/lang/String;[Ljava/lang/Object;)\
                         Ljava/lang/invoke/CallSite;"
                .to_owned(),
            is_interface: false,
        };
        let call_site = DynamicCallSite {
            name: UnqualifiedName::from_str("makeConcatWithConstants").unwrap(),
            descriptor: MethodDescriptor::parse("(I)Ljava/lang/String;").unwrap(),
            bootstrap,
            bootstrap_arguments: vec![],
        };
        let insn =
            Instruction::with_operand(Opcode::InvokeDynamic, Operand::InvokeDynamic(call_site));
        let frame = run(vec![Value::int(1)], insn);
        assert_eq!(frame.stack(), [Value::Object(BinaryName::STRING)]);
        assert!(!frame.is_wonky());

        let mut frame = Frame::new();
        assert_eq!(
            execute(&mut frame, &Instruction::new(Opcode::InvokeDynamic), &context()),
            Err(ExecutorErrorKind::UnexpectedOperand {
                expected: "call site"
            })
        );
    }
}
