use jvm_stack_analysis::analysis::{
    execute, Constant, ExecutionContext, Frame, Instruction, Opcode, Settings, Value,
};
use jvm_stack_analysis::jvm::class_graph::ObjectHierarchy;
use jvm_stack_analysis::jvm::{BaseType, BinaryName};
use jvm_stack_analysis::lookup::Lookups;
use once_cell::sync::Lazy;
use proptest::prelude::*;

static LOOKUPS: Lazy<Lookups> = Lazy::new(Lookups::basic);
static SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

fn step(frame: &mut Frame, insn: &Instruction) {
    let ctx = ExecutionContext::new(&LOOKUPS, &SETTINGS, &ObjectHierarchy);
    execute(frame, insn, &ctx).unwrap();
}

/// Any value that fits in one stack slot, sentinels included
fn slot() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::int),
        any::<f32>().prop_map(Value::float),
        any::<bool>().prop_map(Value::boolean),
        Just(Value::unknown(BaseType::Int)),
        Just(Value::unknown(BaseType::Char)),
        Just(Value::unknown(BaseType::Float)),
        Just(Value::Null),
        Just(Value::Object(BinaryName::OBJECT)),
        "[a-z]{0,6}".prop_map(Value::string),
        Just(Value::EmptyStack),
        Just(Value::WideReserved),
    ]
}

/// Opcodes that always consume and produce the same number of slots
const FIXED_EFFECTS: &[(Opcode, isize)] = &[
    (Opcode::IAdd, -1),
    (Opcode::FMul, -1),
    (Opcode::IShl, -1),
    (Opcode::INeg, 0),
    (Opcode::I2F, 0),
    (Opcode::I2L, 1),
    (Opcode::I2D, 1),
    (Opcode::L2I, -1),
    (Opcode::D2F, -1),
    (Opcode::LAdd, -2),
    (Opcode::DDiv, -2),
    (Opcode::LShl, -1),
    (Opcode::LCmp, -3),
    (Opcode::DCmpG, -3),
    (Opcode::FCmpL, -1),
    (Opcode::Pop, -1),
    (Opcode::Pop2, -2),
    (Opcode::Dup, 1),
    (Opcode::DupX1, 1),
    (Opcode::Dup2, 2),
    (Opcode::Swap, 0),
    (Opcode::ArrayLength, 0),
    (Opcode::IALoad, -1),
    (Opcode::LALoad, 0),
    (Opcode::IAStore, -3),
    (Opcode::DAStore, -4),
    (Opcode::MonitorEnter, -1),
    (Opcode::AConstNull, 1),
    (Opcode::LConst1, 2),
];

proptest! {
    #[test]
    fn stack_effects_do_not_depend_on_values(
        base in prop::collection::vec(slot(), 4..8),
        index in 0..FIXED_EFFECTS.len(),
    ) {
        let (opcode, delta) = FIXED_EFFECTS[index];
        let mut frame = Frame::new();
        for value in base.iter().cloned() {
            frame.push(value);
        }
        step(&mut frame, &Instruction::new(opcode));
        prop_assert_eq!(frame.stack().len() as isize, base.len() as isize + delta);
    }

    #[test]
    fn wide_values_take_two_slots(
        long in any::<i64>(),
        double in any::<f64>(),
        local in slot(),
    ) {
        let instructions = [
            Instruction::ldc(Constant::Long(long)),
            Instruction::ldc(Constant::Double(double)),
            Instruction::new(Opcode::DConst1),
            Instruction::variable(Opcode::LLoad, "x"),
            Instruction::variable(Opcode::DLoad, "x"),
        ];
        for insn in &instructions {
            let mut frame = Frame::with_locals([("x", local.clone())]);
            step(&mut frame, insn);
            prop_assert_eq!(frame.stack().len(), 2);
            prop_assert!(frame.stack()[0].is_wide_numeric());
            prop_assert!(frame.stack()[1].is_wide_reserved());
        }

        let mut frame = Frame::new();
        frame.push_value(Value::long(long));
        let abs =
            Instruction::method(Opcode::InvokeStatic, "java/lang/Math", "abs", "(J)J").unwrap();
        step(&mut frame, &abs);
        prop_assert_eq!(frame.stack(), [Value::long(long.wrapping_abs()), Value::WideReserved]);
    }

    #[test]
    fn nan_comparisons_follow_the_opcode(number in any::<f64>(), nan_first in any::<bool>()) {
        let (left, right) = if nan_first { (f64::NAN, number) } else { (number, f64::NAN) };
        for (opcode, expected) in [(Opcode::DCmpG, 1), (Opcode::DCmpL, -1)] {
            let mut frame = Frame::new();
            frame.push_value(Value::double(left));
            frame.push_value(Value::double(right));
            step(&mut frame, &Instruction::new(opcode));
            prop_assert_eq!(frame.stack(), [Value::int(expected)]);
        }

        let (left, right) = (left as f32, right as f32);
        for (opcode, expected) in [(Opcode::FCmpG, 1), (Opcode::FCmpL, -1)] {
            let mut frame = Frame::new();
            frame.push(Value::float(left));
            frame.push(Value::float(right));
            step(&mut frame, &Instruction::new(opcode));
            prop_assert_eq!(frame.stack(), [Value::int(expected)]);
        }
    }

    #[test]
    fn stored_elements_can_be_loaded_back(
        (length, index) in (1..16i32).prop_flat_map(|length| (Just(length), 0..length)),
        element in any::<i32>(),
        long_element in any::<i64>(),
    ) {
        let cases = [
            (BaseType::Int, Opcode::IAStore, Opcode::IALoad, Value::int(element)),
            (BaseType::Long, Opcode::LAStore, Opcode::LALoad, Value::long(long_element)),
            (BaseType::Short, Opcode::SAStore, Opcode::SALoad, Value::int(element)),
        ];
        for (element_type, store, load, value) in cases {
            let expected = match element_type {
                BaseType::Short => Value::int_typed(BaseType::Short, element),
                _ => value.clone(),
            };
            let mut frame = Frame::new();
            frame.push(Value::int(length));
            step(&mut frame, &Instruction::new_array(element_type));
            step(&mut frame, &Instruction::variable(Opcode::AStore, "array"));

            step(&mut frame, &Instruction::variable(Opcode::ALoad, "array"));
            frame.push(Value::int(index));
            frame.push_value(value.clone());
            step(&mut frame, &Instruction::new(store));
            prop_assert!(frame.stack().is_empty());

            step(&mut frame, &Instruction::variable(Opcode::ALoad, "array"));
            frame.push(Value::int(index));
            step(&mut frame, &Instruction::new(load));
            prop_assert_eq!(frame.stack()[0].clone(), expected);
            prop_assert!(!frame.is_wonky());
        }
    }

    #[test]
    fn short_stacks_never_panic(
        stack in prop::collection::vec(slot(), 0..3),
        index in 0..Opcode::ALL.len(),
    ) {
        let opcode = Opcode::ALL[index];
        let mut frame = Frame::new();
        for value in stack.iter().cloned() {
            frame.push(value);
        }
        let ctx = ExecutionContext::new(&LOOKUPS, &SETTINGS, &ObjectHierarchy);
        // Operand-less instructions may be rejected, but never by panicking
        let _ = execute(&mut frame, &Instruction::new(opcode), &ctx);
    }
}

#[test]
fn underflow_is_wonky() {
    let popping = [
        Opcode::IAdd,
        Opcode::LAdd,
        Opcode::FNeg,
        Opcode::D2I,
        Opcode::LCmp,
        Opcode::IALoad,
        Opcode::AAStore,
        Opcode::ArrayLength,
        Opcode::Pop,
        Opcode::Pop2,
        Opcode::Dup,
        Opcode::DupX2,
        Opcode::Dup2X2,
        Opcode::Swap,
        Opcode::IReturn,
        Opcode::DReturn,
        Opcode::AThrow,
        Opcode::MonitorExit,
    ];
    for opcode in popping {
        let mut frame = Frame::new();
        step(&mut frame, &Instruction::new(opcode));
        assert!(frame.is_wonky(), "{} on an empty stack", opcode);
    }
}
