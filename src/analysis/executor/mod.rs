//! Transfer functions for individual instructions
//!
//! Each family of opcodes gets its own module. Executors only touch the frame they are given:
//! they pop operands, check them, and push results. Bad operands never abort execution. The
//! executor marks the frame wonky and pushes a fallback of the type the instruction would have
//! produced, so the stack keeps the height later instructions expect.
//!
//! Hard errors ([`ExecutorErrorKind`]) are reserved for instructions that are malformed
//! themselves: an operand of the wrong shape for the opcode, or an unsupported opcode.

use super::{
    ExecutorErrorKind, Frame, Instruction, MethodSignature, Opcode, Operand, Settings, Value,
};
use crate::jvm::class_graph::TypeHierarchy;
use crate::jvm::{BaseType, BinaryName, FieldType, RefType};
use crate::lookup::Lookups;
use crate::util::Width;

mod allocation;
mod arrays;
mod constants;
mod conversion;
mod fields;
mod flow;
mod invoke;
mod math;
mod references;
mod stack;
mod variables;

/// Everything an executor may consult besides the frame
#[derive(Copy, Clone)]
pub struct ExecutionContext<'a> {
    pub lookups: &'a Lookups,
    pub settings: &'a Settings,
    pub hierarchy: &'a dyn TypeHierarchy,

    /// Method whose body is executing, if known (used to check return instructions)
    pub method: Option<&'a MethodSignature>,

    /// Address of the instruction being executed (used as the allocation site of arrays)
    pub address: usize,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        lookups: &'a Lookups,
        settings: &'a Settings,
        hierarchy: &'a dyn TypeHierarchy,
    ) -> ExecutionContext<'a> {
        ExecutionContext {
            lookups,
            settings,
            hierarchy,
            method: None,
            address: 0,
        }
    }
}

/// Execute one instruction on the frame
pub fn execute(
    frame: &mut Frame,
    insn: &Instruction,
    ctx: &ExecutionContext,
) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match insn.opcode {
        Nop => Ok(()),

        AConstNull | IConstM1 | IConst0 | IConst1 | IConst2 | IConst3 | IConst4 | IConst5
        | LConst0 | LConst1 | FConst0 | FConst1 | FConst2 | DConst0 | DConst1 | BiPush
        | SiPush | Ldc => constants::execute(frame, insn),

        ILoad | LLoad | FLoad | DLoad | ALoad | IStore | LStore | FStore | DStore | AStore
        | IInc => variables::execute(frame, insn),

        IALoad | LALoad | FALoad | DALoad | AALoad | BALoad | CALoad | SALoad | IAStore
        | LAStore | FAStore | DAStore | AAStore | BAStore | CAStore | SAStore | ArrayLength => {
            arrays::execute(frame, insn.opcode, ctx)
        }

        Pop | Pop2 | Dup | DupX1 | DupX2 | Dup2 | Dup2X1 | Dup2X2 | Swap => {
            stack::execute(frame, insn.opcode)
        }

        IAdd | LAdd | FAdd | DAdd | ISub | LSub | FSub | DSub | IMul | LMul | FMul | DMul
        | IDiv | LDiv | FDiv | DDiv | IRem | LRem | FRem | DRem | INeg | LNeg | FNeg | DNeg
        | IShl | LShl | IShr | LShr | IUShr | LUShr | IAnd | LAnd | IOr | LOr | IXor | LXor
        | LCmp | FCmpL | FCmpG | DCmpL | DCmpG => math::execute(frame, insn.opcode),

        I2L | I2F | I2D | L2I | L2F | L2D | F2I | F2L | F2D | D2I | D2L | D2F | I2B | I2C
        | I2S => conversion::execute(frame, insn.opcode),

        IfEq | IfNe | IfLt | IfGe | IfGt | IfLe | IfICmpEq | IfICmpNe | IfICmpLt | IfICmpGe
        | IfICmpGt | IfICmpLe | IfACmpEq | IfACmpNe | IfNull | IfNonNull | Goto | GotoW
        | TableSwitch | LookupSwitch | IReturn | LReturn | FReturn | DReturn | AReturn
        | Return | AThrow => flow::execute(frame, insn, ctx),

        GetStatic | PutStatic | GetField | PutField => fields::execute(frame, insn, ctx),

        InvokeVirtual | InvokeSpecial | InvokeStatic | InvokeInterface | InvokeDynamic => {
            invoke::execute(frame, insn, ctx)
        }

        New | NewArray | ANewArray | MultiANewArray => allocation::execute(frame, insn, ctx),

        CheckCast | InstanceOf | MonitorEnter | MonitorExit => {
            references::execute(frame, insn, ctx)
        }

        Jsr | Ret | JsrW => Err(ExecutorErrorKind::Unsupported),
    }
}

/// Error for an operand that doesn't fit the opcode
fn unexpected(expected: &'static str) -> ExecutorErrorKind {
    ExecutorErrorKind::UnexpectedOperand { expected }
}

fn type_operand(insn: &Instruction) -> Result<&RefType<BinaryName>, ExecutorErrorKind> {
    match &insn.operand {
        Operand::Type(ref_type) => Ok(ref_type),
        _ => Err(unexpected("type")),
    }
}

/// Pop a value whose stack type is `ty` (two slots for `long` and `double`)
///
/// On a mismatch, the frame is marked wonky and an unknown value of type `ty` is returned.
fn pop_expecting(frame: &mut Frame, opcode: Opcode, ty: BaseType) -> Value {
    let value = if ty.width() == 2 {
        frame.pop_wide()
    } else {
        frame.pop()
    };
    if value.has_computational_type(ty) {
        value
    } else {
        frame.mark_wonky(format!(
            "{} expected {}, found {}",
            opcode,
            ty.computational_type().keyword(),
            value
        ));
        Value::unknown(ty)
    }
}

/// Pop a reference (possibly `null`)
///
/// Returns `None` after marking the frame wonky if the value isn't a reference.
fn pop_reference(frame: &mut Frame, opcode: Opcode) -> Option<Value> {
    let value = frame.pop();
    if value.is_reference() {
        Some(value)
    } else {
        frame.mark_wonky(format!("{} expected a reference, found {}", opcode, value));
        None
    }
}

/// Pop a reference that is going to be dereferenced (receivers, field owners, monitors)
///
/// Returns `None` after marking the frame wonky if the value is `null` or not a reference.
fn pop_non_null(frame: &mut Frame, opcode: Opcode) -> Option<Value> {
    let value = pop_reference(frame, opcode)?;
    if value.is_null() {
        frame.mark_wonky(format!("{} on null", opcode));
        None
    } else {
        Some(value)
    }
}

/// Pop a value to be passed where `field_type` is expected
///
/// Mismatched values are replaced by an unknown value of the expected type.
fn pop_for_type(frame: &mut Frame, opcode: Opcode, field_type: &FieldType<BinaryName>) -> Value {
    match field_type {
        FieldType::Base(base_type) => pop_expecting(frame, opcode, *base_type),
        FieldType::Ref(ref_type) => match pop_reference(frame, opcode) {
            Some(value) => value,
            None => Value::of_ref_type(ref_type),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::jvm::class_graph::ObjectHierarchy;
    use once_cell::sync::Lazy;

    pub static LOOKUPS: Lazy<Lookups> = Lazy::new(Lookups::basic);
    pub static NO_LOOKUPS: Lazy<Lookups> = Lazy::new(Lookups::none);
    pub static SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

    pub fn context() -> ExecutionContext<'static> {
        ExecutionContext::new(&LOOKUPS, &SETTINGS, &ObjectHierarchy)
    }

    pub fn frame_with_stack(stack: Vec<Value>) -> Frame {
        let mut frame = Frame::new();
        for value in stack {
            frame.push_value(value);
        }
        frame
    }

    /// Run one instruction on a frame holding `stack`
    pub fn run(stack: Vec<Value>, insn: Instruction) -> Frame {
        let mut frame = frame_with_stack(stack);
        execute(&mut frame, &insn, &context()).unwrap();
        frame
    }
}

#[cfg(test)]
mod test {
    use super::test_support::*;
    use super::*;

    #[test]
    fn unsupported_opcodes() {
        let mut frame = Frame::new();
        for opcode in [Opcode::Jsr, Opcode::Ret, Opcode::JsrW] {
            assert_eq!(
                execute(&mut frame, &Instruction::new(opcode), &context()),
                Err(ExecutorErrorKind::Unsupported)
            );
        }
    }

    #[test]
    fn every_opcode_is_dispatched() {
        // Families reject opcodes they don't implement with `NoExecutor`. With an empty
        // operand, a correctly routed opcode either runs or reports its operand.
        for opcode in Opcode::ALL {
            let mut frame = Frame::new();
            let result = execute(&mut frame, &Instruction::new(*opcode), &context());
            match (opcode, result) {
                (_, Ok(())) | (_, Err(ExecutorErrorKind::UnexpectedOperand { .. })) => (),
                (Opcode::Jsr | Opcode::Ret | Opcode::JsrW, Err(ExecutorErrorKind::Unsupported)) => {
                }
                (opcode, result) => panic!("{} was misrouted: {:?}", opcode, result),
            }
        }
    }

    #[test]
    fn popping_checks_types() {
        let mut frame = frame_with_stack(vec![Value::float(1.0)]);
        assert_eq!(
            pop_expecting(&mut frame, Opcode::IAdd, BaseType::Int),
            Value::unknown(BaseType::Int)
        );
        assert_eq!(frame.diagnostics(), ["iadd expected int, found float 1.0"]);

        let mut frame = frame_with_stack(vec![Value::int_typed(BaseType::Byte, 3)]);
        assert_eq!(
            pop_expecting(&mut frame, Opcode::IAdd, BaseType::Int),
            Value::int_typed(BaseType::Byte, 3)
        );
        assert!(!frame.is_wonky());

        let mut frame = frame_with_stack(vec![Value::Null]);
        assert_eq!(pop_non_null(&mut frame, Opcode::MonitorEnter), None);
        assert_eq!(frame.diagnostics(), ["monitorenter on null"]);
    }
}
