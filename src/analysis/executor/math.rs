use super::pop_expecting;
use crate::analysis::{
    compare_floats, compare_longs, BinaryOp, ExecutorErrorKind, Frame, Number, Opcode, Value,
};
use crate::jvm::BaseType;

/// Arithmetic, bitwise operations, negation, and comparisons
pub(super) fn execute(frame: &mut Frame, opcode: Opcode) -> Result<(), ExecutorErrorKind> {
    use BaseType::{Double, Float, Int, Long};
    use Opcode::*;

    match opcode {
        IAdd => binary(frame, opcode, BinaryOp::Add, Int),
        LAdd => binary(frame, opcode, BinaryOp::Add, Long),
        FAdd => binary(frame, opcode, BinaryOp::Add, Float),
        DAdd => binary(frame, opcode, BinaryOp::Add, Double),
        ISub => binary(frame, opcode, BinaryOp::Sub, Int),
        LSub => binary(frame, opcode, BinaryOp::Sub, Long),
        FSub => binary(frame, opcode, BinaryOp::Sub, Float),
        DSub => binary(frame, opcode, BinaryOp::Sub, Double),
        IMul => binary(frame, opcode, BinaryOp::Mul, Int),
        LMul => binary(frame, opcode, BinaryOp::Mul, Long),
        FMul => binary(frame, opcode, BinaryOp::Mul, Float),
        DMul => binary(frame, opcode, BinaryOp::Mul, Double),
        IDiv => binary(frame, opcode, BinaryOp::Div, Int),
        LDiv => binary(frame, opcode, BinaryOp::Div, Long),
        FDiv => binary(frame, opcode, BinaryOp::Div, Float),
        DDiv => binary(frame, opcode, BinaryOp::Div, Double),
        IRem => binary(frame, opcode, BinaryOp::Rem, Int),
        LRem => binary(frame, opcode, BinaryOp::Rem, Long),
        FRem => binary(frame, opcode, BinaryOp::Rem, Float),
        DRem => binary(frame, opcode, BinaryOp::Rem, Double),
        IShl => binary(frame, opcode, BinaryOp::Shl, Int),
        LShl => shift(frame, opcode, BinaryOp::Shl),
        IShr => binary(frame, opcode, BinaryOp::Shr, Int),
        LShr => shift(frame, opcode, BinaryOp::Shr),
        IUShr => binary(frame, opcode, BinaryOp::UShr, Int),
        LUShr => shift(frame, opcode, BinaryOp::UShr),
        IAnd => binary(frame, opcode, BinaryOp::And, Int),
        LAnd => binary(frame, opcode, BinaryOp::And, Long),
        IOr => binary(frame, opcode, BinaryOp::Or, Int),
        LOr => binary(frame, opcode, BinaryOp::Or, Long),
        IXor => binary(frame, opcode, BinaryOp::Xor, Int),
        LXor => binary(frame, opcode, BinaryOp::Xor, Long),

        INeg => negate(frame, opcode, Int),
        LNeg => negate(frame, opcode, Long),
        FNeg => negate(frame, opcode, Float),
        DNeg => negate(frame, opcode, Double),

        LCmp => {
            let rhs = pop_expecting(frame, opcode, Long).number_value();
            let lhs = pop_expecting(frame, opcode, Long).number_value();
            let result = match (lhs, rhs) {
                (Some(lhs), Some(rhs)) => Value::int(compare_longs(lhs.as_long(), rhs.as_long())),
                _ => Value::unknown(Int),
            };
            frame.push(result);
        }
        FCmpL => compare(frame, opcode, Float, -1),
        FCmpG => compare(frame, opcode, Float, 1),
        DCmpL => compare(frame, opcode, Double, -1),
        DCmpG => compare(frame, opcode, Double, 1),

        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

fn binary(frame: &mut Frame, opcode: Opcode, op: BinaryOp, ty: BaseType) {
    let rhs = pop_expecting(frame, opcode, ty).number_value();
    let lhs = pop_expecting(frame, opcode, ty).number_value();
    push_result(frame, op, ty, lhs, rhs);
}

/// `long` shifts, whose shift distance is an `int`
fn shift(frame: &mut Frame, opcode: Opcode, op: BinaryOp) {
    let rhs = pop_expecting(frame, opcode, BaseType::Int).number_value();
    let lhs = pop_expecting(frame, opcode, BaseType::Long).number_value();
    push_result(frame, op, BaseType::Long, lhs, rhs);
}

fn push_result(
    frame: &mut Frame,
    op: BinaryOp,
    ty: BaseType,
    lhs: Option<Number>,
    rhs: Option<Number>,
) {
    let value = match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => op.apply(ty, lhs, rhs),
        _ => None,
    };
    frame.push_value(Value::Numeric { ty, value });
}

fn negate(frame: &mut Frame, opcode: Opcode, ty: BaseType) {
    let operand = pop_expecting(frame, opcode, ty).number_value();
    frame.push_value(Value::Numeric {
        ty,
        value: operand.map(|number| number.convert(ty).negate()),
    });
}

/// `fcmp<op>` and `dcmp<op>`
fn compare(frame: &mut Frame, opcode: Opcode, ty: BaseType, nan_result: i32) {
    let rhs = pop_expecting(frame, opcode, ty).number_value();
    let lhs = pop_expecting(frame, opcode, ty).number_value();
    frame.push(match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Value::int(compare_floats(
            lhs.as_double(),
            rhs.as_double(),
            nan_result,
        )),
        _ => Value::unknown(BaseType::Int),
    });
}
