use crate::analysis::{ExecutorErrorKind, Frame, Opcode, Value};

/// `pop`, `pop2`, `dup*`, `swap`
///
/// These move slots around without looking at their types, so the only thing to check is that
/// no `long` or `double` gets split in half.
pub(super) fn execute(frame: &mut Frame, opcode: Opcode) -> Result<(), ExecutorErrorKind> {
    use Opcode::*;

    match opcode {
        Pop => {
            splits_values(frame, opcode, &[1]);
            frame.pop();
        }
        Pop2 => {
            splits_values(frame, opcode, &[2]);
            frame.pop();
            frame.pop();
        }
        Dup => duplicate(frame, opcode, 1, 1),
        DupX1 => duplicate(frame, opcode, 1, 2),
        DupX2 => duplicate(frame, opcode, 1, 3),
        Dup2 => duplicate(frame, opcode, 2, 2),
        Dup2X1 => duplicate(frame, opcode, 2, 3),
        Dup2X2 => duplicate(frame, opcode, 2, 4),
        Swap => {
            if !splits_values(frame, opcode, &[1, 2]) {
                frame.swap_top();
            }
        }
        other => return Err(ExecutorErrorKind::NoExecutor(other)),
    }
    Ok(())
}

/// Check that the stack can be cut at every one of the given depths
///
/// Returns `true` (after marking the frame wonky) if it can't.
fn splits_values(frame: &mut Frame, opcode: Opcode, depths: &[usize]) -> bool {
    let height = frame.stack().len();
    let needed = depths.iter().copied().max().unwrap_or(0);
    if needed > height {
        frame.mark_wonky(format!(
            "{} needs {} stack slots, found {}",
            opcode, needed, height
        ));
        true
    } else if depths.iter().any(|depth| !frame.is_value_boundary(*depth)) {
        frame.mark_wonky(format!("{} would split a wide value", opcode));
        true
    } else {
        false
    }
}

/// Copy the top `count` slots below the top `depth` slots
///
/// If that would split a wide value, the copies are replaced by [`Value::EmptyStack`] so the
/// stack still grows by `count`.
fn duplicate(frame: &mut Frame, opcode: Opcode, count: usize, depth: usize) {
    let split = if count == depth {
        splits_values(frame, opcode, &[count])
    } else {
        splits_values(frame, opcode, &[count, depth])
    };
    if split {
        for _ in 0..count {
            frame.push(Value::EmptyStack);
        }
    } else {
        frame.insert_copy(count, depth);
    }
}
