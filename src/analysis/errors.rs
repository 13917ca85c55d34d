use super::Opcode;
use crate::jvm::{DescriptorError, InvalidName};
use thiserror::Error;

/// Hard failures of an analysis run
///
/// Problems in the analyzed code itself never surface here: those mark the frame as wonky and
/// the analysis carries on. These errors mean the caller handed over something the analyzer
/// cannot work with at all.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An instruction could not be executed
    #[error("cannot execute `{instruction}` (at {address}): {kind}")]
    Executor {
        address: usize,
        instruction: String,
        kind: ExecutorErrorKind,
    },

    /// Descriptor passed to an instruction constructor did not parse
    #[error("malformed descriptor `{descriptor}`: {source}")]
    MalformedDescriptor {
        descriptor: String,
        source: DescriptorError,
    },

    /// Class or member name passed to an instruction constructor was invalid
    #[error(transparent)]
    MalformedName(InvalidName),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorErrorKind {
    /// The operand attached to the opcode has the wrong shape
    #[error("expected {expected} operand")]
    UnexpectedOperand { expected: &'static str },

    /// The executor was handed an opcode outside of its family
    #[error("no executor for `{0}`")]
    NoExecutor(Opcode),

    /// Opcodes with no counterpart in modern class files (`jsr`, `ret`)
    #[error("unsupported instruction")]
    Unsupported,
}
