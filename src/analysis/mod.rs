//! Symbolic execution of method bodies
//!
//! [`CodeExecutor`] drives the analysis: it runs [`execute`] on every reachable instruction of a
//! [`Code`], merging [`Frame`]s where control flow joins, until nothing changes any more.

mod code_executor;
mod errors;
mod executor;
mod frame;
mod instruction;
mod number;
mod opcode;
mod settings;
mod value;

pub use code_executor::*;
pub use errors::*;
pub use executor::{execute, ExecutionContext};
pub use frame::*;
pub use instruction::{
    Code, Constant, DynamicCallSite, FieldRef, Handle, HandleKind, Instruction, MethodRef,
    Operand, TryCatch,
};
pub use number::*;
pub use opcode::*;
pub use settings::*;
pub use value::*;
