//! Abstract interpretation of JVM bytecode
//!
//! Given a method body (see [`analysis::Code`]) and the bindings of its parameters, the analyzer
//! symbolically executes every reachable instruction and records, for each program point, what
//! the operand stack and local variables hold. Instead of concrete runtime values, the frames
//! contain abstract [`analysis::Value`]s: constants where they can be computed ahead of time,
//! otherwise just the type.
//!
//! Malformed input never aborts the analysis. An instruction that finds something unexpected
//! (a wrong type on the stack, an uninitialized local, half of a `long` being duplicated) marks
//! its frame as _wonky_, records a diagnostic, and carries on with a best-effort value so that
//! the following instructions still see a stack of the right height.

pub mod analysis;
pub mod jvm;
pub mod lookup;
mod util;
