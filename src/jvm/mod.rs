//! Vocabulary of the JVM: names, descriptors, access flags, and the class hierarchy

mod access_flags;
pub mod class_graph;
mod descriptors;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use names::*;
