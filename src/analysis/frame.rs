use super::instruction::parse_descriptor;
use super::{AnalysisError, ArrayBacking, Value};
use crate::jvm::class_graph::TypeHierarchy;
use crate::jvm::{BinaryName, FieldType, MethodAccessFlags, MethodDescriptor, Name, UnqualifiedName};
use std::collections::BTreeMap;
use std::fmt;

/// Snapshot of the operand stack and local variables at a program point
///
/// Frames never fail on bad input. Popping an empty stack or tripping over half of a `long`
/// marks the frame as wonky, records why, and hands back [`Value::EmptyStack`] so that the
/// instruction can still finish.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Values on the stack (top is last)
    stack: Vec<Value>,

    /// Local variables, by name
    locals: BTreeMap<String, Value>,

    wonky: bool,

    /// Why the frame is wonky, in the order problems were found
    diagnostics: Vec<String>,
}

impl Frame {
    /// Frame with an empty stack and no locals
    pub fn new() -> Frame {
        Frame::default()
    }

    /// Frame with an empty stack and the given locals
    pub fn with_locals<S: Into<String>>(locals: impl IntoIterator<Item = (S, Value)>) -> Frame {
        Frame {
            locals: locals
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
            ..Frame::default()
        }
    }

    /// Initial frame for the body of a method
    ///
    /// Instance methods get a `this` local, then every parameter is bound to an unknown value of
    /// its declared type.
    pub fn for_method(method: &MethodSignature) -> Frame {
        let mut frame = Frame::new();
        if !method.is_static() {
            frame.set_local(
                UnqualifiedName::THIS.as_str(),
                Value::Object(method.owner.clone()),
            );
        }
        for (name, typ) in &method.parameters {
            frame.set_local(name, Value::of_type(typ));
        }
        frame
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn locals(&self) -> &BTreeMap<String, Value> {
        &self.locals
    }

    pub fn is_wonky(&self) -> bool {
        self.wonky
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Push a single slot
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Push a value, along with its reserved second slot if it is a `long` or `double`
    pub fn push_value(&mut self, value: Value) {
        let is_wide = value.is_wide_numeric();
        self.stack.push(value);
        if is_wide {
            self.stack.push(Value::WideReserved);
        }
    }

    /// Pop a single slot
    pub fn pop(&mut self) -> Value {
        match self.stack.pop() {
            Some(value) => value,
            None => {
                self.mark_wonky("stack underflow");
                Value::EmptyStack
            }
        }
    }

    /// Pop a `long` or `double` (two slots)
    ///
    /// If the top slot isn't the reserved half of a wide value, both slots are still consumed
    /// but the frame is marked wonky and [`Value::EmptyStack`] is returned.
    pub fn pop_wide(&mut self) -> Value {
        let top = self.pop();
        let value = self.pop();
        if top.is_wide_reserved() {
            value
        } else {
            if !top.is_empty_stack() {
                self.mark_wonky(format!("expected a wide value on the stack, found {}", top));
            }
            Value::EmptyStack
        }
    }

    /// Slot at the given depth from the top (`0` is the top)
    pub fn peek(&self, depth: usize) -> Option<&Value> {
        let len = self.stack.len();
        if depth < len {
            self.stack.get(len - depth - 1)
        } else {
            None
        }
    }

    /// Can the stack be cut after the top `depth` slots without splitting a wide value?
    ///
    /// Also false when the stack has fewer than `depth` slots.
    pub fn is_value_boundary(&self, depth: usize) -> bool {
        let len = self.stack.len();
        depth == 0 || (depth <= len && !self.stack[len - depth].is_wide_reserved())
    }

    /// Copy the top `count` slots and insert them below the top `depth` slots
    ///
    /// Callers check that the stack has at least `depth` slots.
    pub(crate) fn insert_copy(&mut self, count: usize, depth: usize) {
        let len = self.stack.len();
        if count > depth || depth > len {
            return;
        }
        let copied: Vec<Value> = self.stack[len - count..].to_vec();
        let at = len - depth;
        self.stack.splice(at..at, copied);
    }

    /// Swap the top two slots
    pub(crate) fn swap_top(&mut self) {
        let len = self.stack.len();
        if len >= 2 {
            self.stack.swap(len - 1, len - 2);
        }
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn set_local(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_owned(), value);
    }

    /// Flag the frame as having seen something inconsistent
    ///
    /// The same message is only recorded once.
    pub fn mark_wonky(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("wonky frame: {}", message);
        self.wonky = true;
        if !self.diagnostics.contains(&message) {
            self.diagnostics.push(message);
        }
    }

    pub(crate) fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    /// Overwrite the contents of every copy of an array in the frame
    pub(crate) fn update_array(&mut self, backing: &ArrayBacking) {
        let updated = self.stack.iter_mut().chain(self.locals.values_mut());
        for value in updated {
            if let Value::Array(array) = value {
                match &mut array.backing {
                    Some(existing) if existing.site == backing.site => {
                        existing.elements = backing.elements.clone();
                    }
                    _ => (),
                }
            }
        }
    }

    /// Merge in a frame from another path reaching the same program point
    ///
    /// Returns whether this frame changed. Stack heights that disagree keep this frame's height
    /// (slots are matched from the bottom) and mark the frame wonky, as does a stack slot whose
    /// values have nothing in common. Locals are merged as a union.
    pub fn merge(&mut self, other: &Frame, hierarchy: &dyn TypeHierarchy) -> bool {
        let mut changed = false;
        let was_wonky = self.wonky;

        if self.stack.len() != other.stack.len() {
            self.mark_wonky(format!(
                "stack heights differ at merge point ({} and {})",
                self.stack.len(),
                other.stack.len()
            ));
        }
        let mut conflicts = vec![];
        for (slot, (value, other_value)) in self.stack.iter_mut().zip(&other.stack).enumerate() {
            let merged = value.join(other_value, hierarchy);
            if merged.is_empty_stack() && !value.is_empty_stack() {
                conflicts.push(format!(
                    "cannot merge {} and {} in stack slot {}",
                    value, other_value, slot
                ));
            }
            if merged != *value {
                *value = merged;
                changed = true;
            }
        }
        for conflict in conflicts {
            self.mark_wonky(conflict);
        }

        for (name, other_value) in &other.locals {
            match self.locals.get_mut(name) {
                Some(value) => {
                    let merged = value.join(other_value, hierarchy);
                    if merged != *value {
                        *value = merged;
                        changed = true;
                    }
                }
                None => {
                    self.locals.insert(name.clone(), other_value.clone());
                    changed = true;
                }
            }
        }

        if other.wonky {
            self.wonky = true;
        }
        changed || (self.wonky && !was_wonky)
    }

    /// Merge two frames into a new one
    pub fn merged(&self, other: &Frame, hierarchy: &dyn TypeHierarchy) -> Frame {
        let mut frame = self.clone();
        frame.merge(other, hierarchy);
        frame
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("] {")?;
        for (i, (name, value)) in self.locals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("}")?;
        if self.wonky {
            f.write_str(" (wonky)")?;
        }
        Ok(())
    }
}

/// Method whose body is being analyzed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    /// Class declaring the method
    pub owner: BinaryName,

    pub name: UnqualifiedName,

    pub access_flags: MethodAccessFlags,

    /// Parameter names and types, in declaration order
    pub parameters: Vec<(String, FieldType<BinaryName>)>,

    /// `None` is for `void`
    pub return_type: Option<FieldType<BinaryName>>,
}

impl MethodSignature {
    /// Parse a signature from its descriptor
    ///
    /// Parameters are named `p0`, `p1`, ... until renamed with [`Self::with_parameter_names`].
    pub fn new(
        owner: &str,
        name: &str,
        descriptor: &str,
        access_flags: MethodAccessFlags,
    ) -> Result<MethodSignature, AnalysisError> {
        let descriptor: MethodDescriptor<BinaryName> = parse_descriptor(descriptor)?;
        Ok(MethodSignature {
            owner: BinaryName::from_str(owner).map_err(AnalysisError::MalformedName)?,
            name: UnqualifiedName::from_str(name).map_err(AnalysisError::MalformedName)?,
            access_flags,
            parameters: descriptor
                .parameters
                .into_iter()
                .enumerate()
                .map(|(i, typ)| (format!("p{}", i), typ))
                .collect(),
            return_type: descriptor.return_type,
        })
    }

    /// Rename parameters, in order (extra names are ignored)
    pub fn with_parameter_names(mut self, names: &[&str]) -> MethodSignature {
        for ((name, _), new_name) in self.parameters.iter_mut().zip(names) {
            *name = new_name.to_string();
        }
        self
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }
}
