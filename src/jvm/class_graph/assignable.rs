use super::ClassData;
use crate::jvm::BinaryName;
use std::collections::{HashSet, VecDeque};

/// Subtyping relationship between types
pub trait Assignable {
    /// Is the first type assignable to the second?
    fn is_assignable(&self, super_type: &Self) -> bool;
}

/// This does a traversal of super types in the class graph to determine assignability
impl<'g> Assignable for ClassData<'g> {
    fn is_assignable(&self, super_type: &ClassData<'g>) -> bool {
        let mut supertypes_to_visit: Vec<&ClassData<'g>> = vec![self];
        let mut dont_revisit: HashSet<&BinaryName> = HashSet::new();
        dont_revisit.insert(&self.name);

        // Optimization: if the super type is a class, then skip visiting interfaces
        let super_is_class: bool = !super_type.is_interface();

        while let Some(class_data) = supertypes_to_visit.pop() {
            if class_data.name == super_type.name {
                return true;
            }

            // Enqueue next types to visit
            if let Some(superclass) = class_data.superclass {
                if dont_revisit.insert(&superclass.name) {
                    supertypes_to_visit.push(superclass);
                }
            }
            if !super_is_class {
                for interface in &class_data.interfaces {
                    if dont_revisit.insert(&interface.name) {
                        supertypes_to_visit.push(interface);
                    }
                }
            }
        }

        false
    }
}

impl<'g> ClassData<'g> {
    /// Most specific type that both this class and `other` are assignable to
    ///
    /// If neither is a subtype of the other, the super types of `self` are searched breadth
    /// first (superclass before interfaces) for the first one that `other` is also assignable
    /// to. `java/lang/Object` is only returned when nothing more specific exists.
    pub fn common_supertype(&self, other: &ClassData<'g>) -> BinaryName {
        if other.is_assignable(self) {
            return self.name.clone();
        }
        if self.is_assignable(other) {
            return other.name.clone();
        }

        let mut supertypes_to_visit: VecDeque<&ClassData<'g>> = VecDeque::new();
        let mut dont_revisit: HashSet<&BinaryName> = HashSet::new();
        supertypes_to_visit.push_back(self);
        dont_revisit.insert(&self.name);

        while let Some(class_data) = supertypes_to_visit.pop_front() {
            if class_data.name != BinaryName::OBJECT && other.is_assignable(class_data) {
                return class_data.name.clone();
            }
            if let Some(superclass) = class_data.superclass {
                if dont_revisit.insert(&superclass.name) {
                    supertypes_to_visit.push_back(superclass);
                }
            }
            for interface in &class_data.interfaces {
                if dont_revisit.insert(&interface.name) {
                    supertypes_to_visit.push_back(interface);
                }
            }
        }

        BinaryName::OBJECT
    }
}
