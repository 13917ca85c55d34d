use super::{BinaryName, ClassAccessFlags};
use elsa::map::FrozenMap;
use elsa::FrozenVec;
use typed_arena::Arena;

mod assignable;
mod java_classes;

pub use assignable::*;
pub use java_classes::*;

pub struct ClassGraphArenas<'g> {
    class_arena: Arena<ClassData<'g>>,
}

impl<'g> ClassGraphArenas<'g> {
    pub fn new() -> Self {
        ClassGraphArenas {
            class_arena: Arena::new(),
        }
    }
}

impl<'g> Default for ClassGraphArenas<'g> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the relationships between classes and interfaces
///
/// Frames reaching the same instruction from different paths can hold different reference types
/// in the same slot. Merging them requires knowing the types' common super type, which is what
/// the graph is queried for (see [`TypeHierarchy`]). Classes the graph doesn't know about are
/// treated as direct subclasses of `java/lang/Object`.
pub struct ClassGraph<'g> {
    arenas: &'g ClassGraphArenas<'g>,
    classes: FrozenMap<&'g BinaryName, &'g ClassData<'g>>,
}

impl<'g> ClassGraph<'g> {
    /// New empty graph
    pub fn new(arenas: &'g ClassGraphArenas<'g>) -> Self {
        ClassGraph {
            arenas,
            classes: FrozenMap::new(),
        }
    }

    pub fn lookup_class(&self, name: &BinaryName) -> Option<&ClassData<'g>> {
        self.classes.get(name)
    }

    /// Add a new class to the class graph
    pub fn add_class(&self, data: ClassData<'g>) -> &'g ClassData<'g> {
        let data = &*self.arenas.class_arena.alloc(data);
        self.classes.insert(&data.name, data);
        data
    }

    /// Add a new class along with the interfaces it directly implements
    pub fn add_class_implementing(
        &self,
        data: ClassData<'g>,
        interfaces: &[&'g ClassData<'g>],
    ) -> &'g ClassData<'g> {
        let data = self.add_class(data);
        for &interface in interfaces {
            data.interfaces.push(interface);
        }
        data
    }

    /// Add standard types to the class graph
    pub fn insert_java_library_types(&self) -> JavaClasses<'g> {
        JavaClasses::add_to_graph(self)
    }
}

pub struct ClassData<'g> {
    /// Name of the class
    pub name: BinaryName,

    /// Superclass is only ever missing for `java/lang/Object` itself
    pub superclass: Option<&'g ClassData<'g>>,

    /// Interfaces implemented (or super-interfaces)
    pub interfaces: FrozenVec<&'g ClassData<'g>>,

    /// Access flags (only `INTERFACE` is consulted)
    pub access_flags: ClassAccessFlags,
}

impl<'g> ClassData<'g> {
    pub fn new(
        name: BinaryName,
        superclass: &'g ClassData<'g>,
        access_flags: ClassAccessFlags,
    ) -> ClassData<'g> {
        ClassData {
            name,
            superclass: Some(superclass),
            interfaces: FrozenVec::new(),
            access_flags,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }
}

/// Inheritance queries needed when merging and checking reference types
pub trait TypeHierarchy {
    /// Most specific type that both classes are assignable to
    fn common_supertype(&self, type1: &BinaryName, type2: &BinaryName) -> BinaryName;

    /// Is the first class assignable to the second?
    ///
    /// Returns `None` when the hierarchy doesn't know enough to decide.
    fn is_assignable(&self, sub_type: &BinaryName, super_type: &BinaryName) -> Option<bool>;
}

impl<'g> TypeHierarchy for ClassGraph<'g> {
    fn common_supertype(&self, type1: &BinaryName, type2: &BinaryName) -> BinaryName {
        if type1 == type2 {
            return type1.clone();
        }
        match (self.lookup_class(type1), self.lookup_class(type2)) {
            (Some(class1), Some(class2)) => class1.common_supertype(class2),
            _ => BinaryName::OBJECT,
        }
    }

    fn is_assignable(&self, sub_type: &BinaryName, super_type: &BinaryName) -> Option<bool> {
        if sub_type == super_type || super_type == &BinaryName::OBJECT {
            return Some(true);
        }
        let sub_class = self.lookup_class(sub_type)?;
        let super_class = self.lookup_class(super_type)?;
        Some(sub_class.is_assignable(super_class))
    }
}

/// Hierarchy that knows nothing except that every class extends `java/lang/Object`
#[derive(Copy, Clone, Debug, Default)]
pub struct ObjectHierarchy;

impl TypeHierarchy for ObjectHierarchy {
    fn common_supertype(&self, type1: &BinaryName, type2: &BinaryName) -> BinaryName {
        if type1 == type2 {
            type1.clone()
        } else {
            BinaryName::OBJECT
        }
    }

    fn is_assignable(&self, sub_type: &BinaryName, super_type: &BinaryName) -> Option<bool> {
        if sub_type == super_type || super_type == &BinaryName::OBJECT {
            Some(true)
        } else {
            None
        }
    }
}
