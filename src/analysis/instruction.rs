use super::{AnalysisError, Opcode};
use crate::jvm::{
    BaseType, BinaryName, FieldType, MethodDescriptor, Name, ParseDescriptor, RefType,
    RenderDescriptor, UnqualifiedName,
};
use std::collections::HashMap;
use std::fmt;

/// One instruction of a method body
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

/// Payload attached to an opcode
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    None,

    /// `bipush`, `sipush`
    Int(i32),

    /// Local variable loads and stores
    Variable(String),

    /// `iinc`
    Increment { variable: String, amount: i32 },

    /// `new`, `anewarray`, `checkcast`, `instanceof`
    Type(RefType<BinaryName>),

    /// `newarray`
    Primitive(BaseType),

    /// `multianewarray`
    MultiArray {
        array_type: RefType<BinaryName>,
        dimensions: u8,
    },

    /// Field access instructions
    Field(FieldRef),

    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`
    Method(MethodRef),

    /// `invokedynamic`
    InvokeDynamic(DynamicCallSite),

    /// `ldc`
    Constant(Constant),

    /// Branches and `goto`, by label name
    Jump(String),

    TableSwitch {
        min: i32,
        max: i32,
        labels: Vec<String>,
        default: String,
    },

    LookupSwitch {
        keys: Vec<i32>,
        labels: Vec<String>,
        default: String,
    },
}

/// Constants that can be loaded with `ldc`
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Type(RefType<BinaryName>),
    MethodType(MethodDescriptor<BinaryName>),
    Handle(Handle),
}

/// Kinds of method handles
///
/// See <https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-5.html#jvms-5.4.3.5>
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

/// Method handle constant
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    /// Field or method descriptor, depending on the kind
    pub descriptor: String,
    pub is_interface: bool,
}

/// Field referenced by a field access instruction
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FieldRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
}

impl FieldRef {
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Result<FieldRef, AnalysisError> {
        Ok(FieldRef {
            owner: class_name(owner)?,
            name: member_name(name)?,
            descriptor: parse_descriptor(descriptor)?,
        })
    }

    /// Key identifying the field, formatted `owner.name`
    pub fn key(&self) -> String {
        format!("{}.{}", self.owner.as_str(), self.name.as_str())
    }
}

/// Method referenced by an invoke instruction
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub is_interface: bool,
}

impl MethodRef {
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Result<MethodRef, AnalysisError> {
        Ok(MethodRef {
            owner: class_name(owner)?,
            name: member_name(name)?,
            descriptor: parse_descriptor(descriptor)?,
            is_interface: false,
        })
    }

    /// Key identifying the method, formatted `owner.namedescriptor`
    pub fn key(&self) -> String {
        format!(
            "{}.{}{}",
            self.owner.as_str(),
            self.name.as_str(),
            self.descriptor.render()
        )
    }
}

/// Call site of an `invokedynamic`
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicCallSite {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub bootstrap: Handle,
    pub bootstrap_arguments: Vec<Constant>,
}

fn class_name(name: &str) -> Result<BinaryName, AnalysisError> {
    BinaryName::from_str(name).map_err(AnalysisError::MalformedName)
}

fn member_name(name: &str) -> Result<UnqualifiedName, AnalysisError> {
    UnqualifiedName::from_str(name).map_err(AnalysisError::MalformedName)
}

pub(crate) fn parse_descriptor<T: ParseDescriptor>(descriptor: &str) -> Result<T, AnalysisError> {
    T::parse(descriptor).map_err(|source| AnalysisError::MalformedDescriptor {
        descriptor: descriptor.to_owned(),
        source,
    })
}

impl Instruction {
    /// Instruction without an operand
    pub const fn new(opcode: Opcode) -> Instruction {
        Instruction {
            opcode,
            operand: Operand::None,
        }
    }

    pub const fn with_operand(opcode: Opcode, operand: Operand) -> Instruction {
        Instruction { opcode, operand }
    }

    /// `bipush` or `sipush`
    pub const fn int(opcode: Opcode, value: i32) -> Instruction {
        Instruction::with_operand(opcode, Operand::Int(value))
    }

    /// Local variable load or store
    pub fn variable(opcode: Opcode, name: &str) -> Instruction {
        Instruction::with_operand(opcode, Operand::Variable(name.to_owned()))
    }

    pub fn iinc(name: &str, amount: i32) -> Instruction {
        Instruction::with_operand(
            Opcode::IInc,
            Operand::Increment {
                variable: name.to_owned(),
                amount,
            },
        )
    }

    pub fn ldc(constant: Constant) -> Instruction {
        Instruction::with_operand(Opcode::Ldc, Operand::Constant(constant))
    }

    /// Branch or `goto`
    pub fn jump(opcode: Opcode, label: &str) -> Instruction {
        Instruction::with_operand(opcode, Operand::Jump(label.to_owned()))
    }

    /// Type instruction (`new`, `anewarray`, `checkcast`, `instanceof`), with the type written as
    /// an internal name (`java/lang/String`) or, for arrays, as a descriptor (`[I`)
    pub fn type_insn(opcode: Opcode, typ: &str) -> Result<Instruction, AnalysisError> {
        let ref_type = if typ.starts_with('[') {
            parse_descriptor(typ)?
        } else {
            RefType::Object(class_name(typ)?)
        };
        Ok(Instruction::with_operand(opcode, Operand::Type(ref_type)))
    }

    pub fn new_array(element_type: BaseType) -> Instruction {
        Instruction::with_operand(Opcode::NewArray, Operand::Primitive(element_type))
    }

    pub fn multi_new_array(descriptor: &str, dimensions: u8) -> Result<Instruction, AnalysisError> {
        Ok(Instruction::with_operand(
            Opcode::MultiANewArray,
            Operand::MultiArray {
                array_type: parse_descriptor(descriptor)?,
                dimensions,
            },
        ))
    }

    pub fn field(
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<Instruction, AnalysisError> {
        let field = FieldRef::new(owner, name, descriptor)?;
        Ok(Instruction::with_operand(opcode, Operand::Field(field)))
    }

    pub fn method(
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<Instruction, AnalysisError> {
        let mut method = MethodRef::new(owner, name, descriptor)?;
        method.is_interface = opcode == Opcode::InvokeInterface;
        Ok(Instruction::with_operand(opcode, Operand::Method(method)))
    }

    pub fn table_switch(min: i32, max: i32, labels: &[&str], default: &str) -> Instruction {
        Instruction::with_operand(
            Opcode::TableSwitch,
            Operand::TableSwitch {
                min,
                max,
                labels: labels.iter().map(|label| label.to_string()).collect(),
                default: default.to_owned(),
            },
        )
    }

    pub fn lookup_switch(cases: &[(i32, &str)], default: &str) -> Instruction {
        Instruction::with_operand(
            Opcode::LookupSwitch,
            Operand::LookupSwitch {
                keys: cases.iter().map(|(key, _)| *key).collect(),
                labels: cases.iter().map(|(_, label)| label.to_string()).collect(),
                default: default.to_owned(),
            },
        )
    }

    /// Labels this instruction may transfer control to, besides falling through
    pub fn branch_targets(&self) -> Vec<&str> {
        match &self.operand {
            Operand::Jump(label) => vec![label.as_str()],
            Operand::TableSwitch {
                labels, default, ..
            }
            | Operand::LookupSwitch {
                labels, default, ..
            } => {
                let mut targets: Vec<&str> = vec![default.as_str()];
                for label in labels {
                    if !targets.contains(&label.as_str()) {
                        targets.push(label.as_str());
                    }
                }
                targets
            }
            _ => vec![],
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Int(value) => write!(f, " {}", value),
            Operand::Variable(name) => write!(f, " {}", name),
            Operand::Increment { variable, amount } => write!(f, " {} {}", variable, amount),
            Operand::Type(RefType::Object(name)) => write!(f, " {}", name),
            Operand::Type(typ) => write!(f, " {}", typ),
            Operand::Primitive(typ) => write!(f, " {}", typ.keyword()),
            Operand::MultiArray {
                array_type,
                dimensions,
            } => write!(f, " {} {}", array_type, dimensions),
            Operand::Field(field) => write!(f, " {} {}", field.key(), field.descriptor),
            Operand::Method(method) => write!(f, " {}", method.key()),
            Operand::InvokeDynamic(call_site) => {
                write!(f, " {} {}", call_site.name, call_site.descriptor)
            }
            Operand::Constant(constant) => match constant {
                Constant::Int(value) => write!(f, " {}", value),
                Constant::Long(value) => write!(f, " {}L", value),
                Constant::Float(value) => write!(f, " {:?}F", value),
                Constant::Double(value) => write!(f, " {:?}D", value),
                Constant::String(text) => write!(f, " {:?}", text),
                Constant::Type(typ) => write!(f, " {}", typ),
                Constant::MethodType(descriptor) => write!(f, " {}", descriptor),
                Constant::Handle(handle) => write!(
                    f,
                    " handle {:?} {}.{}{}",
                    handle.kind, handle.owner, handle.name, handle.descriptor
                ),
            },
            Operand::Jump(label) => write!(f, " {}", label),
            Operand::TableSwitch {
                min,
                max,
                labels,
                default,
            } => write!(
                f,
                " range({}:{}) offsets({}) default({})",
                min,
                max,
                labels.join(", "),
                default
            ),
            Operand::LookupSwitch {
                keys,
                labels,
                default,
            } => {
                f.write_str(" mapping(")?;
                for (i, (key, label)) in keys.iter().zip(labels).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, label)?;
                }
                write!(f, ") default({})", default)
            }
        }
    }
}

/// Protected range of a method body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TryCatch {
    /// Label of the first protected instruction
    pub start: String,

    /// Label just past the last protected instruction
    pub end: String,

    /// Label of the handler's first instruction
    pub handler: String,

    /// Type caught, or `None` for a catch-all (`finally`) handler
    pub exception_type: Option<BinaryName>,
}

/// Method body to analyze
#[derive(Clone, Debug, Default)]
pub struct Code {
    pub instructions: Vec<Instruction>,

    /// Label names, mapped to the index of the instruction they precede
    ///
    /// A label may point one past the last instruction (eg. the end of a try-catch range).
    pub labels: HashMap<String, usize>,

    pub try_catches: Vec<TryCatch>,
}

impl Code {
    pub fn new() -> Code {
        Code::default()
    }

    /// Append an instruction, returning its address
    pub fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    /// Place a label before the next instruction to be pushed
    pub fn label(&mut self, name: &str) {
        self.labels.insert(name.to_owned(), self.instructions.len());
    }

    pub fn add_try_catch(
        &mut self,
        start: &str,
        end: &str,
        handler: &str,
        exception_type: Option<&str>,
    ) -> Result<(), AnalysisError> {
        let exception_type = match exception_type {
            None => None,
            Some(name) => Some(class_name(name)?),
        };
        self.try_catches.push(TryCatch {
            start: start.to_owned(),
            end: end.to_owned(),
            handler: handler.to_owned(),
            exception_type,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn resolve_label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }
}

impl FromIterator<Instruction> for Code {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Code {
        Code {
            instructions: iter.into_iter().collect(),
            ..Code::default()
        }
    }
}
