//! Operand kinds and instruction operands.
//!
//! Each instruction has an opcode and a number of operands. The opcode
//! determines the instruction format, and the format determines the number
//! of operands and the kind of each operand.

use super::camel_case;
use super::types::ValueType;
use super::typevar::TypeVar;
use crate::core::{MetaError, MetaResult};
use hashbrown::HashMap;
use std::fmt;
use std::rc::Rc;

/// Data for a named immediate or entity reference kind.
#[derive(Debug)]
pub struct KindData {
    name: String,
    doc: String,
    default_member: String,
    rust_type: String,
}

/// Classifier of an instruction operand.
///
/// `Value` and `VariableArgs` are the two built-in kinds. Immediate and
/// entity reference kinds are declared through an [`OperandKindRegistry`]
/// and compare by identity.
#[derive(Debug, Clone)]
pub enum OperandKind {
    /// An SSA value defined by another instruction.
    Value,
    /// A variable size list of `value` operands.
    VariableArgs,
    /// An immediate whose value is encoded in the instruction itself.
    Immediate(Rc<KindData>),
    /// A reference to another entity in the function.
    EntityRef(Rc<KindData>),
}

impl OperandKind {
    pub fn name(&self) -> &str {
        match self {
            OperandKind::Value => "value",
            OperandKind::VariableArgs => "variable_args",
            OperandKind::Immediate(data) | OperandKind::EntityRef(data) => &data.name,
        }
    }

    pub fn doc(&self) -> &str {
        match self {
            OperandKind::Value => "An SSA value defined by another instruction.",
            OperandKind::VariableArgs => "A variable size list of `value` operands.",
            OperandKind::Immediate(data) | OperandKind::EntityRef(data) => &data.doc,
        }
    }

    /// Default member name of this kind in the instruction data structure.
    pub fn default_member(&self) -> Option<&str> {
        match self {
            OperandKind::Value => None,
            OperandKind::VariableArgs => Some("varargs"),
            OperandKind::Immediate(data) | OperandKind::EntityRef(data) => {
                Some(&data.default_member)
            }
        }
    }

    /// Rust type used to represent operands of this kind.
    pub fn rust_type(&self) -> String {
        match self {
            OperandKind::Immediate(data) | OperandKind::EntityRef(data) => data.rust_type.clone(),
            _ => camel_case(self.name()),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, OperandKind::Value)
    }

    pub fn is_variable_args(&self) -> bool {
        matches!(self, OperandKind::VariableArgs)
    }
}

impl PartialEq for OperandKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OperandKind::Value, OperandKind::Value) => true,
            (OperandKind::VariableArgs, OperandKind::VariableArgs) => true,
            (OperandKind::Immediate(a), OperandKind::Immediate(b)) => Rc::ptr_eq(a, b),
            (OperandKind::EntityRef(a), OperandKind::EntityRef(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for OperandKind {}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry of named operand kinds. Names are unique, which lets formats key
/// their signatures on kind names.
#[derive(Debug)]
pub struct OperandKindRegistry {
    by_name: HashMap<String, OperandKind>,
}

impl Default for OperandKindRegistry {
    fn default() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("value".to_string(), OperandKind::Value);
        by_name.insert("variable_args".to_string(), OperandKind::VariableArgs);
        Self { by_name }
    }
}

impl OperandKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an immediate kind. The default member is `imm` unless given.
    pub fn immediate(
        &mut self,
        name: &str,
        doc: &str,
        member: Option<&str>,
    ) -> MetaResult<OperandKind> {
        let data = self.kind_data(name, doc, member.unwrap_or("imm"))?;
        self.insert(OperandKind::Immediate(data))
    }

    /// Declare an entity reference kind. The default member is the kind name
    /// unless given.
    pub fn entity_ref(
        &mut self,
        name: &str,
        doc: &str,
        member: Option<&str>,
    ) -> MetaResult<OperandKind> {
        let data = self.kind_data(name, doc, member.unwrap_or(name))?;
        self.insert(OperandKind::EntityRef(data))
    }

    fn kind_data(&self, name: &str, doc: &str, member: &str) -> MetaResult<Rc<KindData>> {
        if self.by_name.contains_key(name) {
            return Err(MetaError::DuplicateKindName {
                name: name.to_string(),
            });
        }
        Ok(Rc::new(KindData {
            name: name.to_string(),
            doc: doc.to_string(),
            default_member: member.to_string(),
            rust_type: camel_case(name),
        }))
    }

    fn insert(&mut self, kind: OperandKind) -> MetaResult<OperandKind> {
        log::debug!("operand kind {}", kind);
        self.by_name.insert(kind.name().to_string(), kind.clone());
        Ok(kind)
    }

    pub fn by_name(&self, name: &str) -> Option<&OperandKind> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Declared type of an operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandType {
    /// An SSA value with a concrete type.
    Concrete(ValueType),
    /// An SSA value whose type is given by a type variable.
    TypeVar(TypeVar),
    /// A non-value operand kind, or `variable_args`.
    Kind(OperandKind),
}

impl OperandType {
    /// The free type variable controlling this operand's type, if any.
    pub fn free_typevar(&self) -> Option<TypeVar> {
        match self {
            OperandType::TypeVar(tv) => Some(tv.free_typevar()),
            _ => None,
        }
    }

    /// Is this type exactly a free type variable (not derived from one)?
    pub fn is_free_typevar(&self) -> bool {
        matches!(self, OperandType::TypeVar(tv) if tv.is_free())
    }

    pub fn as_typevar(&self) -> Option<&TypeVar> {
        match self {
            OperandType::TypeVar(tv) => Some(tv),
            _ => None,
        }
    }

    /// Kind of an operand declared with this type.
    pub fn kind(&self) -> OperandKind {
        match self {
            OperandType::Concrete(_) | OperandType::TypeVar(_) => OperandKind::Value,
            OperandType::Kind(kind) => kind.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OperandType::Concrete(ty) => ty.name(),
            OperandType::TypeVar(tv) => tv.name(),
            OperandType::Kind(kind) => kind.name(),
        }
    }

    pub fn doc(&self) -> &str {
        match self {
            OperandType::Concrete(ty) => ty.doc(),
            OperandType::TypeVar(tv) => tv.doc(),
            OperandType::Kind(kind) => kind.doc(),
        }
    }
}

impl From<ValueType> for OperandType {
    fn from(ty: ValueType) -> Self {
        OperandType::Concrete(ty)
    }
}

impl From<TypeVar> for OperandType {
    fn from(tv: TypeVar) -> Self {
        OperandType::TypeVar(tv)
    }
}

impl From<OperandKind> for OperandType {
    fn from(kind: OperandKind) -> Self {
        OperandType::Kind(kind)
    }
}

impl From<&ValueType> for OperandType {
    fn from(ty: &ValueType) -> Self {
        OperandType::Concrete(ty.clone())
    }
}

impl From<&TypeVar> for OperandType {
    fn from(tv: &TypeVar) -> Self {
        OperandType::TypeVar(tv.clone())
    }
}

impl From<&OperandKind> for OperandType {
    fn from(kind: &OperandKind) -> Self {
        OperandType::Kind(kind.clone())
    }
}

/// An instruction operand: an SSA value, an immediate or an entity reference.
#[derive(Debug, Clone)]
pub struct Operand {
    name: String,
    typ: OperandType,
    kind: OperandKind,
    doc: String,
}

impl Operand {
    pub fn new(name: &str, typ: impl Into<OperandType>) -> Self {
        let typ = typ.into();
        Self {
            name: name.to_string(),
            kind: typ.kind(),
            typ,
            doc: String::new(),
        }
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> &OperandType {
        &self.typ
    }

    pub fn kind(&self) -> &OperandKind {
        &self.kind
    }

    /// Operand doc, falling back to the doc of its type.
    pub fn doc(&self) -> &str {
        if self.doc.is_empty() {
            self.typ.doc()
        } else {
            &self.doc
        }
    }

    /// Is this an SSA value operand?
    pub fn is_value(&self) -> bool {
        self.kind.is_value()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.name)
    }
}
