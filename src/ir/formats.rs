//! Instruction formats.
//!
//! Every instruction opcode has a corresponding instruction format which
//! determines the number of operands and their kinds. Formats are identified
//! structurally: the format of an instruction is derived from the kinds of
//! the operands used in its declaration, and no two formats may share the
//! same `(multiple_results, kinds)` signature.
//!
//! Most formats produce a single result, or no result at all. A format whose
//! instructions can produce more than one result sets `multiple_results`;
//! the format does not track how many.

use super::operands::{Operand, OperandKind};
use crate::core::{MetaError, MetaResult};
use hashbrown::HashMap;
use std::fmt;
use std::rc::Rc;

/// Registry key: `(multiple_results, kind names...)`.
type FormatSignature = (bool, Vec<String>);

#[derive(Debug)]
pub struct InstructionFormat {
    name: String,
    kinds: Vec<OperandKind>,
    members: Vec<Option<String>>,
    multiple_results: bool,
    boxed_storage: bool,
    value_operands: Vec<usize>,
    typevar_operand: Option<usize>,
    member_index: HashMap<String, usize>,
}

impl InstructionFormat {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kinds(&self) -> &[OperandKind] {
        &self.kinds
    }

    /// Member name of each operand in the instruction data structure.
    pub fn members(&self) -> &[Option<String>] {
        &self.members
    }

    pub fn multiple_results(&self) -> bool {
        self.multiple_results
    }

    /// Does the instruction data need a pointer to out-of-line storage?
    pub fn boxed_storage(&self) -> bool {
        self.boxed_storage
    }

    /// Positions of the `value` operands.
    pub fn value_operands(&self) -> &[usize] {
        &self.value_operands
    }

    /// Input used to infer the controlling type variable.
    pub fn typevar_operand(&self) -> Option<usize> {
        self.typevar_operand
    }

    /// Look up a named member of this format.
    pub fn field(self: &Rc<Self>, name: &str) -> MetaResult<FormatField> {
        match self.member_index.get(name) {
            Some(&operand) => Ok(FormatField {
                format: self.clone(),
                operand,
                name: name.to_string(),
            }),
            None => Err(MetaError::UnknownFormatField {
                format: self.name.clone(),
                field: name.to_string(),
            }),
        }
    }

    fn signature(&self) -> FormatSignature {
        (
            self.multiple_results,
            self.kinds.iter().map(|k| k.name().to_string()).collect(),
        )
    }
}

impl fmt::Display for InstructionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (member, kind)) in self.members.iter().zip(&self.kinds).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match member {
                Some(member) => write!(f, "{}: {}", member, kind)?,
                None => write!(f, "{}", kind)?,
            }
        }
        f.write_str(")")
    }
}

/// A single member of an instruction format.
#[derive(Debug, Clone)]
pub struct FormatField {
    format: Rc<InstructionFormat>,
    operand: usize,
    name: String,
}

impl FormatField {
    pub fn format(&self) -> &Rc<InstructionFormat> {
        &self.format
    }

    /// Operand number in the parent format.
    pub fn operand(&self) -> usize {
        self.operand
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access path of this member in the instruction data structure.
    pub fn rust_name(&self) -> String {
        if self.format.boxed_storage {
            format!("data.{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl PartialEq for FormatField {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.format, &other.format) && self.operand == other.operand
    }
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.format.name, self.name)
    }
}

/// Builder collecting the operand kinds and flags of a new format.
pub struct FormatBuilder {
    name: String,
    operands: Vec<(Option<String>, OperandKind)>,
    multiple_results: bool,
    boxed_storage: bool,
    typevar_operand: Option<usize>,
}

impl FormatBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            operands: Vec::new(),
            multiple_results: false,
            boxed_storage: false,
            typevar_operand: None,
        }
    }

    /// Add an operand stored under the kind's default member name.
    pub fn kind(mut self, kind: &OperandKind) -> Self {
        let member = kind.default_member().map(str::to_string);
        self.operands.push((member, kind.clone()));
        self
    }

    /// Add `count` value operands.
    pub fn value(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.operands.push((None, OperandKind::Value));
        }
        self
    }

    /// Add an operand stored under an explicit member name.
    pub fn member(mut self, member: &str, kind: &OperandKind) -> Self {
        self.operands.push((Some(member.to_string()), kind.clone()));
        self
    }

    pub fn multiple_results(mut self) -> Self {
        self.multiple_results = true;
        self
    }

    pub fn boxed_storage(mut self) -> Self {
        self.boxed_storage = true;
        self
    }

    pub fn typevar_operand(mut self, index: usize) -> Self {
        self.typevar_operand = Some(index);
        self
    }

    fn build(self) -> MetaResult<InstructionFormat> {
        let (members, kinds): (Vec<_>, Vec<_>) = self.operands.into_iter().unzip();

        let value_operands: Vec<usize> = kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_value())
            .map(|(i, _)| i)
            .collect();

        let typevar_operand = match self.typevar_operand {
            Some(index) => {
                if !kinds.get(index).is_some_and(OperandKind::is_value) {
                    return Err(MetaError::InvalidTypevarOperand {
                        format: self.name,
                        index,
                    });
                }
                Some(index)
            }
            None => value_operands.first().copied(),
        };

        let mut member_index = HashMap::new();
        for (i, member) in members.iter().enumerate() {
            if let Some(member) = member {
                member_index.entry(member.clone()).or_insert(i);
            }
        }

        Ok(InstructionFormat {
            name: self.name,
            kinds,
            members,
            multiple_results: self.multiple_results,
            boxed_storage: self.boxed_storage,
            value_operands,
            typevar_operand,
            member_index,
        })
    }
}

/// All instruction formats of a catalog, keyed by structural signature.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    by_signature: HashMap<FormatSignature, Rc<InstructionFormat>>,
    formats: Vec<Rc<InstructionFormat>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a format.
    pub fn insert(&mut self, builder: FormatBuilder) -> MetaResult<Rc<InstructionFormat>> {
        let format = builder.build()?;
        let signature = format.signature();
        if let Some(existing) = self.by_signature.get(&signature) {
            return Err(MetaError::DuplicateFormatSignature {
                format: format.name,
                existing: existing.name.clone(),
            });
        }

        log::debug!("instruction format {}", format);
        let format = Rc::new(format);
        self.by_signature.insert(signature, format.clone());
        self.formats.push(format.clone());
        Ok(format)
    }

    /// Find the format matching the given instruction inputs and outputs.
    pub fn lookup(&self, ins: &[Operand], outs: &[Operand]) -> MetaResult<Rc<InstructionFormat>> {
        let multiple_results = match outs {
            [single] => single.kind().is_variable_args(),
            _ => outs.len() > 1,
        };
        let kinds: Vec<String> = ins.iter().map(|op| op.kind().name().to_string()).collect();

        match self.by_signature.get(&(multiple_results, kinds)) {
            Some(format) => Ok(format.clone()),
            None => {
                let names: Vec<&str> = ins.iter().map(|op| op.kind().name()).collect();
                Err(MetaError::NoMatchingFormat {
                    signature: format!(
                        "ins = ({}){}",
                        names.join(", "),
                        if multiple_results { "[multiple results]" } else { "" }
                    ),
                })
            }
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Rc<InstructionFormat>> {
        self.formats.iter().find(|f| f.name == name)
    }

    /// All formats in declaration order.
    pub fn all_formats(&self) -> &[Rc<InstructionFormat>] {
        &self.formats
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
