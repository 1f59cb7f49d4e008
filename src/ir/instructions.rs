//! Instruction definitions and type variable polymorphism.
//!
//! An instruction is declared with input and output [`Operand`]s. Its
//! [`InstructionFormat`] is found structurally from the input kinds, and if
//! any value operand is typed by a type variable the instruction is
//! polymorphic: one *controlling* type variable determines its concrete
//! instantiation, and other free type variables may appear on inputs, each
//! at most once.
//!
//! # Example
//!
//! ```ignore
//! let iadd = catalog.define_instruction(
//!     &mut group,
//!     InstructionBuilder::new("iadd", "Wrapping integer addition.")
//!         .operands_in(vec![Operand::new("x", &int), Operand::new("y", &int)])
//!         .operands_out(Operand::new("a", &int)),
//! )?;
//! let iadd_i32 = iadd.bind(i32)?;
//! ```

use super::camel_case;
use super::formats::{FormatRegistry, InstructionFormat};
use super::operands::{Operand, OperandType};
use super::types::{TypeRegistry, ValueType};
use super::typevar::TypeVar;
use crate::core::{MetaError, MetaResult};
use crate::xform::{Apply, Expr};
use std::fmt;
use std::rc::Rc;

/// Operand list shorthand: a single operand or a sequence of them.
pub trait IntoOperands {
    fn into_operands(self) -> Vec<Operand>;
}

impl IntoOperands for Operand {
    fn into_operands(self) -> Vec<Operand> {
        vec![self]
    }
}

impl IntoOperands for Vec<Operand> {
    fn into_operands(self) -> Vec<Operand> {
        self
    }
}

impl<const N: usize> IntoOperands for [Operand; N] {
    fn into_operands(self) -> Vec<Operand> {
        self.into()
    }
}

impl IntoOperands for &[Operand] {
    fn into_operands(self) -> Vec<Operand> {
        self.to_vec()
    }
}

/// Declaration of a new instruction, consumed by
/// [`Catalog::define_instruction`](crate::core::Catalog::define_instruction).
pub struct InstructionBuilder {
    name: String,
    doc: String,
    ins: Vec<Operand>,
    outs: Vec<Operand>,
    is_terminator: bool,
    is_branch: bool,
}

impl InstructionBuilder {
    pub fn new(name: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: doc.to_string(),
            ins: Vec::new(),
            outs: Vec::new(),
            is_terminator: false,
            is_branch: false,
        }
    }

    pub fn operands_in(mut self, ins: impl IntoOperands) -> Self {
        self.ins = ins.into_operands();
        self
    }

    pub fn operands_out(mut self, outs: impl IntoOperands) -> Self {
        self.outs = outs.into_operands();
        self
    }

    pub fn is_terminator(mut self, val: bool) -> Self {
        self.is_terminator = val;
        self
    }

    pub fn is_branch(mut self, val: bool) -> Self {
        self.is_branch = val;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the format and verify the use of type variables.
    pub(crate) fn build(self, formats: &FormatRegistry) -> MetaResult<Instruction> {
        let format = formats.lookup(&self.ins, &self.outs)?;
        let value_results = self
            .outs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_value())
            .map(|(i, _)| i)
            .collect();
        let polymorphism = verify_polymorphic(&self.name, &format, &self.ins, &self.outs)?;

        match &polymorphism {
            Some(poly) => log::debug!(
                "instruction {} ({}) controlled by {}, {} other typevars",
                self.name,
                format.name(),
                poly.ctrl_typevar,
                poly.other_typevars.len()
            ),
            None => log::debug!("instruction {} ({})", self.name, format.name()),
        }

        Ok(Instruction(Rc::new(InstructionContent {
            camel_name: camel_case(&self.name),
            name: self.name,
            doc: self.doc,
            ins: self.ins,
            outs: self.outs,
            format,
            value_results,
            polymorphism,
            is_terminator: self.is_terminator,
            is_branch: self.is_branch,
        })))
    }
}

/// Type variables of a polymorphic instruction.
#[derive(Debug, Clone)]
pub struct Polymorphism {
    /// The type variable determining the concrete instantiation.
    pub ctrl_typevar: TypeVar,
    /// Free type variables on inputs, in operand order.
    pub other_typevars: Vec<TypeVar>,
    /// Was the controlling type variable inferred from the format's typevar operand?
    pub use_typevar_operand: bool,
}

/// Determine whether an instruction is polymorphic and infer its controlling
/// type variable.
fn verify_polymorphic(
    name: &str,
    format: &InstructionFormat,
    ins: &[Operand],
    outs: &[Operand],
) -> MetaResult<Option<Polymorphism>> {
    let poly_ins = format
        .value_operands()
        .iter()
        .any(|&i| ins[i].typ().free_typevar().is_some());
    let poly_outs = outs.iter().any(|o| o.typ().free_typevar().is_some());
    if !poly_ins && !poly_outs {
        return Ok(None);
    }

    // Prefer the format's typevar operand, but only when it is declared as a
    // free type variable rather than a derived one. If it doesn't work out,
    // the first result gets a chance to control instead.
    let mut typevar_error = None;
    if let Some(index) = format.typevar_operand() {
        if let OperandType::TypeVar(tv) = ins[index].typ() {
            if tv.is_free() {
                match verify_ctrl_typevar(name, format, ins, outs, tv) {
                    Ok(other_typevars) => {
                        return Ok(Some(Polymorphism {
                            ctrl_typevar: tv.clone(),
                            other_typevars,
                            use_typevar_operand: true,
                        }))
                    }
                    Err(e) => {
                        log::trace!("{}: {} can't control: {}", name, tv, e);
                        typevar_error = Some(e);
                    }
                }
            }
        }
    }

    let first = match (outs.first(), typevar_error) {
        (Some(first), _) => first,
        (None, Some(e)) => return Err(e),
        (None, None) => {
            return Err(MetaError::AmbiguousControllingTypevar {
                inst: name.to_string(),
                reason: "typevar_operand must be a free type variable".to_string(),
            })
        }
    };
    match first.typ() {
        OperandType::TypeVar(tv) if tv.is_free() => {
            let other_typevars = verify_ctrl_typevar(name, format, ins, outs, tv)?;
            Ok(Some(Polymorphism {
                ctrl_typevar: tv.clone(),
                other_typevars,
                use_typevar_operand: false,
            }))
        }
        _ => Err(MetaError::AmbiguousControllingTypevar {
            inst: name.to_string(),
            reason: "first result must be a free type variable".to_string(),
        }),
    }
}

/// Verify that all type variables are consistent with `ctrl` as the
/// controlling type variable, and return the other free type variables.
///
/// Polymorphic inputs must be derived from `ctrl` or be independent free
/// type variables used once. Polymorphic results must be derived from `ctrl`.
fn verify_ctrl_typevar(
    name: &str,
    format: &InstructionFormat,
    ins: &[Operand],
    outs: &[Operand],
    ctrl: &TypeVar,
) -> MetaResult<Vec<TypeVar>> {
    let mut other_tvs: Vec<TypeVar> = Vec::new();

    for &i in format.value_operands() {
        let operand = &ins[i];
        let tv = match operand.typ().free_typevar() {
            Some(tv) if tv != *ctrl => tv,
            _ => continue,
        };
        if operand.typ().as_typevar() != Some(&tv) {
            return Err(MetaError::UnderivedTypevar {
                inst: name.to_string(),
                operand: operand.to_string(),
                typevar: operand.typ().name().to_string(),
                ctrl: ctrl.to_string(),
            });
        }
        if other_tvs.contains(&tv) {
            return Err(MetaError::TypevarReuseViolation {
                inst: name.to_string(),
                typevar: tv.to_string(),
            });
        }
        other_tvs.push(tv);
    }

    for result in outs {
        if let Some(tv) = result.typ().free_typevar() {
            if tv != *ctrl {
                return Err(MetaError::OutputTypevarMismatch {
                    inst: name.to_string(),
                    operand: result.to_string(),
                    ctrl: ctrl.to_string(),
                });
            }
        }
    }

    Ok(other_tvs)
}

#[derive(Debug)]
pub struct InstructionContent {
    name: String,
    camel_name: String,
    doc: String,
    ins: Vec<Operand>,
    outs: Vec<Operand>,
    format: Rc<InstructionFormat>,
    value_results: Vec<usize>,
    polymorphism: Option<Polymorphism>,
    is_terminator: bool,
    is_branch: bool,
}

/// A shared handle to a defined instruction. Compares by identity.
#[derive(Debug, Clone)]
pub struct Instruction(Rc<InstructionContent>);

impl Instruction {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn camel_name(&self) -> &str {
        &self.0.camel_name
    }

    pub fn doc(&self) -> &str {
        &self.0.doc
    }

    /// First non-empty line of the doc comment.
    pub fn blurb(&self) -> &str {
        self.0
            .doc
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }

    pub fn ins(&self) -> &[Operand] {
        &self.0.ins
    }

    pub fn outs(&self) -> &[Operand] {
        &self.0.outs
    }

    pub fn format(&self) -> &Rc<InstructionFormat> {
        &self.0.format
    }

    /// Indexes into `outs` of the value results.
    pub fn value_results(&self) -> &[usize] {
        &self.0.value_results
    }

    pub fn is_terminator(&self) -> bool {
        self.0.is_terminator
    }

    pub fn is_branch(&self) -> bool {
        self.0.is_branch
    }

    pub fn polymorphism(&self) -> Option<&Polymorphism> {
        self.0.polymorphism.as_ref()
    }

    pub fn is_polymorphic(&self) -> bool {
        self.0.polymorphism.is_some()
    }

    pub fn ctrl_typevar(&self) -> Option<&TypeVar> {
        self.polymorphism().map(|p| &p.ctrl_typevar)
    }

    pub fn other_typevars(&self) -> &[TypeVar] {
        self.polymorphism()
            .map(|p| p.other_typevars.as_slice())
            .unwrap_or(&[])
    }

    /// Number of type arguments a fully bound instance takes.
    pub fn num_typevars(&self) -> usize {
        match self.polymorphism() {
            Some(poly) => 1 + poly.other_typevars.len(),
            None => 0,
        }
    }

    /// Controlling type variable followed by the other type variables.
    fn all_typevars(&self) -> Vec<&TypeVar> {
        match self.polymorphism() {
            Some(poly) => std::iter::once(&poly.ctrl_typevar)
                .chain(poly.other_typevars.iter())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Bind the controlling type variable.
    pub fn bind(&self, ty: ValueType) -> MetaResult<BoundInstruction> {
        self.bind_all(vec![ty])
    }

    /// Bind a list of type variables in order.
    pub fn bind_all(&self, types: Vec<ValueType>) -> MetaResult<BoundInstruction> {
        if !self.is_polymorphic() {
            return Err(MetaError::NotPolymorphic {
                inst: self.name().to_string(),
            });
        }
        BoundInstruction::new(self.clone(), types)
    }

    /// Bind the controlling type variable to the type registered as `name`.
    pub fn bind_type(&self, types: &TypeRegistry, name: &str) -> MetaResult<BoundInstruction> {
        self.bind(types.by_name(name)?)
    }

    /// Verify that no type variables are left unbound.
    ///
    /// A monomorphic instruction is trivially fully bound.
    pub fn fully_bound(&self) -> MetaResult<(Instruction, Vec<ValueType>)> {
        if self.is_polymorphic() {
            return Err(MetaError::UnboundTypevar {
                inst: self.name().to_string(),
                missing: join_typevars(&self.all_typevars()),
            });
        }
        Ok((self.clone(), Vec::new()))
    }

    /// Apply this instruction to arguments, producing a pattern node.
    pub fn apply(&self, args: Vec<Expr>) -> MetaResult<Apply> {
        Apply::new(self.clone().into(), args)
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Instruction {}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outs: Vec<&str> = self.outs().iter().map(Operand::name).collect();
        let ins: Vec<&str> = self.ins().iter().map(Operand::name).collect();
        if !outs.is_empty() {
            write!(f, "{} = ", outs.join(", "))?;
        }
        write!(f, "{} {}", self.name(), ins.join(", "))
    }
}

fn join_typevars(tvs: &[&TypeVar]) -> String {
    tvs.iter()
        .map(|tv| tv.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A polymorphic instruction bound to concrete types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundInstruction {
    inst: Instruction,
    types: Vec<ValueType>,
}

impl BoundInstruction {
    fn new(inst: Instruction, types: Vec<ValueType>) -> MetaResult<Self> {
        let expected = inst.num_typevars();
        if types.len() > expected {
            return Err(MetaError::TooManyTypeArguments {
                inst: inst.name().to_string(),
                given: types.len(),
                expected,
            });
        }
        Ok(Self { inst, types })
    }

    pub fn inst(&self) -> &Instruction {
        &self.inst
    }

    /// Type arguments bound so far, controlling type first.
    pub fn types(&self) -> &[ValueType] {
        &self.types
    }

    /// Bind one more type variable.
    pub fn bind(&self, ty: ValueType) -> MetaResult<BoundInstruction> {
        let mut types = self.types.clone();
        types.push(ty);
        BoundInstruction::new(self.inst.clone(), types)
    }

    pub fn bind_type(&self, types: &TypeRegistry, name: &str) -> MetaResult<BoundInstruction> {
        self.bind(types.by_name(name)?)
    }

    /// Verify that all type variables have been bound.
    pub fn fully_bound(&self) -> MetaResult<(Instruction, Vec<ValueType>)> {
        let all = self.inst.all_typevars();
        if self.types.len() < all.len() {
            return Err(MetaError::UnboundTypevar {
                inst: self.to_string(),
                missing: join_typevars(&all[self.types.len()..]),
            });
        }
        Ok((self.inst.clone(), self.types.clone()))
    }

    pub fn apply(&self, args: Vec<Expr>) -> MetaResult<Apply> {
        Apply::new(self.clone().into(), args)
    }
}

impl fmt::Display for BoundInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inst.name())?;
        for ty in &self.types {
            write!(f, ".{}", ty)?;
        }
        Ok(())
    }
}

/// An instruction, possibly bound to concrete types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstSpec {
    Inst(Instruction),
    Bound(BoundInstruction),
}

impl InstSpec {
    pub fn inst(&self) -> &Instruction {
        match self {
            InstSpec::Inst(inst) => inst,
            InstSpec::Bound(bound) => bound.inst(),
        }
    }

    pub fn fully_bound(&self) -> MetaResult<(Instruction, Vec<ValueType>)> {
        match self {
            InstSpec::Inst(inst) => inst.fully_bound(),
            InstSpec::Bound(bound) => bound.fully_bound(),
        }
    }
}

impl From<Instruction> for InstSpec {
    fn from(inst: Instruction) -> Self {
        InstSpec::Inst(inst)
    }
}

impl From<&Instruction> for InstSpec {
    fn from(inst: &Instruction) -> Self {
        InstSpec::Inst(inst.clone())
    }
}

impl From<BoundInstruction> for InstSpec {
    fn from(bound: BoundInstruction) -> Self {
        InstSpec::Bound(bound)
    }
}

impl From<&BoundInstruction> for InstSpec {
    fn from(bound: &BoundInstruction) -> Self {
        InstSpec::Bound(bound.clone())
    }
}

impl fmt::Display for InstSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstSpec::Inst(inst) => f.write_str(inst.name()),
            InstSpec::Bound(bound) => fmt::Display::fmt(bound, f),
        }
    }
}

/// An ordered group of instructions.
///
/// Every instruction belongs to exactly one group. A target ISA can support
/// instructions from several groups.
#[derive(Debug)]
pub struct InstructionGroup {
    name: String,
    doc: String,
    instructions: Vec<Instruction>,
}

impl InstructionGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn by_name(&self, name: &str) -> Option<&Instruction> {
        self.instructions.iter().find(|inst| inst.name() == name)
    }
}

/// The currently open instruction group; see
/// [`Catalog::open_instructions`](crate::core::Catalog::open_instructions).
#[derive(Debug)]
pub struct InstructionGroupBuilder {
    name: String,
    doc: String,
    instructions: Vec<Instruction>,
}

impl InstructionGroupBuilder {
    pub(crate) fn new(name: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: doc.to_string(),
            instructions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn push(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub(crate) fn finish(self) -> InstructionGroup {
        InstructionGroup {
            name: self.name,
            doc: self.doc,
            instructions: self.instructions,
        }
    }
}
