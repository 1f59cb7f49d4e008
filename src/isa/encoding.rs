//! Encoding recipes and per-instruction encodings.

use crate::core::{MetaError, MetaResult};
use crate::ir::{InstSpec, Instruction, InstructionFormat, ValueType};
use crate::predicates::{Predicate, PredicateContext};
use std::fmt;
use std::rc::Rc;

/// A recipe for encoding instructions with a given format.
///
/// Many different instructions can be encoded by the same recipe, but they
/// must all have the same instruction format. Recipes are numbered by
/// identity when the owning ISA is finished.
#[derive(Debug)]
pub struct EncRecipe {
    name: String,
    format: Rc<InstructionFormat>,
    instp: Option<Predicate>,
    isap: Option<Predicate>,
}

impl EncRecipe {
    /// `instp` must be a predicate on `format`. `isap` is a settings
    /// predicate.
    pub fn new(
        name: &str,
        format: &Rc<InstructionFormat>,
        instp: Option<Predicate>,
        isap: Option<Predicate>,
    ) -> MetaResult<Rc<Self>> {
        if let Some(p) = &instp {
            if p.predicate_context() != PredicateContext::Format(format.clone()) {
                return Err(MetaError::PredicateContextMismatch {
                    predicate: p.to_string(),
                    expected: format.name().to_string(),
                });
            }
        }
        Ok(Rc::new(Self {
            name: name.to_string(),
            format: format.clone(),
            instp,
            isap,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &Rc<InstructionFormat> {
        &self.format
    }

    pub fn instp(&self) -> Option<&Predicate> {
        self.instp.as_ref()
    }

    pub fn isap(&self) -> Option<&Predicate> {
        self.isap.as_ref()
    }
}

impl fmt::Display for EncRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Encoding for a concrete instruction.
///
/// Ties an instruction with all type variables bound to an encoding recipe
/// and recipe-specific encoding bits.
#[derive(Debug, Clone)]
pub struct Encoding {
    inst: Instruction,
    typevars: Vec<ValueType>,
    recipe: Rc<EncRecipe>,
    encbits: u32,
    instp: Option<Predicate>,
    isap: Option<Predicate>,
}

impl Encoding {
    /// The recipe predicates are combined with `instp` and `isap`.
    pub fn new(
        inst: impl Into<InstSpec>,
        recipe: &Rc<EncRecipe>,
        encbits: u32,
        instp: Option<Predicate>,
        isap: Option<Predicate>,
    ) -> MetaResult<Self> {
        let (inst, typevars) = inst.into().fully_bound()?;
        if !Rc::ptr_eq(inst.format(), &recipe.format) {
            return Err(MetaError::FormatRecipeMismatch {
                inst_format: inst.format().name().to_string(),
                recipe: recipe.name.clone(),
                recipe_format: recipe.format.name().to_string(),
            });
        }
        let instp = Predicate::and(recipe.instp.clone(), instp)?;
        let isap = Predicate::and(recipe.isap.clone(), isap)?;
        Ok(Self {
            inst,
            typevars,
            recipe: recipe.clone(),
            encbits,
            instp,
            isap,
        })
    }

    pub fn inst(&self) -> &Instruction {
        &self.inst
    }

    pub fn typevars(&self) -> &[ValueType] {
        &self.typevars
    }

    pub fn recipe(&self) -> &Rc<EncRecipe> {
        &self.recipe
    }

    pub fn encbits(&self) -> u32 {
        self.encbits
    }

    pub fn instp(&self) -> Option<&Predicate> {
        self.instp.as_ref()
    }

    pub fn isap(&self) -> Option<&Predicate> {
        self.isap.as_ref()
    }

    /// The type bound to the controlling type variable, if the instruction
    /// is polymorphic.
    pub fn ctrl_typevar(&self) -> Option<&ValueType> {
        self.typevars.first()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}#{:02x}]", self.recipe.name, self.encbits)
    }
}
