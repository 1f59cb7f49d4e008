//! Target ISA descriptions.
//!
//! A [`TargetIsa`] collects the instruction groups relevant to a target, its
//! settings group and a list of CPU modes. Each [`CpuMode`] holds the
//! encodings that are active in that mode, in declaration order.
//!
//! Calling [`TargetIsa::finish`] numbers the encoding recipes and
//! instruction predicates in use, and makes sure every ISA predicate has a
//! bit number in the settings group.

pub mod encoding;

pub use encoding::{EncRecipe, Encoding};

use crate::core::{MetaError, MetaResult};
use crate::ir::{InstSpec, InstructionGroup};
use crate::predicates::Predicate;
use crate::settings::SettingGroup;
use hashbrown::HashMap;
use std::rc::Rc;

/// A CPU mode determines which instruction encodings are active.
#[derive(Debug, Clone)]
pub struct CpuMode {
    name: String,
    encodings: Vec<Encoding>,
}

impl CpuMode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            encodings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a new encoding to this CPU mode.
    pub fn enc(
        &mut self,
        inst: impl Into<InstSpec>,
        recipe: &Rc<EncRecipe>,
        encbits: u32,
        instp: Option<Predicate>,
        isap: Option<Predicate>,
    ) -> MetaResult<()> {
        let encoding = Encoding::new(inst, recipe, encbits, instp, isap)?;
        log::trace!("{}: {} {}", self.name, encoding.inst().name(), encoding);
        self.encodings.push(encoding);
        Ok(())
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }
}

/// Numbering computed by [`TargetIsa::finish`].
#[derive(Debug, Default)]
struct IsaNumbering {
    recipes: Vec<Rc<EncRecipe>>,
    recipe_numbers: HashMap<*const EncRecipe, usize>,
    instps: Vec<Predicate>,
    instp_numbers: HashMap<Predicate, usize>,
}

/// A target instruction set architecture.
#[derive(Debug)]
pub struct TargetIsa {
    name: String,
    instruction_groups: Vec<Rc<InstructionGroup>>,
    settings: SettingGroup,
    cpumodes: Vec<CpuMode>,
    numbering: Option<IsaNumbering>,
}

impl TargetIsa {
    pub fn new(
        name: &str,
        instruction_groups: Vec<Rc<InstructionGroup>>,
        settings: SettingGroup,
    ) -> Self {
        Self {
            name: name.to_string(),
            instruction_groups,
            settings,
            cpumodes: Vec::new(),
            numbering: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction_groups(&self) -> &[Rc<InstructionGroup>] {
        &self.instruction_groups
    }

    pub fn settings(&self) -> &SettingGroup {
        &self.settings
    }

    pub fn cpumodes(&self) -> &[CpuMode] {
        &self.cpumodes
    }

    pub fn add_cpu_mode(&mut self, mode: CpuMode) -> MetaResult<()> {
        self.check_open()?;
        self.cpumodes.push(mode);
        Ok(())
    }

    fn check_open(&self) -> MetaResult<()> {
        if self.numbering.is_some() {
            return Err(MetaError::IsaAlreadyFinished {
                isa: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Finish the definition after adding all CPU modes.
    ///
    /// ISA predicates are checked against the settings group before anything
    /// is numbered, so a failed `finish` leaves the settings untouched.
    pub fn finish(&mut self) -> MetaResult<()> {
        self.check_open()?;

        // Parent predicates may get replicated into our settings group, along
        // with every setting they are composed of.
        let mut isaps: Vec<Predicate> = Vec::new();
        for isap in self
            .cpumodes
            .iter()
            .flat_map(|mode| &mode.encodings)
            .filter_map(Encoding::isap)
        {
            self.settings.check_predicate(isap)?;
            isaps.push(isap.clone());
            for leaf in isap.leafs() {
                self.settings.check_predicate(&leaf)?;
                isaps.push(leaf);
            }
        }

        let mut numbering = IsaNumbering::default();

        for encoding in self.cpumodes.iter().flat_map(|mode| &mode.encodings) {
            let recipe = encoding.recipe();
            if !numbering.recipe_numbers.contains_key(&Rc::as_ptr(recipe)) {
                let number = numbering.recipes.len();
                numbering.recipe_numbers.insert(Rc::as_ptr(recipe), number);
                numbering.recipes.push(recipe.clone());
            }

            if let Some(instp) = encoding.instp() {
                if !numbering.instp_numbers.contains_key(instp) {
                    let number = numbering.instps.len();
                    numbering.instp_numbers.insert(instp.clone(), number);
                    numbering.instps.push(instp.clone());
                }
            }
        }
        for isap in &isaps {
            self.settings.number_predicate(isap)?;
        }

        log::debug!(
            "isa {}: {} recipes, {} instruction predicates, {} settings bytes",
            self.name,
            numbering.recipes.len(),
            numbering.instps.len(),
            self.settings.byte_size()
        );
        self.numbering = Some(numbering);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.numbering.is_some()
    }

    /// Encoding recipes in use, in order of first use. Empty until finished.
    pub fn all_recipes(&self) -> &[Rc<EncRecipe>] {
        self.numbering
            .as_ref()
            .map(|n| n.recipes.as_slice())
            .unwrap_or_default()
    }

    /// Instruction predicates in use, in order of first use.
    pub fn all_instps(&self) -> &[Predicate] {
        self.numbering
            .as_ref()
            .map(|n| n.instps.as_slice())
            .unwrap_or_default()
    }

    pub fn recipe_number(&self, recipe: &Rc<EncRecipe>) -> Option<usize> {
        self.numbering
            .as_ref()
            .and_then(|n| n.recipe_numbers.get(&Rc::as_ptr(recipe)).copied())
    }

    pub fn instp_number(&self, instp: &Predicate) -> Option<usize> {
        self.numbering
            .as_ref()
            .and_then(|n| n.instp_numbers.get(instp).copied())
    }
}
