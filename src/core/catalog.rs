// This module provides the Catalog, the explicit context object that every declaration
// step runs against. It owns the value type registry, the operand kind registry, the
// instruction format registry and the list of closed instruction groups, and it enforces
// that at most one group (settings or instructions) is open at a time. Opening a group
// returns a builder, closing it consumes the builder and freezes the group; settings
// groups are laid out on close. CatalogStats counts what has been declared and is
// printed by the metagen binary.

//! Description catalog.
//!
//! The catalog is the context threaded through a declarative description
//! pass. It owns the value type registry, the operand kinds, the instruction
//! formats and the closed instruction groups, and it tracks the single group
//! (settings or instructions) that may be open at any time.
//!
//! Opening a group hands out a builder; closing the group consumes the
//! builder and returns the frozen group.

use super::error::{MetaError, MetaResult};
use crate::ir::{
    FormatRegistry, Instruction, InstructionBuilder, InstructionGroup, InstructionGroupBuilder,
    OperandKindRegistry, TypeRegistry,
};
use crate::settings::{SettingGroup, SettingGroupBuilder};
use hashbrown::HashSet;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    Settings,
    Instructions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenGroup {
    kind: GroupKind,
    name: String,
}

/// Counters describing what has been declared so far.
#[derive(Debug, Default, Clone)]
pub struct CatalogStats {
    pub types: usize,
    pub operand_kinds: usize,
    pub formats: usize,
    pub instruction_groups: usize,
    pub instructions: usize,
    pub setting_groups: usize,
    pub settings: usize,
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Value types: {}", self.types)?;
        writeln!(f, "  Operand kinds: {}", self.operand_kinds)?;
        writeln!(f, "  Instruction formats: {}", self.formats)?;
        writeln!(f, "  Instruction groups: {}", self.instruction_groups)?;
        writeln!(f, "  Instructions: {}", self.instructions)?;
        writeln!(f, "  Setting groups: {}", self.setting_groups)?;
        writeln!(f, "  Settings: {}", self.settings)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    types: TypeRegistry,
    kinds: OperandKindRegistry,
    formats: FormatRegistry,
    instruction_groups: Vec<Rc<InstructionGroup>>,
    instruction_names: HashSet<String>,
    open: Option<OpenGroup>,
    stats: CatalogStats,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn kinds(&self) -> &OperandKindRegistry {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut OperandKindRegistry {
        &mut self.kinds
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        &mut self.formats
    }

    /// Closed instruction groups, in the order they were closed.
    pub fn instruction_groups(&self) -> &[Rc<InstructionGroup>] {
        &self.instruction_groups
    }

    /// Name of the currently open group, if any.
    pub fn open_group(&self) -> Option<&str> {
        self.open.as_ref().map(|g| g.name.as_str())
    }

    fn open(&mut self, kind: GroupKind, name: &str) -> MetaResult<()> {
        if let Some(open) = &self.open {
            return Err(MetaError::GroupAlreadyOpen {
                group: name.to_string(),
                open: open.name.clone(),
            });
        }
        log::debug!("open {:?} group {}", kind, name);
        self.open = Some(OpenGroup {
            kind,
            name: name.to_string(),
        });
        Ok(())
    }

    fn check_open(&self, kind: GroupKind, name: &str) -> MetaResult<()> {
        match &self.open {
            Some(open) if open.kind == kind && open.name == name => Ok(()),
            open => Err(MetaError::GroupNotOpen {
                group: name.to_string(),
                open: open
                    .as_ref()
                    .map_or_else(|| "none".to_string(), |g| g.name.clone()),
            }),
        }
    }

    fn close(&mut self, kind: GroupKind, name: &str) -> MetaResult<()> {
        self.check_open(kind, name)?;
        self.open = None;
        Ok(())
    }

    pub fn open_instructions(&mut self, name: &str, doc: &str) -> MetaResult<InstructionGroupBuilder> {
        self.open(GroupKind::Instructions, name)?;
        Ok(InstructionGroupBuilder::new(name, doc))
    }

    /// Resolve the format of `inst`, verify its polymorphism and add it to
    /// `group`.
    pub fn define_instruction(
        &mut self,
        group: &mut InstructionGroupBuilder,
        inst: InstructionBuilder,
    ) -> MetaResult<Instruction> {
        self.check_open(GroupKind::Instructions, group.name())?;
        if self.instruction_names.contains(inst.name()) {
            return Err(MetaError::DuplicateInstruction {
                name: inst.name().to_string(),
            });
        }
        let inst = inst.build(&self.formats)?;
        self.instruction_names.insert(inst.name().to_string());
        log::debug!("{}: defined {} ({})", group.name(), inst.name(), inst.format().name());
        group.push(inst.clone());
        self.stats.instructions += 1;
        Ok(inst)
    }

    pub fn close_instructions(&mut self, group: InstructionGroupBuilder) -> MetaResult<Rc<InstructionGroup>> {
        self.close(GroupKind::Instructions, group.name())?;
        let group = Rc::new(group.finish());
        self.instruction_groups.push(group.clone());
        self.stats.instruction_groups += 1;
        Ok(group)
    }

    /// Open a new settings group, optionally inheriting from `parent`.
    pub fn open_settings(
        &mut self,
        name: &str,
        parent: Option<&SettingGroup>,
    ) -> MetaResult<SettingGroupBuilder> {
        self.open(GroupKind::Settings, name)?;
        Ok(SettingGroupBuilder::new(name, parent.map(|p| p.info().clone())))
    }

    /// Close the settings group and compute its layout.
    pub fn close_settings(&mut self, group: SettingGroupBuilder) -> MetaResult<SettingGroup> {
        self.close(GroupKind::Settings, group.name())?;
        let group = group.finish()?;
        self.stats.setting_groups += 1;
        self.stats.settings += group.settings().len();
        Ok(group)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            types: self.types.len(),
            operand_kinds: self.kinds.len(),
            formats: self.formats.len(),
            ..self.stats.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_open_group() {
        let mut catalog = Catalog::new();
        let settings = catalog.open_settings("shared", None).unwrap();

        let err = catalog.open_instructions("base", "").unwrap_err();
        assert_eq!(err.category(), "GroupAlreadyOpen");
        let err = catalog.open_settings("x86", None).unwrap_err();
        assert_eq!(err.category(), "GroupAlreadyOpen");
        assert_eq!(catalog.open_group(), Some("shared"));

        catalog.close_settings(settings).unwrap();
        assert_eq!(catalog.open_group(), None);

        let insts = catalog.open_instructions("base", "").unwrap();
        catalog.close_instructions(insts).unwrap();
        assert_eq!(catalog.instruction_groups().len(), 1);
    }

    #[test]
    fn test_close_other_catalogs_group() {
        let mut a = Catalog::new();
        let mut b = Catalog::new();
        let group = a.open_settings("shared", None).unwrap();
        let err = b.close_settings(group).unwrap_err();
        assert_eq!(err.category(), "GroupNotOpen");
        assert_eq!(
            err.to_string(),
            "shared is not the open group, the open group is none"
        );
    }

    #[test]
    fn test_define_needs_open_group() {
        let mut a = Catalog::new();
        let mut b = Catalog::new();
        a.formats_mut()
            .insert(crate::ir::FormatBuilder::new("Nullary"))
            .unwrap();
        let mut group = a.open_instructions("base", "").unwrap();

        let err = b
            .define_instruction(&mut group, InstructionBuilder::new("nop", ""))
            .unwrap_err();
        assert_eq!(err.category(), "GroupNotOpen");

        // The name wasn't claimed by the failed definition.
        a.define_instruction(&mut group, InstructionBuilder::new("nop", ""))
            .unwrap();
        let group = a.close_instructions(group).unwrap();
        assert_eq!(group.instructions().len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut catalog = Catalog::new();
        catalog.types_mut().int(32).unwrap();
        let mut group = catalog.open_settings("shared", None).unwrap();
        group.bool_setting("a", "", false).unwrap();
        group.num_setting("b", "", 3).unwrap();
        catalog.close_settings(group).unwrap();

        let stats = catalog.stats();
        assert_eq!(stats.types, 1);
        assert_eq!(stats.operand_kinds, 2);
        assert_eq!(stats.setting_groups, 1);
        assert_eq!(stats.settings, 2);
        assert!(stats.to_string().contains("Settings: 2"));
    }
}
