// This module implements settings groups: boolean, numeric and enumerated settings
// declared on a SettingGroupBuilder, and the SettingGroup they freeze into. The layout
// pass assigns byte offsets to byte-sized settings first, then packs boolean settings
// into bits starting at boolean_offset, with the bit position taken from the setting's
// predicate number. Named predicates and later numbered predicates share the same
// numbering space. The packing order is relied upon by generated tables and must not
// change.

//! Setting groups and their byte vector layout.
//!
//! A settings group is represented at runtime as a byte vector containing, in
//! order:
//!
//! 1. Byte-sized settings (numeric and enumerated), one byte each.
//! 2. Boolean settings, one bit each.
//! 3. Named predicates computed from the settings.
//! 4. Any other predicates that need to be accessible by number, including
//!    anonymous predicates and predicates replicated from a parent group.
//!
//! Only the first two parts are configured; `settings_size` marks their end.

use crate::core::{MetaError, MetaResult};
use crate::predicates::{Predicate, PredicateContext};
use hashbrown::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Identity of a settings group, shared by everything that refers to it.
#[derive(Debug)]
pub struct GroupInfo {
    name: String,
    parent: Option<Rc<GroupInfo>>,
}

impl GroupInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<GroupInfo>> {
        self.parent.as_ref()
    }

    /// Is `self` the same group as `other` or one of its ancestors?
    pub fn is_ancestor_of(&self, other: &GroupInfo) -> bool {
        let mut current = Some(other);
        while let Some(group) = current {
            if std::ptr::eq(self, group) {
                return true;
            }
            current = group.parent.as_deref();
        }
        false
    }
}

/// Handle to a boolean setting, usable as a predicate leaf.
#[derive(Debug, Clone)]
pub struct BoolSetting {
    group: Rc<GroupInfo>,
    index: usize,
    name: String,
}

impl BoolSetting {
    pub fn group(&self) -> &Rc<GroupInfo> {
        &self.group
    }

    /// Position of the setting in its group's declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> Predicate {
        Predicate::Setting(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
    Bool { default: bool },
    Num { default: u8 },
    /// The default is always the first value.
    Enum { values: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    doc: String,
    kind: SettingKind,
    byte_offset: usize,
    bit_offset: Option<u8>,
}

impl Setting {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind, SettingKind::Bool { .. })
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Bit within the byte at `byte_offset`, for boolean settings only.
    pub fn bit_offset(&self) -> Option<u8> {
        self.bit_offset
    }

    /// Default value as a byte that can be OR'ed into the settings vector.
    pub fn default_byte(&self) -> u8 {
        match &self.kind {
            SettingKind::Bool { default } => match (default, self.bit_offset) {
                (true, Some(bit)) => 1 << bit,
                _ => 0,
            },
            SettingKind::Num { default } => *default,
            SettingKind::Enum { .. } => 0,
        }
    }
}

/// An open settings group accepting new settings.
///
/// Created by `Catalog::open_settings` and finalized by
/// `Catalog::close_settings`.
#[derive(Debug)]
pub struct SettingGroupBuilder {
    info: Rc<GroupInfo>,
    settings: Vec<Setting>,
    named_predicates: Vec<(String, Predicate)>,
    names: HashSet<String>,
}

impl SettingGroupBuilder {
    pub(crate) fn new(name: &str, parent: Option<Rc<GroupInfo>>) -> Self {
        Self {
            info: Rc::new(GroupInfo {
                name: name.to_string(),
                parent,
            }),
            settings: Vec::new(),
            named_predicates: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &Rc<GroupInfo> {
        &self.info
    }

    fn claim_name(&mut self, name: &str) -> MetaResult<()> {
        if !self.names.insert(name.to_string()) {
            return Err(MetaError::DuplicateSettingName {
                group: self.info.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn push(&mut self, name: &str, doc: &str, kind: SettingKind) -> MetaResult<usize> {
        self.claim_name(name)?;
        self.settings.push(Setting {
            name: name.to_string(),
            doc: doc.to_string(),
            kind,
            byte_offset: 0,
            bit_offset: None,
        });
        Ok(self.settings.len() - 1)
    }

    pub fn bool_setting(&mut self, name: &str, doc: &str, default: bool) -> MetaResult<BoolSetting> {
        let index = self.push(name, doc, SettingKind::Bool { default })?;
        Ok(BoolSetting {
            group: self.info.clone(),
            index,
            name: name.to_string(),
        })
    }

    pub fn num_setting(&mut self, name: &str, doc: &str, default: u8) -> MetaResult<()> {
        self.push(name, doc, SettingKind::Num { default })?;
        Ok(())
    }

    pub fn enum_setting(&mut self, name: &str, doc: &str, values: &[&str]) -> MetaResult<()> {
        if values.is_empty() {
            return Err(MetaError::EmptyEnumSetting {
                group: self.info.name.clone(),
                name: name.to_string(),
            });
        }
        let values = values.iter().map(|v| v.to_string()).collect();
        self.push(name, doc, SettingKind::Enum { values })?;
        Ok(())
    }

    /// Register a predicate computed from settings in this group or its
    /// parents. Named predicates are numbered right after the boolean
    /// settings.
    pub fn named_predicate(&mut self, name: &str, predicate: impl Into<Predicate>) -> MetaResult<()> {
        self.claim_name(name)?;
        self.named_predicates.push((name.to_string(), predicate.into()));
        Ok(())
    }

    pub(crate) fn finish(self) -> MetaResult<SettingGroup> {
        let mut group = SettingGroup {
            info: self.info,
            settings: self.settings,
            named_predicates: self.named_predicates,
            predicate_numbers: HashMap::new(),
            predicates: Vec::new(),
            boolean_offset: 0,
            settings_size: 0,
            laid_out: false,
        };
        group.layout()?;
        Ok(group)
    }
}

/// A closed settings group.
#[derive(Debug)]
pub struct SettingGroup {
    info: Rc<GroupInfo>,
    settings: Vec<Setting>,
    named_predicates: Vec<(String, Predicate)>,
    predicate_numbers: HashMap<Predicate, usize>,
    predicates: Vec<Predicate>,
    boolean_offset: usize,
    settings_size: usize,
    laid_out: bool,
}

impl SettingGroup {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &Rc<GroupInfo> {
        &self.info
    }

    pub fn parent(&self) -> Option<&Rc<GroupInfo>> {
        self.info.parent()
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn named_predicates(&self) -> &[(String, Predicate)] {
        &self.named_predicates
    }

    /// Handle to the boolean setting `name`.
    pub fn bool_setting(&self, name: &str) -> Option<BoolSetting> {
        self.settings
            .iter()
            .position(|s| s.name == name && s.is_bool())
            .map(|index| BoolSetting {
                group: self.info.clone(),
                index,
                name: name.to_string(),
            })
    }

    /// Compute the layout of the byte vector. Runs once, when the group is
    /// closed.
    pub fn layout(&mut self) -> MetaResult<()> {
        if self.laid_out {
            return Err(MetaError::LayoutAlreadyPerformed {
                group: self.info.name.clone(),
            });
        }
        self.laid_out = true;

        let mut byte_offset = 0;
        for setting in self.settings.iter_mut().filter(|s| !s.is_bool()) {
            setting.byte_offset = byte_offset;
            byte_offset += 1;
        }

        self.boolean_offset = byte_offset;
        for index in 0..self.settings.len() {
            if !self.settings[index].is_bool() {
                continue;
            }
            let leaf = Predicate::Setting(BoolSetting {
                group: self.info.clone(),
                index,
                name: self.settings[index].name.clone(),
            });
            let number = self.number_predicate(&leaf)?;
            let setting = &mut self.settings[index];
            setting.byte_offset = byte_offset + number / 8;
            setting.bit_offset = Some((number % 8) as u8);
        }

        // End of the configured settings, rounded up to whole bytes.
        self.settings_size = self.byte_size();

        let named: Vec<Predicate> = self.named_predicates.iter().map(|(_, p)| p.clone()).collect();
        for predicate in &named {
            self.number_predicate(predicate)?;
        }

        log::debug!(
            "settings group {}: boolean_offset={}, settings_size={}, {} predicates",
            self.info.name,
            self.boolean_offset,
            self.settings_size,
            self.predicates.len()
        );
        Ok(())
    }

    /// Make sure `predicate` has an assigned number in this group's bit
    /// vector, and return it.
    ///
    /// The predicate must be evaluable against this group or one of its
    /// ancestors.
    pub fn number_predicate(&mut self, predicate: &Predicate) -> MetaResult<usize> {
        if let Some(&number) = self.predicate_numbers.get(predicate) {
            return Ok(number);
        }
        self.check_predicate(predicate)?;
        let number = self.predicates.len();
        self.predicates.push(predicate.clone());
        self.predicate_numbers.insert(predicate.clone(), number);
        Ok(number)
    }

    /// Check that `predicate` could be numbered in this group, without
    /// numbering it.
    pub fn check_predicate(&self, predicate: &Predicate) -> MetaResult<()> {
        let accessible = match predicate.predicate_context() {
            PredicateContext::Settings(group) => group.is_ancestor_of(&self.info),
            PredicateContext::Format(_) => false,
        };
        if !accessible {
            return Err(MetaError::ForeignPredicate {
                predicate: predicate.to_string(),
                group: self.info.name.clone(),
            });
        }
        Ok(())
    }

    pub fn predicate_number(&self, predicate: &Predicate) -> Option<usize> {
        self.predicate_numbers.get(predicate).copied()
    }

    /// All numbered predicates, indexed by their number.
    pub fn numbered_predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Start of the boolean settings in the byte vector.
    pub fn boolean_offset(&self) -> usize {
        self.boolean_offset
    }

    /// Size of the configured part of the byte vector.
    pub fn settings_size(&self) -> usize {
        self.settings_size
    }

    /// Number of bytes needed to hold all settings and numbered predicates.
    pub fn byte_size(&self) -> usize {
        self.boolean_offset + self.predicates.len().div_ceil(8)
    }

    /// The default configuration vector, `settings_size` bytes long.
    pub fn default_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.settings_size];
        for setting in &self.settings {
            if setting.is_bool() {
                bytes[setting.byte_offset] |= setting.default_byte();
            } else {
                bytes[setting.byte_offset] = setting.default_byte();
            }
        }
        bytes
    }
}

impl fmt::Display for SettingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Settings group: {}", self.info.name)?;
        if let Some(parent) = self.parent() {
            writeln!(f, "  parent: {}", parent.name())?;
        }
        writeln!(f, "  settings_size: {} bytes", self.settings_size)?;
        writeln!(f, "  boolean_offset: {}", self.boolean_offset)?;
        for setting in &self.settings {
            match (&setting.kind, setting.bit_offset) {
                (SettingKind::Bool { default }, Some(bit)) => writeln!(
                    f,
                    "  {:<16} byte {} bit {} (default {})",
                    setting.name, setting.byte_offset, bit, default
                )?,
                (SettingKind::Num { default }, _) => writeln!(
                    f,
                    "  {:<16} byte {} (default {})",
                    setting.name, setting.byte_offset, default
                )?,
                (SettingKind::Enum { values }, _) => writeln!(
                    f,
                    "  {:<16} byte {} [{}]",
                    setting.name,
                    setting.byte_offset,
                    values.join(", ")
                )?,
                _ => writeln!(f, "  {:<16} byte {}", setting.name, setting.byte_offset)?,
            }
        }
        for (number, predicate) in self.predicates.iter().enumerate() {
            writeln!(f, "  predicate {}: {}", number, predicate)?;
        }
        Ok(())
    }
}
