//! Predicates over settings and instruction fields.
//!
//! A predicate is evaluated against a context: either a settings group (for
//! ISA predicates) or an instruction format (for instruction predicates).
//! Leaves are boolean settings or functions of a format field; leaves can be
//! combined with a logical AND.
//!
//! Predicates are shared handles and compare by identity, so two separately
//! constructed but structurally equal predicates are distinct.

use crate::core::{MetaError, MetaResult};
use crate::ir::{FormatField, InstructionFormat};
use crate::settings::{BoolSetting, GroupInfo};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The thing a predicate can be evaluated against.
#[derive(Debug, Clone)]
pub enum PredicateContext {
    Settings(Rc<GroupInfo>),
    Format(Rc<InstructionFormat>),
}

impl PredicateContext {
    /// Find the context in which both `self` and `other` can be evaluated.
    ///
    /// For settings groups the deeper group wins when one group is an
    /// ancestor of the other.
    fn combine(&self, other: &PredicateContext) -> Option<PredicateContext> {
        match (self, other) {
            (PredicateContext::Settings(a), PredicateContext::Settings(b)) => {
                if a.is_ancestor_of(b) {
                    Some(other.clone())
                } else if b.is_ancestor_of(a) {
                    Some(self.clone())
                } else {
                    None
                }
            }
            (PredicateContext::Format(a), PredicateContext::Format(b)) if Rc::ptr_eq(a, b) => {
                Some(self.clone())
            }
            _ => None,
        }
    }
}

impl PartialEq for PredicateContext {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PredicateContext::Settings(a), PredicateContext::Settings(b)) => Rc::ptr_eq(a, b),
            (PredicateContext::Format(a), PredicateContext::Format(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PredicateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateContext::Settings(group) => write!(f, "settings group {}", group.name()),
            PredicateContext::Format(format) => write!(f, "format {}", format.name()),
        }
    }
}

/// A predicate on a single instruction field, such as
/// `is_signed_int(BinaryImm.imm, 32)`.
#[derive(Debug)]
pub struct FieldPredicate {
    field: FormatField,
    function: String,
    args: Vec<String>,
}

impl FieldPredicate {
    pub fn field(&self) -> &FormatField {
        &self.field
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[derive(Debug)]
pub struct AndPredicate {
    parts: Vec<Predicate>,
    context: PredicateContext,
}

impl AndPredicate {
    pub fn parts(&self) -> &[Predicate] {
        &self.parts
    }
}

#[derive(Debug, Clone)]
pub enum Predicate {
    Setting(BoolSetting),
    Field(Rc<FieldPredicate>),
    And(Rc<AndPredicate>),
}

impl Predicate {
    pub fn field(field: FormatField, function: &str, args: &[&str]) -> Self {
        Predicate::Field(Rc::new(FieldPredicate {
            field,
            function: function.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }))
    }

    pub fn predicate_context(&self) -> PredicateContext {
        match self {
            Predicate::Setting(setting) => PredicateContext::Settings(setting.group().clone()),
            Predicate::Field(field) => PredicateContext::Format(field.field.format().clone()),
            Predicate::And(and) => and.context.clone(),
        }
    }

    /// Combine two optional predicates with a logical AND.
    ///
    /// A missing operand is treated as "always true".
    pub fn and(left: Option<Predicate>, right: Option<Predicate>) -> MetaResult<Option<Predicate>> {
        let (left, right) = match (left, right) {
            (None, other) | (other, None) => return Ok(other),
            (Some(left), Some(right)) => (left, right),
        };
        if left == right {
            return Ok(Some(left));
        }

        let context = left
            .predicate_context()
            .combine(&right.predicate_context())
            .ok_or_else(|| MetaError::IncompatiblePredicates {
                left: left.to_string(),
                right: right.to_string(),
            })?;

        // Flatten nested conjunctions.
        let mut parts = Vec::new();
        for p in [left, right] {
            match p {
                Predicate::And(and) => parts.extend(and.parts.iter().cloned()),
                leaf => parts.push(leaf),
            }
        }
        Ok(Some(Predicate::And(Rc::new(AndPredicate { parts, context }))))
    }

    /// The leaf predicates this predicate is built from, in order.
    pub fn leafs(&self) -> Vec<Predicate> {
        match self {
            Predicate::And(and) => and.parts.iter().flat_map(Predicate::leafs).collect(),
            leaf => vec![leaf.clone()],
        }
    }

    fn identity(&self) -> (usize, usize) {
        match self {
            Predicate::Setting(setting) => {
                (Rc::as_ptr(setting.group()) as *const () as usize, setting.index())
            }
            Predicate::Field(field) => (Rc::as_ptr(field) as *const () as usize, usize::MAX),
            Predicate::And(and) => (Rc::as_ptr(and) as *const () as usize, usize::MAX),
        }
    }
}

impl From<BoolSetting> for Predicate {
    fn from(setting: BoolSetting) -> Self {
        Predicate::Setting(setting)
    }
}

impl From<&BoolSetting> for Predicate {
    fn from(setting: &BoolSetting) -> Self {
        Predicate::Setting(setting.clone())
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.identity() == other.identity()
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        self.identity().hash(state);
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Setting(setting) => write!(f, "{}.{}", setting.group().name(), setting.name()),
            Predicate::Field(field) => {
                write!(f, "{}({}", field.function, field.field)?;
                for arg in &field.args {
                    write!(f, ", {}", arg)?;
                }
                f.write_str(")")
            }
            Predicate::And(and) => {
                for (i, part) in and.parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingGroupBuilder;

    #[test]
    fn test_and_is_null_safe() {
        let mut b = SettingGroupBuilder::new("shared", None);
        let float = b.bool_setting("enable_float", "", true).unwrap().predicate();

        assert_eq!(Predicate::and(None, None).unwrap(), None);
        assert_eq!(Predicate::and(Some(float.clone()), None).unwrap(), Some(float.clone()));
        assert_eq!(Predicate::and(None, Some(float.clone())).unwrap(), Some(float.clone()));
        assert_eq!(
            Predicate::and(Some(float.clone()), Some(float.clone())).unwrap(),
            Some(float)
        );
    }

    #[test]
    fn test_and_picks_deeper_group() {
        let mut shared = SettingGroupBuilder::new("shared", None);
        let simd = shared.bool_setting("enable_simd", "", true).unwrap();
        let mut isa = SettingGroupBuilder::new("x86", Some(shared.info().clone()));
        let sse = isa.bool_setting("has_sse41", "", false).unwrap();

        let both = Predicate::and(Some(simd.predicate()), Some(sse.predicate()))
            .unwrap()
            .unwrap();
        match both.predicate_context() {
            PredicateContext::Settings(group) => assert_eq!(group.name(), "x86"),
            other => panic!("unexpected context {}", other),
        }
        assert_eq!(both.to_string(), "shared.enable_simd & x86.has_sse41");
        assert_eq!(both.leafs().len(), 2);

        let other = SettingGroupBuilder::new("arm", None)
            .bool_setting("has_neon", "", false)
            .unwrap();
        let err = Predicate::and(Some(sse.predicate()), Some(other.predicate())).unwrap_err();
        assert_eq!(err.category(), "IncompatiblePredicates");
    }

    #[test]
    fn test_identity() {
        let mut b = SettingGroupBuilder::new("shared", None);
        let a = b.bool_setting("a", "", false).unwrap();
        let c = b.bool_setting("c", "", false).unwrap();
        assert_eq!(a.predicate(), Predicate::from(&a));
        assert_ne!(a.predicate(), c.predicate());

        let x = Predicate::and(Some(a.predicate()), Some(c.predicate())).unwrap();
        let y = Predicate::and(Some(a.predicate()), Some(c.predicate())).unwrap();
        assert_ne!(x, y);
        assert_eq!(x.clone(), x);
    }
}
