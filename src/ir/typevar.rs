//! Type variables for polymorphic instructions.
//!
//! A [`TypeVar`] is either a free variable or a type derived from another
//! variable through a fixed function (lane type, same-width boolean, half or
//! double width). Handles compare by identity.

use std::fmt;
use std::rc::Rc;

/// Function deriving one type variable from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedFunc {
    LaneOf,
    AsBool,
    HalfWidth,
    DoubleWidth,
}

impl DerivedFunc {
    pub fn name(self) -> &'static str {
        match self {
            DerivedFunc::LaneOf => "lane_of",
            DerivedFunc::AsBool => "as_bool",
            DerivedFunc::HalfWidth => "half_width",
            DerivedFunc::DoubleWidth => "double_width",
        }
    }
}

#[derive(Debug)]
struct TypeVarData {
    name: String,
    doc: String,
    derived: Option<(TypeVar, DerivedFunc)>,
}

#[derive(Debug, Clone)]
pub struct TypeVar(Rc<TypeVarData>);

impl TypeVar {
    /// Create a new free type variable.
    pub fn new(name: &str, doc: &str) -> Self {
        Self(Rc::new(TypeVarData {
            name: name.to_string(),
            doc: doc.to_string(),
            derived: None,
        }))
    }

    fn derive(&self, func: DerivedFunc) -> Self {
        Self(Rc::new(TypeVarData {
            name: format!("{}({})", func.name(), self.name()),
            doc: String::new(),
            derived: Some((self.clone(), func)),
        }))
    }

    pub fn lane_of(&self) -> Self {
        self.derive(DerivedFunc::LaneOf)
    }

    pub fn as_bool(&self) -> Self {
        self.derive(DerivedFunc::AsBool)
    }

    pub fn half_width(&self) -> Self {
        self.derive(DerivedFunc::HalfWidth)
    }

    pub fn double_width(&self) -> Self {
        self.derive(DerivedFunc::DoubleWidth)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn doc(&self) -> &str {
        &self.0.doc
    }

    /// The variable and function this one is derived from, if any.
    pub fn derived_from(&self) -> Option<(&TypeVar, DerivedFunc)> {
        self.0.derived.as_ref().map(|(tv, func)| (tv, *func))
    }

    pub fn is_free(&self) -> bool {
        self.0.derived.is_none()
    }

    /// The free type variable controlling this one.
    pub fn free_typevar(&self) -> TypeVar {
        match &self.0.derived {
            Some((base, _)) => base.free_typevar(),
            None => self.clone(),
        }
    }
}

impl PartialEq for TypeVar {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeVar {}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_typevar() {
        let tv = TypeVar::new("T", "A scalar or vector integer type");
        assert!(tv.is_free());
        assert_eq!(tv.free_typevar(), tv);

        let lane = tv.as_bool().lane_of();
        assert!(!lane.is_free());
        assert_eq!(lane.free_typevar(), tv);
        assert_ne!(lane, tv);
        assert_eq!(lane.name(), "lane_of(as_bool(T))");
    }

    #[test]
    fn test_identity() {
        let a = TypeVar::new("T", "");
        let b = TypeVar::new("T", "");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
