//! Pattern syntax: variables, instruction applications and definitions.

use crate::core::{MetaError, MetaResult};
use crate::ir::InstSpec;
use std::fmt;

/// A symbolic value in a pattern, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    name: String,
}

impl Var {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `self << expr`: define this variable as the result of `expr`.
    pub fn def(&self, expr: Apply) -> Def {
        Def::new(vec![self.clone()], expr)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An argument of an [`Apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(Var),
    Apply(Box<Apply>),
    /// Literal immediate, kept as source text.
    Imm(String),
}

impl Expr {
    pub fn imm(text: &str) -> Self {
        Expr::Imm(text.to_string())
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Expr::Var(var)
    }
}

impl From<&Var> for Expr {
    fn from(var: &Var) -> Self {
        Expr::Var(var.clone())
    }
}

impl From<Apply> for Expr {
    fn from(apply: Apply) -> Self {
        Expr::Apply(Box::new(apply))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(var) => fmt::Display::fmt(var, f),
            Expr::Apply(apply) => fmt::Display::fmt(apply, f),
            Expr::Imm(text) => f.write_str(text),
        }
    }
}

/// Application of an instruction to arguments, one per input operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apply {
    inst: InstSpec,
    args: Vec<Expr>,
}

impl Apply {
    pub fn new(inst: InstSpec, args: Vec<Expr>) -> MetaResult<Self> {
        let ins = inst.inst().ins();
        if ins.len() != args.len() {
            return Err(MetaError::ApplyArity {
                inst: inst.to_string(),
                expected: ins.len(),
                given: args.len(),
            });
        }
        for (arg, operand) in args.iter().zip(ins) {
            if operand.is_value() && matches!(arg, Expr::Imm(_)) {
                return Err(MetaError::InvalidApplyArgument {
                    inst: inst.to_string(),
                    operand: operand.to_string(),
                });
            }
        }
        Ok(Self { inst, args })
    }

    pub fn inst(&self) -> &InstSpec {
        &self.inst
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }
}

impl fmt::Display for Apply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.inst)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// Assignment of the results of an [`Apply`] to zero or more variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Def {
    defs: Vec<Var>,
    expr: Apply,
}

impl Def {
    pub fn new(defs: Vec<Var>, expr: Apply) -> Self {
        Self { defs, expr }
    }

    pub fn defs(&self) -> &[Var] {
        &self.defs
    }

    pub fn expr(&self) -> &Apply {
        &self.expr
    }
}

/// A bare application is a definition with no results.
impl From<Apply> for Def {
    fn from(expr: Apply) -> Self {
        Def::new(Vec::new(), expr)
    }
}

impl fmt::Display for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.defs.is_empty() {
            let names: Vec<&str> = self.defs.iter().map(Var::name).collect();
            write!(f, "{} << ", names.join(", "))?;
        }
        write!(f, "{}", self.expr)
    }
}

/// Register transfer language list.
///
/// An ordered list of definitions that can describe either a source pattern
/// to be matched or a destination pattern to be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rtl {
    stmts: Vec<Def>,
}

impl Rtl {
    pub fn new(stmts: Vec<Def>) -> Self {
        Self { stmts }
    }

    pub fn stmts(&self) -> &[Def] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

impl From<Def> for Rtl {
    fn from(def: Def) -> Self {
        Rtl::new(vec![def])
    }
}

impl FromIterator<Def> for Rtl {
    fn from_iter<I: IntoIterator<Item = Def>>(iter: I) -> Self {
        Rtl::new(iter.into_iter().collect())
    }
}
