// This module implements XForm, a rewrite rule from a source RTL pattern to a
// destination RTL pattern, and XFormGroup, an ordered list of legalizations. Building an
// XForm resolves every variable name into a per-transformation symbol and records with a
// bitmask which patterns define it, rejecting variables that are defined twice in one
// pattern, used both as an input and a def, or read by the destination without appearing
// in the source. Legalizations additionally require a single source instruction whose
// results are all redefined by the destination.

//! Instruction transformations and legalization groups.
//!
//! An [`XForm`] pairs a source pattern with a destination pattern. All
//! variables in both patterns are resolved by name to symbols private to the
//! transformation, and each symbol records in which pattern it is defined.
//! Source statements are visited first, then destination statements; within
//! a statement the defined variables come before the expression, and
//! expression trees are walked depth-first in argument order.

use super::ast::{Apply, Def, Expr, Rtl, Var};
use crate::core::{MetaError, MetaResult};
use hashbrown::HashMap;
use std::fmt;

/// Defined in the source pattern.
pub const SRCCTX: u8 = 1;
/// Defined in the destination pattern.
pub const DSTCTX: u8 = 2;

/// A variable symbol local to one transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XFormVar {
    name: String,
    def_ctx: u8,
}

impl XFormVar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit mask of the patterns defining this variable.
    pub fn def_ctx(&self) -> u8 {
        self.def_ctx
    }

    /// Never defined, only read.
    pub fn is_input(&self) -> bool {
        self.def_ctx == 0
    }

    /// Defined in the destination pattern.
    pub fn is_output(&self) -> bool {
        self.def_ctx & DSTCTX != 0
    }
}

impl fmt::Display for XFormVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.def_ctx == 0 {
            write!(f, "Var({})", self.name)
        } else {
            write!(f, "Var({}, d={:02b})", self.name, self.def_ctx)
        }
    }
}

/// Symbol table built while resolving the variables of an XForm.
#[derive(Default)]
struct SymbolTable {
    vars: Vec<XFormVar>,
    by_name: HashMap<String, usize>,
    inputs: Vec<usize>,
    defs: Vec<usize>,
}

impl SymbolTable {
    fn rewrite_rtl(&mut self, rtl: &Rtl, context: u8) -> MetaResult<()> {
        for stmt in rtl.stmts() {
            for var in stmt.defs() {
                self.rewrite_def(var, context)?;
            }
            self.rewrite_expr(stmt.expr(), context)?;
        }
        Ok(())
    }

    fn rewrite_def(&mut self, var: &Var, context: u8) -> MetaResult<()> {
        let index = match self.by_name.get(var.name()) {
            Some(&index) => {
                if self.vars[index].def_ctx & context != 0 {
                    return Err(MetaError::MultiplyDefinedVariable {
                        name: var.name().to_string(),
                    });
                }
                index
            }
            None => {
                let index = self.insert(var);
                self.defs.push(index);
                index
            }
        };
        self.vars[index].def_ctx |= context;
        log::trace!("def {} ctx={:02b}", var, self.vars[index].def_ctx);
        Ok(())
    }

    fn rewrite_expr(&mut self, expr: &Apply, context: u8) -> MetaResult<()> {
        for arg in expr.args() {
            match arg {
                Expr::Apply(nested) => self.rewrite_expr(nested, context)?,
                Expr::Var(var) => self.rewrite_use(var, context)?,
                Expr::Imm(_) => {}
            }
        }
        Ok(())
    }

    fn rewrite_use(&mut self, var: &Var, context: u8) -> MetaResult<()> {
        match self.by_name.get(var.name()) {
            Some(&index) => {
                // A variable must be used consistently as a def or an input.
                let def_ctx = self.vars[index].def_ctx;
                if def_ctx != 0 && def_ctx & context == 0 {
                    return Err(MetaError::VariableRoleConflict {
                        name: var.name().to_string(),
                    });
                }
            }
            None => {
                let index = self.insert(var);
                self.inputs.push(index);
                log::trace!("input {}", var);
            }
        }
        Ok(())
    }

    fn insert(&mut self, var: &Var) -> usize {
        let index = self.vars.len();
        self.vars.push(XFormVar {
            name: var.name().to_string(),
            def_ctx: 0,
        });
        self.by_name.insert(var.name().to_string(), index);
        index
    }
}

/// An instruction transformation from a source pattern to a destination
/// pattern.
#[derive(Debug, Clone)]
pub struct XForm {
    src: Rtl,
    dst: Rtl,
    vars: Vec<XFormVar>,
    by_name: HashMap<String, usize>,
    inputs: Vec<usize>,
    defs: Vec<usize>,
}

impl XForm {
    pub fn new(src: Rtl, dst: Rtl) -> MetaResult<Self> {
        let mut symtab = SymbolTable::default();
        symtab.rewrite_rtl(&src, SRCCTX)?;
        let num_src_inputs = symtab.inputs.len();
        symtab.rewrite_rtl(&dst, DSTCTX)?;

        // Inputs that were defined later on.
        for &index in &symtab.inputs {
            let var = &symtab.vars[index];
            if !var.is_input() {
                return Err(MetaError::VariableRoleConflict {
                    name: var.name.clone(),
                });
            }
        }

        if symtab.inputs.len() > num_src_inputs {
            let extra: Vec<&str> = symtab.inputs[num_src_inputs..]
                .iter()
                .map(|&index| symtab.vars[index].name())
                .collect();
            return Err(MetaError::ExtraDestinationInput {
                names: extra.join(", "),
            });
        }

        Ok(Self {
            src,
            dst,
            vars: symtab.vars,
            by_name: symtab.by_name,
            inputs: symtab.inputs,
            defs: symtab.defs,
        })
    }

    pub fn src(&self) -> &Rtl {
        &self.src
    }

    pub fn dst(&self) -> &Rtl {
        &self.dst
    }

    /// Variables read but never defined, in first-occurrence order.
    pub fn inputs(&self) -> impl Iterator<Item = &XFormVar> + '_ {
        self.inputs.iter().map(move |&index| &self.vars[index])
    }

    /// Variables defined in either pattern, in first-definition order.
    pub fn defs(&self) -> impl Iterator<Item = &XFormVar> + '_ {
        self.defs.iter().map(move |&index| &self.vars[index])
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs().map(XFormVar::name).collect()
    }

    pub fn def_names(&self) -> Vec<&str> {
        self.defs().map(XFormVar::name).collect()
    }

    pub fn var(&self, name: &str) -> Option<&XFormVar> {
        self.by_name.get(name).map(|&index| &self.vars[index])
    }

    /// Verify that this is a valid legalization.
    ///
    /// The source pattern must describe a single instruction, and every value
    /// it defines must also be defined by the destination pattern.
    pub fn verify_legalize(&self) -> MetaResult<()> {
        let stmt = match self.src.stmts() {
            [stmt] => stmt,
            stmts => {
                return Err(MetaError::LegalizationArityViolation { count: stmts.len() });
            }
        };
        for def in stmt.defs() {
            let defined = self.var(def.name()).is_some_and(XFormVar::is_output);
            if !defined {
                return Err(MetaError::UndefinedLegalizationOutput {
                    name: def.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for XForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<String> = self.inputs().map(|v| v.to_string()).collect();
        let defs: Vec<String> = self.defs().map(|v| v.to_string()).collect();
        write!(f, "XForm(inputs=[{}], defs=[{}],", inputs.join(", "), defs.join(", "))?;
        for stmt in self.src.stmts() {
            write!(f, "\n  {}", stmt)?;
        }
        f.write_str("\n=>")?;
        for stmt in self.dst.stmts() {
            write!(f, "\n  {}", stmt)?;
        }
        f.write_str("\n)")
    }
}

/// A named, ordered group of related transformations.
#[derive(Debug, Clone)]
pub struct XFormGroup {
    name: String,
    doc: String,
    xforms: Vec<XForm>,
}

impl XFormGroup {
    pub fn new(name: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: doc.to_string(),
            xforms: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Add a legalization pattern replacing the single instruction `src`
    /// with the `dst` sequence.
    pub fn legalize(&mut self, src: impl Into<Def>, dst: Rtl) -> MetaResult<()> {
        let xform = XForm::new(Rtl::from(src.into()), dst)?;
        xform.verify_legalize()?;
        log::debug!(
            "{}: legalize {} ({} inputs)",
            self.name,
            xform.src.stmts()[0],
            xform.inputs.len()
        );
        self.xforms.push(xform);
        Ok(())
    }

    /// Transformations in declaration order.
    pub fn xforms(&self) -> &[XForm] {
        &self.xforms
    }

    pub fn len(&self) -> usize {
        self.xforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xforms.is_empty()
    }
}
