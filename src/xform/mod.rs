//! Instruction patterns and transformations.
//!
//! - [`ast`] - Pattern syntax: variables, applications, definitions
//! - [`rewrite`] - Symbol resolution for transformations and legalizations

pub mod ast;
pub mod rewrite;

pub use ast::{Apply, Def, Expr, Rtl, Var};
pub use rewrite::{XForm, XFormGroup, XFormVar, DSTCTX, SRCCTX};
