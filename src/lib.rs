//! Codegen meta - declarative description of a code generator's instruction set.
//!
//! This crate models the information a code generator needs about its
//! instructions and targets, and validates it as it is declared: value types,
//! operand kinds, instruction formats, polymorphic instructions, target
//! settings with a packed byte layout, per-ISA encodings, and legalization
//! patterns. An emission stage walks the finished object graph to produce
//! generated tables.
//!
//! # Primary Usage
//!
//! ```ignore
//! use codegen_meta::core::Catalog;
//! use codegen_meta::ir::{FormatBuilder, InstructionBuilder, Operand, TypeVar};
//!
//! let mut catalog = Catalog::new();
//! let i32 = catalog.types_mut().int(32)?;
//! catalog.formats_mut().insert(FormatBuilder::new("Binary").value(2))?;
//!
//! let int = TypeVar::new("Int", "A scalar integer type");
//! let x = Operand::new("x", &int);
//! let y = Operand::new("y", &int);
//! let a = Operand::new("a", &int);
//!
//! let mut base = catalog.open_instructions("base", "Shared base instruction set")?;
//! let iadd = catalog.define_instruction(
//!     &mut base,
//!     InstructionBuilder::new("iadd", "Wrapping integer addition: a := x + y")
//!         .operands_in(vec![x, y])
//!         .operands_out(a),
//! )?;
//! catalog.close_instructions(base)?;
//!
//! let bound = iadd.bind(i32)?;
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Errors and the declaration [`Catalog`](core::Catalog)
//! - [`ir`] - Types, type variables, operands, formats and instructions
//! - [`predicates`] - Predicates over settings and instruction fields
//! - [`settings`] - Setting groups and their byte layout
//! - [`isa`] - Target ISAs, encoding recipes and encodings
//! - [`xform`] - Patterns, transformations and legalizations

pub mod core;
pub mod ir;
pub mod isa;
pub mod predicates;
pub mod settings;
pub mod xform;

// Re-export common types from organized modules
pub use core::{Catalog, CatalogStats, MetaError, MetaResult};
pub use ir::{
    BoundInstruction, FormatBuilder, InstSpec, Instruction, InstructionBuilder, InstructionFormat,
    InstructionGroup, Operand, OperandKind, TypeVar, ValueType,
};
pub use isa::{CpuMode, EncRecipe, Encoding, TargetIsa};
pub use predicates::Predicate;
pub use settings::{SettingGroup, SettingGroupBuilder};
pub use xform::{Apply, Def, Expr, Rtl, Var, XForm, XFormGroup};
