//! Instruction description model.
//!
//! - [`types`] - Concrete scalar and vector value types
//! - [`typevar`] - Type variables for polymorphic instructions
//! - [`operands`] - Operand kinds and instruction operands
//! - [`formats`] - Structurally identified instruction formats
//! - [`instructions`] - Instructions, polymorphism checks and binding

pub mod formats;
pub mod instructions;
pub mod operands;
pub mod types;
pub mod typevar;

pub use formats::{FormatBuilder, FormatField, FormatRegistry, InstructionFormat};
pub use instructions::{
    BoundInstruction, InstSpec, Instruction, InstructionBuilder, InstructionGroup,
    InstructionGroupBuilder, IntoOperands, Polymorphism,
};
pub use operands::{Operand, OperandKind, OperandKindRegistry, OperandType};
pub use types::{ScalarKind, ScalarType, TypeRegistry, ValueType, VectorType};
pub use typevar::{DerivedFunc, TypeVar};

/// Convert a snake_case name to CamelCase.
///
/// Only a lowercase ASCII letter at the start or after an underscore is
/// capitalized; the underscore is dropped in that case.
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut at_start = true;

    while let Some(c) = chars.next() {
        if at_start && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
        } else if c == '_' && chars.peek().is_some_and(|n| n.is_ascii_lowercase()) {
            if let Some(n) = chars.next() {
                out.push(n.to_ascii_uppercase());
            }
        } else {
            out.push(c);
        }
        at_start = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::camel_case;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("iadd"), "Iadd");
        assert_eq!(camel_case("iadd_imm"), "IaddImm");
        assert_eq!(camel_case("variable_args"), "VariableArgs");
        assert_eq!(camel_case("imm64"), "Imm64");
        assert_eq!(camel_case("x_1"), "X_1");
    }
}
