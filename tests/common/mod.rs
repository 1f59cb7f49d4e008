//! Shared fixture for integration tests.
//!
//! Builds a small catalog with the base integer types, a 64-bit immediate
//! kind, the common formats and a few base instructions.

#![allow(dead_code)]

use codegen_meta::core::Catalog;
use codegen_meta::ir::{
    FormatBuilder, Instruction, InstructionBuilder, InstructionGroup, Operand, OperandKind,
    TypeVar,
};
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Base {
    pub catalog: Catalog,
    pub group: Rc<InstructionGroup>,
    pub imm64: OperandKind,
    pub int: TypeVar,
    pub iconst: Instruction,
    pub iadd: Instruction,
    pub iadd_imm: Instruction,
    pub isub: Instruction,
}

pub fn base() -> Base {
    init_logging();

    let mut catalog = Catalog::new();
    let types = catalog.types_mut();
    types.bool(1).unwrap();
    for bits in [8, 16, 32, 64] {
        types.int(bits).unwrap();
    }
    types.float(32, "IEEE single precision").unwrap();
    types.float(64, "IEEE double precision").unwrap();

    let imm64 = catalog
        .kinds_mut()
        .immediate("imm64", "A 64-bit immediate integer.", None)
        .unwrap();

    let formats = catalog.formats_mut();
    formats.insert(FormatBuilder::new("Unary").value(1)).unwrap();
    formats.insert(FormatBuilder::new("UnaryImm").kind(&imm64)).unwrap();
    formats.insert(FormatBuilder::new("Binary").value(2)).unwrap();
    formats
        .insert(FormatBuilder::new("BinaryImm").value(1).kind(&imm64))
        .unwrap();

    let int = TypeVar::new("Int", "A scalar or vector integer type");
    let x = Operand::new("x", &int);
    let y = Operand::new("y", &int);
    let a = Operand::new("a", &int);
    let n = Operand::new("N", &imm64);

    let mut group = catalog.open_instructions("base", "Shared base instruction set").unwrap();
    let iconst = catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("iconst", "Integer constant.")
                .operands_in(n.clone())
                .operands_out(a.clone()),
        )
        .unwrap();
    let iadd = catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("iadd", "Wrapping integer addition: a := x + y")
                .operands_in(vec![x.clone(), y.clone()])
                .operands_out(a.clone()),
        )
        .unwrap();
    let iadd_imm = catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("iadd_imm", "Add immediate integer.")
                .operands_in(vec![x.clone(), n])
                .operands_out(a.clone()),
        )
        .unwrap();
    let isub = catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("isub", "Wrapping integer subtraction: a := x - y")
                .operands_in(vec![x, y])
                .operands_out(a),
        )
        .unwrap();
    let group = catalog.close_instructions(group).unwrap();

    Base {
        catalog,
        group,
        imm64,
        int,
        iconst,
        iadd,
        iadd_imm,
        isub,
    }
}
