//! Types, formats and instruction polymorphism through a catalog.

mod common;

use codegen_meta::ir::{FormatBuilder, InstSpec, InstructionBuilder, Operand, TypeVar};

#[test]
fn test_scalar_numbers() {
    let b = common::base();
    let numbers: Vec<(String, u8)> = b
        .catalog
        .types()
        .all_scalars()
        .iter()
        .map(|s| (s.name().to_string(), s.number()))
        .collect();
    let expected = ["b1", "i8", "i16", "i32", "i64", "f32", "f64"];
    assert_eq!(numbers.len(), expected.len());
    for (i, (name, number)) in numbers.iter().enumerate() {
        assert_eq!(name, expected[i]);
        assert_eq!(*number as usize, i + 1);
    }
}

#[test]
fn test_vector_types_are_stable() {
    let mut b = common::base();
    let types = b.catalog.types_mut();
    let i32 = types.by_name("i32").unwrap();
    let v1 = types.vector(&i32, 4).unwrap();
    let v2 = types.vector(&i32, 4).unwrap();
    assert_eq!(v1, v2);
    assert_eq!(v1.name(), "i32x4");
    assert_eq!(v1.number(), 16 * 2 + i32.number());
    assert_eq!(v1.membytes(), 16);
    assert_eq!(types.by_name("i32x4").unwrap(), v1);

    assert_eq!(types.vector(&i32, 3).unwrap_err().category(), "InvalidLaneCount");
    assert_eq!(types.vector(&v1, 2).unwrap_err().category(), "InvalidType");
}

#[test]
fn test_duplicate_format_signature() {
    let mut b = common::base();
    let err = b
        .catalog
        .formats_mut()
        .insert(FormatBuilder::new("Binary2").value(2))
        .unwrap_err();
    assert_eq!(err.category(), "DuplicateFormatSignature");

    // The same kinds with multiple results is a different signature.
    b.catalog
        .formats_mut()
        .insert(FormatBuilder::new("BinaryOverflow").value(2).multiple_results())
        .unwrap();
}

#[test]
fn test_same_free_typevar_in_and_out() {
    let mut b = common::base();
    let tv = TypeVar::new("TV", "");
    let mut group = b.catalog.open_instructions("extra", "").unwrap();
    let ineg = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("ineg", "Integer negation.")
                .operands_in(Operand::new("x", &tv))
                .operands_out(Operand::new("a", &tv)),
        )
        .unwrap();
    b.catalog.close_instructions(group).unwrap();

    assert!(ineg.is_polymorphic());
    assert_eq!(ineg.ctrl_typevar(), Some(&tv));
    assert!(ineg.other_typevars().is_empty());
    assert_eq!(ineg.format().name(), "Unary");
}

#[test]
fn test_duplicate_instruction_and_missing_format() {
    let mut b = common::base();
    let mut group = b.catalog.open_instructions("extra", "").unwrap();
    let err = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("iadd", "")
                .operands_in(vec![Operand::new("x", &b.int), Operand::new("y", &b.int)])
                .operands_out(Operand::new("a", &b.int)),
        )
        .unwrap_err();
    assert_eq!(err.category(), "DuplicateInstruction");

    let err = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("fma", "")
                .operands_in(vec![
                    Operand::new("x", &b.int),
                    Operand::new("y", &b.int),
                    Operand::new("z", &b.int),
                ])
                .operands_out(Operand::new("a", &b.int)),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "No instruction format matches ins = (value, value, value)");
}

#[test]
fn test_bind_chain_matches_bind_all() {
    let mut b = common::base();
    let ctrl = TypeVar::new("T", "");
    let sel = TypeVar::new("Sel", "");
    b.catalog
        .formats_mut()
        .insert(FormatBuilder::new("Ternary").value(3).typevar_operand(1))
        .unwrap();
    let mut group = b.catalog.open_instructions("extra", "").unwrap();
    let select = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("select", "Conditional select.")
                .operands_in(vec![
                    Operand::new("c", &sel),
                    Operand::new("x", &ctrl),
                    Operand::new("y", &ctrl),
                ])
                .operands_out(Operand::new("a", &ctrl)),
        )
        .unwrap();
    b.catalog.close_instructions(group).unwrap();

    let types = b.catalog.types();
    let i32 = types.by_name("i32").unwrap();
    let b1 = types.by_name("b1").unwrap();

    let chained = select.bind(i32.clone()).unwrap().bind(b1.clone()).unwrap();
    let direct = select.bind_all(vec![i32.clone(), b1.clone()]).unwrap();
    assert_eq!(chained, direct);
    assert_eq!(chained.types(), &[i32.clone(), b1.clone()]);
    assert_eq!(chained.to_string(), "select.i32.b1");

    let by_name = select.bind_type(types, "i32").unwrap().bind_type(types, "b1").unwrap();
    assert_eq!(by_name, chained);

    let partial = select.bind(i32).unwrap();
    let err = InstSpec::from(&partial).fully_bound().unwrap_err();
    assert_eq!(err.to_string(), "Unbound typevar Sel in select.i32");

    let err = chained.bind(b1).unwrap_err();
    assert_eq!(err.category(), "TooManyTypeArguments");

    let err = select.bind_type(types, "i128").unwrap_err();
    assert_eq!(err.category(), "UnknownTypeName");
}

#[test]
fn test_polymorphic_must_be_bound() {
    let b = common::base();
    let err = InstSpec::from(&b.iconst).fully_bound().unwrap_err();
    assert_eq!(err.to_string(), "Unbound typevar Int in iconst");

    let i64 = b.catalog.types().by_name("i64").unwrap();
    let (inst, types) = InstSpec::from(b.iconst.bind(i64.clone()).unwrap())
        .fully_bound()
        .unwrap();
    assert_eq!(inst, b.iconst);
    assert_eq!(types, vec![i64]);
    assert_eq!(b.group.instructions().len(), 4);
    assert_eq!(b.group.by_name("iadd_imm"), Some(&b.iadd_imm));
}

#[test]
fn test_conversion_controlled_by_result() {
    let mut b = common::base();
    let int = b.int.clone();
    let int_to = TypeVar::new("IntTo", "A larger integer type");

    let mut group = b.catalog.open_instructions("conversions", "").unwrap();
    let uextend = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("uextend", "Convert `x` to a larger integer type.")
                .operands_in(Operand::new("x", &int))
                .operands_out(Operand::new("a", &int_to)),
        )
        .unwrap();
    b.catalog.close_instructions(group).unwrap();

    assert_eq!(uextend.format().name(), "Unary");
    assert_eq!(uextend.ctrl_typevar(), Some(&int_to));
    assert_eq!(uextend.other_typevars(), &[int]);
    assert!(!uextend.polymorphism().unwrap().use_typevar_operand);
}

#[test]
fn test_unrelated_outputs_fail_either_way() {
    let mut b = common::base();
    let int = b.int.clone();
    let other = TypeVar::new("U", "");
    b.catalog
        .formats_mut()
        .insert(FormatBuilder::new("BinaryOverflow").value(2).multiple_results())
        .unwrap();

    let mut group = b.catalog.open_instructions("overflow", "").unwrap();
    let err = b
        .catalog
        .define_instruction(
            &mut group,
            InstructionBuilder::new("iadd_cout", "")
                .operands_in(vec![Operand::new("x", &int), Operand::new("y", &int)])
                .operands_out(vec![Operand::new("a", &int), Operand::new("c", &other)]),
        )
        .unwrap_err();
    assert_eq!(err.category(), "OutputTypevarMismatch");
}
