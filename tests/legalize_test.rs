//! Transformations and legalization patterns.

mod common;

use codegen_meta::ir::Instruction;
use codegen_meta::xform::{Apply, Def, Expr, Rtl, Var, XForm, XFormGroup, DSTCTX, SRCCTX};

fn apply(inst: &Instruction, args: &[&Var]) -> Apply {
    inst.apply(args.iter().map(|v| Expr::from(*v)).collect()).unwrap()
}

#[test]
fn test_fold_constant_into_immediate() {
    let b = common::base();
    let (a, c, v, x) = (Var::new("a"), Var::new("c"), Var::new("v"), Var::new("x"));

    let src = Rtl::new(vec![
        c.def(apply(&b.iconst, &[&v])),
        a.def(apply(&b.iadd, &[&x, &c])),
    ]);
    let dst = Rtl::from(a.def(apply(&b.iadd_imm, &[&x, &v])));
    let xform = XForm::new(src, dst).unwrap();

    assert_eq!(xform.input_names(), vec!["v", "x"]);
    assert_eq!(xform.def_names(), vec!["c", "a"]);
    assert_eq!(xform.var("c").unwrap().def_ctx(), SRCCTX);
    assert_eq!(xform.var("a").unwrap().def_ctx(), SRCCTX | DSTCTX);
    assert!(xform.var("a").unwrap().is_output());
    assert!(!xform.var("c").unwrap().is_output());
    assert!(xform.var("v").unwrap().is_input());

    // A legalization matches a single instruction.
    let err = xform.verify_legalize().unwrap_err();
    assert_eq!(err.category(), "LegalizationArityViolation");
}

#[test]
fn test_expand_immediate_add() {
    let b = common::base();
    let (a, c, v, x) = (Var::new("a"), Var::new("c"), Var::new("v"), Var::new("x"));

    let mut group = XFormGroup::new("expand", "Expand instructions with immediates.");
    group
        .legalize(
            a.def(apply(&b.iadd_imm, &[&x, &v])),
            Rtl::new(vec![
                c.def(apply(&b.iconst, &[&v])),
                a.def(apply(&b.iadd, &[&x, &c])),
            ]),
        )
        .unwrap();

    assert_eq!(group.len(), 1);
    let xform = &group.xforms()[0];
    assert_eq!(xform.input_names(), vec!["x", "v"]);
    assert_eq!(xform.def_names(), vec!["a", "c"]);
    assert_eq!(xform.var("c").unwrap().to_string(), "Var(c, d=10)");
    assert_eq!(xform.var("x").unwrap().to_string(), "Var(x)");
    assert_eq!(xform.src().stmts()[0].to_string(), "a << iadd_imm(x, v)");
    assert_eq!(xform.dst().stmts()[1].to_string(), "a << iadd(x, c)");
}

#[test]
fn test_destination_must_define_results() {
    let b = common::base();
    let (a, c, v, x) = (Var::new("a"), Var::new("c"), Var::new("v"), Var::new("x"));

    let mut group = XFormGroup::new("expand", "");
    let err = group
        .legalize(
            a.def(apply(&b.iadd_imm, &[&x, &v])),
            Rtl::new(vec![
                c.def(apply(&b.iconst, &[&v])),
                Def::from(apply(&b.iadd, &[&x, &c])),
            ]),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "a not defined in dest pattern");
    assert!(group.is_empty());
}

#[test]
fn test_variable_role_errors() {
    let b = common::base();
    let (a, c, x, y) = (Var::new("a"), Var::new("c"), Var::new("x"), Var::new("y"));

    // Defined twice in the same pattern.
    let src = Rtl::new(vec![
        a.def(apply(&b.iadd, &[&x, &y])),
        a.def(apply(&b.isub, &[&x, &y])),
    ]);
    let err = XForm::new(src, Rtl::default()).unwrap_err();
    assert_eq!(err.category(), "MultiplyDefinedVariable");

    // Source input redefined by the destination.
    let src = Rtl::from(a.def(apply(&b.iadd, &[&x, &y])));
    let dst = Rtl::new(vec![
        x.def(apply(&b.isub, &[&y, &y])),
        a.def(apply(&b.iadd, &[&x, &y])),
    ]);
    let err = XForm::new(src, dst).unwrap_err();
    assert_eq!(err.category(), "VariableRoleConflict");

    // Source-only def read by the destination.
    let src = Rtl::new(vec![
        c.def(apply(&b.isub, &[&x, &y])),
        a.def(apply(&b.iadd, &[&x, &c])),
    ]);
    let dst = Rtl::from(a.def(apply(&b.iadd, &[&c, &y])));
    let err = XForm::new(src, dst).unwrap_err();
    assert_eq!(err, codegen_meta::MetaError::VariableRoleConflict { name: "c".to_string() });

    // New input in the destination.
    let src = Rtl::from(a.def(apply(&b.iadd, &[&x, &x])));
    let dst = Rtl::from(a.def(apply(&b.iadd, &[&x, &y])));
    let err = XForm::new(src, dst).unwrap_err();
    assert_eq!(err.to_string(), "extra inputs in dst RTL: y");
}

#[test]
fn test_nested_and_bound_applications() {
    let b = common::base();
    let (a, x, y, z) = (Var::new("a"), Var::new("x"), Var::new("y"), Var::new("z"));
    let i32 = b.catalog.types().by_name("i32").unwrap();

    let inner = apply(&b.iadd, &[&y, &z]);
    let outer = b
        .iadd
        .bind(i32)
        .unwrap()
        .apply(vec![Expr::from(&x), Expr::from(inner)])
        .unwrap();
    assert_eq!(outer.to_string(), "iadd.i32(x, iadd(y, z))");

    let src = Rtl::from(a.def(outer));
    let dst = Rtl::from(a.def(apply(&b.isub, &[&x, &y])));
    let xform = XForm::new(src, dst).unwrap();
    assert_eq!(xform.input_names(), vec!["x", "y", "z"]);

    let err = b.iadd.apply(vec![Expr::from(&x)]).unwrap_err();
    assert_eq!(err.category(), "ApplyArity");
    let err = b.iadd.apply(vec![Expr::from(&x), Expr::imm("1")]).unwrap_err();
    assert_eq!(err.category(), "InvalidApplyArgument");
    let imm = b.iadd_imm.apply(vec![Expr::from(&x), Expr::imm("1")]).unwrap();
    assert_eq!(imm.to_string(), "iadd_imm(x, 1)");
}
