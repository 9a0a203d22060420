use anyhow::Result;

use super::common::*;
use cppl_ast::BinaryOp;
use cpplc::diagnostics::ErrorKind;
use inkwell::context::Context;
use inkwell::values::InstructionOpcode;

fn pick() -> Vec<cppl_ast::Item> {
    vec![func(
        "pick",
        &[("c", "bool")],
        "i32",
        vec![expr(if_else(var("c"), vec![expr(int(1))], vec![expr(int(2))]))],
    )]
}

/// `(constant, incoming block name)` pairs of a phi.
fn incoming(phi: inkwell::values::PhiValue<'_>) -> Vec<(Option<u64>, String)> {
    (0..phi.count_incoming())
        .filter_map(|i| phi.get_incoming(i))
        .map(|(value, block)| {
            let constant = value
                .into_int_value()
                .get_zero_extended_constant();
            (constant, block_name(block))
        })
        .collect()
}

#[test]
fn if_else_joins_with_a_phi() -> Result<()> {
    let context = Context::create();
    let module = compile(&context, pick())?;
    assert_eq!(block_names(&module, "pick"), ["entry", "then", "alt", "join"]);

    let f = function(&module, "pick");
    let phis = phis(f);
    assert_eq!(phis.len(), 1);
    assert_eq!(phis[0].get_name().to_str(), Ok("if"));
    assert_eq!(
        phis[0].as_instruction().get_parent().map(block_name).as_deref(),
        Some("join")
    );
    assert_eq!(
        incoming(phis[0]),
        vec![(Some(1), "then".to_string()), (Some(2), "alt".to_string())]
    );
    let entry = block_named(f, "entry");
    assert_eq!(
        entry.get_terminator().map(|t| t.get_opcode()),
        Some(InstructionOpcode::Br)
    );
    assert_eq!(successors(entry).len(), 2);
    Ok(())
}

#[test]
fn if_else_textual_ir() -> Result<()> {
    let ir = gen_ir(pick())?;
    assert!(ir.contains(", label %then, label %alt"), "{}", ir);
    assert!(ir.contains("  %if = phi i32 [ 1, %then ], [ 2, %alt ]"), "{}", ir);
    assert!(ir.contains("  ret i32 %if"), "{}", ir);
    Ok(())
}

#[test]
fn else_if_chain_nests_joins() -> Result<()> {
    let context = Context::create();
    let module = compile(
        &context,
        vec![func(
            "grade",
            &[("a", "bool"), ("b", "bool")],
            "i32",
            vec![expr(if_chain(vec![
                branch(var("a"), vec![expr(int(1))]),
                branch(var("b"), vec![expr(int(2))]),
                otherwise(vec![expr(int(3))]),
            ]))],
        )],
    )?;
    let names = block_names(&module, "grade");
    assert_eq!(names.len(), 7);
    assert_eq!(names[..4], ["entry", "then", "alt", "join"]);
    assert!(names[4].starts_with("then"), "{:?}", names);
    assert!(names[5].starts_with("alt"), "{:?}", names);
    assert!(names[6].starts_with("join"), "{:?}", names);

    // The inner phi merges 2 and 3; the outer one merges 1 with the inner.
    let f = function(&module, "grade");
    let phis = phis(f);
    assert_eq!(phis.len(), 2);
    let outer = phis
        .iter()
        .find(|p| p.as_instruction().get_parent().map(block_name).as_deref() == Some("join"))
        .expect("outer join has a phi");
    let from: Vec<String> = incoming(*outer).into_iter().map(|(_, b)| b).collect();
    assert_eq!(from, vec!["then".to_string(), names[6].clone()]);
    Ok(())
}

#[test]
fn diverging_arm_adds_no_incoming_edge() -> Result<()> {
    let context = Context::create();
    let module = compile(
        &context,
        vec![func(
            "clamp",
            &[("c", "bool")],
            "i32",
            vec![expr(if_else(var("c"), vec![ret(int(0))], vec![expr(int(5))]))],
        )],
    )?;
    let f = function(&module, "clamp");
    let phis = phis(f);
    assert_eq!(phis.len(), 1);
    assert_eq!(incoming(phis[0]), vec![(Some(5), "alt".to_string())]);
    assert_eq!(predecessors(f, block_named(f, "join")), ["alt"]);
    Ok(())
}

#[test]
fn all_arms_diverging_leaves_join_unreachable() -> Result<()> {
    let context = Context::create();
    let module = compile(
        &context,
        vec![func(
            "sign",
            &[("c", "bool")],
            "i32",
            vec![expr(if_else(var("c"), vec![ret(int(1))], vec![ret(int(2))]))],
        )],
    )?;
    let f = function(&module, "sign");
    let join = block_named(f, "join");
    assert_eq!(
        join.get_terminator().map(|t| t.get_opcode()),
        Some(InstructionOpcode::Unreachable)
    );
    assert!(phis(f).is_empty());
    Ok(())
}

#[test]
fn diverging_initializer_still_binds_the_name() -> Result<()> {
    let ir = gen_ir(vec![func(
        "pick",
        &[("c", "bool")],
        "i32",
        vec![
            let_(
                "x",
                "i32",
                if_else(var("c"), vec![ret(int(1))], vec![ret(int(2))]),
            ),
            ret(var("x")),
        ],
    )])?;
    assert!(ir.contains("  ret i32 1"), "{}", ir);
    assert!(ir.contains("  ret i32 2"), "{}", ir);
    assert!(ir.contains("  unreachable"), "{}", ir);
    assert!(ir.contains("dead:"), "{}", ir);
    // The slot for `x` is never written.
    assert!(!ir.contains("store i32"), "{}", ir);
    Ok(())
}

#[test]
fn diverging_call_argument_stops_the_call() -> Result<()> {
    let ir = gen_ir(vec![
        ffi("sink", &[("n", "i32")], "void"),
        func(
            "feed",
            &[("c", "bool")],
            "i32",
            vec![
                expr(call(
                    "sink",
                    vec![if_else(var("c"), vec![ret(int(1))], vec![ret(int(2))])],
                )),
                expr(int(0)),
            ],
        ),
    ])?;
    assert!(!ir.contains("call void @sink"), "{}", ir);
    assert!(ir.contains("  unreachable"), "{}", ir);
    Ok(())
}

#[test]
fn diverging_operand_stops_the_infix() -> Result<()> {
    let ir = gen_ir(vec![func(
        "sum",
        &[("c", "bool")],
        "i32",
        vec![ret(infix(
            BinaryOp::Add,
            if_else(var("c"), vec![ret(int(1))], vec![ret(int(2))]),
            int(3),
        ))],
    )])?;
    assert!(!ir.contains(" add "), "{}", ir);
    Ok(())
}

#[test]
fn if_without_else_is_fine_as_a_statement() -> Result<()> {
    let ir = gen_ir(vec![
        ffi("tick", &[], "void"),
        func(
            "maybe",
            &[("c", "bool")],
            "void",
            vec![expr(if_chain(vec![branch(
                var("c"),
                vec![expr(call("tick", vec![]))],
            )]))],
        ),
    ])?;
    assert!(ir.contains("  call void @tick()"), "{}", ir);
    assert!(!ir.contains("phi"), "{}", ir);
    Ok(())
}

#[test]
fn if_without_else_cannot_produce_a_value() {
    let err = compile_err(vec![func(
        "bad",
        &[("c", "bool")],
        "i32",
        vec![expr(if_chain(vec![branch(var("c"), vec![expr(int(1))])]))],
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::BranchTypeMismatch]);
}

#[test]
fn arms_of_different_types_are_rejected() {
    let err = compile_err(vec![func(
        "bad",
        &[("c", "bool")],
        "i32",
        vec![expr(if_else(
            var("c"),
            vec![expr(int(1))],
            vec![expr(boolean(false))],
        ))],
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::BranchTypeMismatch]);
    assert_eq!(err.diagnostics[0].item.as_deref(), Some("bad"));
    assert!(
        err.diagnostics[0].message.contains("`i32` and `bool`"),
        "{}",
        err.diagnostics[0].message
    );
}

#[test]
fn one_arm_without_a_value_is_rejected() {
    let err = compile_err(vec![func(
        "bad",
        &[("c", "bool")],
        "i32",
        vec![expr(if_else(
            var("c"),
            vec![expr(int(1))],
            vec![let_("x", "i32", int(2))],
        ))],
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::BranchTypeMismatch]);
}

#[test]
fn condition_must_be_bool() {
    let err = compile_err(vec![func(
        "bad",
        &[("n", "i32")],
        "i32",
        vec![expr(if_else(var("n"), vec![expr(int(1))], vec![expr(int(2))]))],
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::ArityOrTypeMismatch]);
}

#[test]
fn branch_bodies_get_their_own_scope() -> Result<()> {
    // `x` is declared in both arms and once more after the `if`.
    let ir = gen_ir(vec![func(
        "scoped",
        &[("c", "bool")],
        "i32",
        vec![
            expr(if_else(
                var("c"),
                vec![let_("x", "i32", int(1))],
                vec![let_("x", "i32", int(2))],
            )),
            let_("x", "i32", int(3)),
            expr(infix(BinaryOp::Add, var("x"), int(0))),
        ],
    )])?;
    assert!(ir.contains("%x = alloca i32"), "{}", ir);
    assert_eq!(ir.matches("= alloca i32").count(), 3, "{}", ir);
    Ok(())
}
