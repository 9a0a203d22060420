use anyhow::Result;

use super::common::*;
use cppl_ast::BinaryOp;
use inkwell::context::Context;
use inkwell::values::InstructionOpcode;

#[test]
fn add_and_main_lower_to_single_blocks() -> Result<()> {
    let context = Context::create();
    let module = compile(&context, add_and_main())?;

    let add = function(&module, "add");
    assert_eq!(add.count_basic_blocks(), 1);
    assert_eq!(
        opcodes(add),
        vec![
            InstructionOpcode::Alloca,
            InstructionOpcode::Alloca,
            InstructionOpcode::Store,
            InstructionOpcode::Store,
            InstructionOpcode::Load,
            InstructionOpcode::Load,
            InstructionOpcode::Add,
            InstructionOpcode::Return,
        ]
    );

    let main = function(&module, "main");
    assert_eq!(main.count_basic_blocks(), 1);
    assert_eq!(
        opcodes(main),
        vec![InstructionOpcode::Call, InstructionOpcode::Return]
    );
    assert!(module.verify().is_ok());
    Ok(())
}

#[test]
fn add_and_main_textual_ir() -> Result<()> {
    let ir = gen_ir(add_and_main())?;
    assert!(ir.contains("define i32 @add(i32 %a, i32 %b) {"), "{}", ir);
    assert!(ir.contains("  %a.addr = alloca i32, align 4"), "{}", ir);
    assert!(ir.contains("  store i32 %a, i32* %a.addr, align 4"), "{}", ir);
    assert!(ir.contains("  %add = add i32 %a"), "{}", ir);
    assert!(ir.contains("  ret i32 %add"), "{}", ir);
    assert!(ir.contains("  %call = call i32 @add(i32 2, i32 3)"), "{}", ir);
    assert!(ir.contains("  ret i32 %call"), "{}", ir);
    Ok(())
}

#[test]
fn module_carries_configured_name_and_layout() -> Result<()> {
    let ir = gen_ir(add_and_main())?;
    assert!(ir.starts_with("; ModuleID = 'cppl_module'"), "{}", ir);
    assert!(ir.contains("target datalayout = \"e-m:e-p:64:64"), "{}", ir);
    Ok(())
}

#[test]
fn tail_expression_is_returned() -> Result<()> {
    // Constant operands are folded by the builder.
    let ir = gen_ir(vec![func(
        "seven",
        &[],
        "i32",
        vec![expr(infix(BinaryOp::Mul, int(7), int(1)))],
    )])?;
    assert!(ir.contains("define i32 @seven() {"), "{}", ir);
    assert!(ir.contains("  ret i32 7"), "{}", ir);
    Ok(())
}

#[test]
fn void_function_gets_implicit_ret_void() -> Result<()> {
    let ir = gen_ir(vec![
        ffi("puts", &[("s", "string")], "void"),
        func("hello", &[], "void", vec![expr(call("puts", vec![string("hi")]))]),
    ])?;
    assert!(ir.contains("declare void @puts(%string)"), "{}", ir);
    assert!(ir.contains("define void @hello() {"), "{}", ir);
    assert!(ir.contains("  call void @puts(%string { i8* "), "{}", ir);
    assert!(ir.contains("@.str"), "{}", ir);
    assert!(ir.contains("i64 2 })"), "{}", ir);
    assert!(ir.contains("  ret void"), "{}", ir);
    Ok(())
}

#[test]
fn arithmetic_uses_unsigned_division() -> Result<()> {
    let context = Context::create();
    let module = compile(
        &context,
        vec![func(
            "mix",
            &[("a", "i64"), ("b", "i64")],
            "i64",
            vec![expr(infix(
                BinaryOp::Mod,
                infix(BinaryOp::Div, var("a"), var("b")),
                var("b"),
            ))],
        )],
    )?;
    let arith: Vec<InstructionOpcode> = opcodes(function(&module, "mix"))
        .into_iter()
        .filter(|op| matches!(op, InstructionOpcode::UDiv | InstructionOpcode::URem))
        .collect();
    assert_eq!(arith, vec![InstructionOpcode::UDiv, InstructionOpcode::URem]);
    Ok(())
}

#[test]
fn float_operands_use_float_instructions() -> Result<()> {
    let ir = gen_ir(vec![func(
        "half",
        &[("x", "f64"), ("y", "f64")],
        "f64",
        vec![expr(infix(BinaryOp::Div, var("x"), var("y")))],
    )])?;
    assert!(ir.contains("= fdiv double %x"), "{}", ir);
    Ok(())
}

#[test]
fn statements_after_return_are_unreachable() -> Result<()> {
    let context = Context::create();
    let module = compile(
        &context,
        vec![func("early", &[], "i32", vec![ret(int(1)), expr(int(2))])],
    )?;
    assert_eq!(block_names(&module, "early"), ["entry", "dead"]);
    let early = function(&module, "early");
    assert!(predecessors(early, block_named(early, "dead")).is_empty());
    Ok(())
}
