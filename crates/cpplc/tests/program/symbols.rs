use anyhow::Result;

use super::common::*;
use cpplc::config::CompilerConfig;
use cpplc::diagnostics::ErrorKind;
use cpplc::ir::IrType;
use cpplc::program::{BuildState, Program};
use inkwell::context::Context;

#[test]
fn builtin_types_are_bound_globally() -> Result<()> {
    let context = Context::create();
    let mut program = Program::new(&context, CompilerConfig::default());
    let global = program.global_scope();
    for (name, expected) in [
        ("i8", IrType::Basic(context.i8_type().into())),
        ("i16", IrType::Basic(context.i16_type().into())),
        ("i32", IrType::Basic(context.i32_type().into())),
        ("i64", IrType::Basic(context.i64_type().into())),
        ("f16", IrType::Basic(context.f16_type().into())),
        ("f32", IrType::Basic(context.f32_type().into())),
        ("f64", IrType::Basic(context.f64_type().into())),
        ("bool", IrType::Basic(context.bool_type().into())),
        ("void", IrType::Void),
    ] {
        let resolved = program
            .resolve_type(global, &ty(name))
            .map_err(|d| anyhow::anyhow!("{}", d))?;
        assert_eq!(resolved, expected, "{}", name);
        let id = program.lookup(name).unwrap();
        assert_eq!(program.thing(id).state, BuildState::Built);
    }

    let string = program
        .resolve_type(global, &ty("string"))
        .map_err(|d| anyhow::anyhow!("{}", d))?;
    assert_eq!(string, IrType::Basic(program.builtin.string.into()));
    assert_eq!(program.ir.type_name(&string), "string");
    Ok(())
}

#[test]
fn string_struct_follows_pointer_width() {
    let context = Context::create();
    let program = Program::new(
        &context,
        CompilerConfig {
            pointer_width: 32,
            ..Default::default()
        },
    );
    let def = program.ir.struct_def(program.builtin.string).unwrap();
    assert_eq!(def.fields, ["data", "length"]);
    assert_eq!(def.field_type(1), Some(context.i32_type().into()));
    assert_eq!(def.layout.size, 8);
}

#[test]
fn items_are_registered_without_building() {
    let context = Context::create();
    let program = program_with(&context, add_and_main());
    assert!(program.diagnostics().is_empty());
    assert!(program.build_log().is_empty());
    assert!(program.module().get_first_function().is_none());
    let id = program.lookup("add").unwrap();
    assert!(program.thing(id).is_item());
    assert!(!program.thing(id).is_built());
}

#[test]
fn top_level_redefinition() {
    let context = Context::create();
    let mut program = Program::new(&context, CompilerConfig::default());
    program
        .add_item(func("twice", &[], "void", vec![]))
        .unwrap();
    let err = program
        .add_item(structure("twice", &[("a", "i32")]))
        .unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::Redefinition));
}

#[test]
fn redefining_a_builtin_name() {
    let err = compile_err(vec![structure("i32", &[("a", "i64")])]);
    assert_eq!(err.kinds(), vec![ErrorKind::Redefinition]);
    assert_eq!(err.diagnostics[0].item.as_deref(), Some("i32"));
}

#[test]
fn a_function_is_not_a_type() {
    let err = compile_err(vec![
        func("helper", &[], "void", vec![]),
        func("main", &[("h", "helper")], "void", vec![]),
    ]);
    assert_eq!(err.kinds(), vec![ErrorKind::UnknownType]);
    assert_eq!(err.diagnostics[0].item.as_deref(), Some("main"));
}

#[test]
fn undefined_type_name() {
    let err = compile_err(vec![func("main", &[], "Missing", vec![])]);
    assert_eq!(err.kinds(), vec![ErrorKind::UndefinedSymbol]);
    assert!(
        err.diagnostics[0].message.contains("cannot find `Missing`"),
        "{}",
        err.diagnostics[0].message
    );
}

#[test]
fn undefined_variable() {
    let err = compile_err(vec![func("main", &[], "i32", vec![expr(var("ghost"))])]);
    assert_eq!(err.kinds(), vec![ErrorKind::UndefinedSymbol]);
}

#[test]
fn locals_do_not_leak_between_functions() {
    let err = compile_err(vec![
        func("one", &[("shared", "i32")], "i32", vec![expr(var("shared"))]),
        func("two", &[], "i32", vec![expr(var("shared"))]),
    ]);
    assert_eq!(err.kinds(), vec![ErrorKind::UndefinedSymbol]);
    assert_eq!(err.diagnostics[0].item.as_deref(), Some("two"));
}

#[test]
fn locals_shadow_globals() -> Result<()> {
    let ir = gen_ir(vec![
        func("value", &[], "i32", vec![expr(int(1))]),
        func(
            "main",
            &[],
            "i32",
            vec![let_("value", "i32", int(2)), expr(var("value"))],
        ),
    ])?;
    assert!(ir.contains(" = load i32, i32* %value, align 4"), "{}", ir);
    assert!(!ir.contains("call i32 @value"), "{}", ir);
    Ok(())
}
