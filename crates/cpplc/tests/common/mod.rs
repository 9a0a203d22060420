//! Common testing utilities for the cppl compiler test suite.
//!
//! The compiler consumes a parsed AST, so tests build items directly with
//! the small constructors below instead of going through source text. Spans
//! are left empty.
#![allow(dead_code)]

use cppl_ast::*;
use cpplc::config::CompilerConfig;
use cpplc::diagnostics::CompileErrors;
use cpplc::program::Program;
use inkwell::basic_block::BasicBlock;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::{FunctionValue, InstructionOpcode, InstructionValue, PhiValue};

pub fn setup() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

pub fn id(name: &str) -> Ident {
    Ident::new(name, 0..0)
}

pub fn ty(name: &str) -> Type {
    Type::named(name, 0..0)
}

pub fn int(value: i64) -> Expr {
    Expr::Int(IntLit { value, span: 0..0 })
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(BoolLit { value, span: 0..0 })
}

pub fn string(value: &str) -> Expr {
    Expr::Str(StrLit {
        value: value.to_string(),
        span: 0..0,
    })
}

pub fn var(name: &str) -> Expr {
    Expr::Ident(id(name))
}

pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(var(callee)),
        args,
        span: 0..0,
    })
}

pub fn call_expr(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(callee),
        args,
        span: 0..0,
    })
}

pub fn method(object: Expr, name: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall(MethodCallExpr {
        object: Box::new(object),
        method: id(name),
        args,
        span: 0..0,
    })
}

pub fn member(object: Expr, field: &str) -> Expr {
    Expr::Member(MemberExpr {
        object: Box::new(object),
        field: id(field),
        span: 0..0,
    })
}

pub fn infix(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Infix(InfixExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: 0..0,
    })
}

pub fn make(type_name: &str, fields: Vec<Expr>) -> Expr {
    Expr::Make(MakeExpr {
        ty: ty(type_name),
        fields,
        span: 0..0,
    })
}

pub fn branch(cond: Expr, body: Vec<Stmt>) -> Branch {
    Branch {
        cond: Some(cond),
        body,
        span: 0..0,
    }
}

pub fn otherwise(body: Vec<Stmt>) -> Branch {
    Branch {
        cond: None,
        body,
        span: 0..0,
    }
}

pub fn if_chain(branches: Vec<Branch>) -> Expr {
    Expr::If(IfExpr {
        branches,
        span: 0..0,
    })
}

/// `if cond { then } else { alt }`
pub fn if_else(cond: Expr, then: Vec<Stmt>, alt: Vec<Stmt>) -> Expr {
    if_chain(vec![branch(cond, then), otherwise(alt)])
}

pub fn expr(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt { expr, span: 0..0 })
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        value: Some(value),
        span: 0..0,
    })
}

pub fn ret_void() -> Stmt {
    Stmt::Return(ReturnStmt {
        value: None,
        span: 0..0,
    })
}

pub fn let_(name: &str, type_name: &str, value: Expr) -> Stmt {
    Stmt::Declaration(Declaration {
        name: id(name),
        ty: ty(type_name),
        value,
        span: 0..0,
    })
}

fn proto(name: &str, args: &[(&str, &str)], ret: &str) -> FunctionProto {
    FunctionProto {
        name: id(name),
        args: args
            .iter()
            .map(|(n, t)| Argument {
                name: id(n),
                ty: ty(t),
            })
            .collect(),
        return_type: ty(ret),
        span: 0..0,
    }
}

pub fn func(name: &str, args: &[(&str, &str)], ret: &str, body: Vec<Stmt>) -> Item {
    Item::Function(FunctionDecl {
        proto: proto(name, args, ret),
        body,
        span: 0..0,
    })
}

pub fn ffi(name: &str, args: &[(&str, &str)], ret: &str) -> Item {
    Item::FFIFunction(FFIFunctionDecl {
        proto: proto(name, args, ret),
        span: 0..0,
    })
}

pub fn structure(name: &str, fields: &[(&str, &str)]) -> Item {
    Item::Struct(StructDecl {
        name: id(name),
        fields: fields
            .iter()
            .map(|(n, t)| Argument {
                name: id(n),
                ty: ty(t),
            })
            .collect(),
        span: 0..0,
    })
}

/// `add(a, b) = a + b` and `main() = add(2, 3)`.
pub fn add_and_main() -> Vec<Item> {
    vec![
        func(
            "add",
            &[("a", "i32"), ("b", "i32")],
            "i32",
            vec![ret(infix(BinaryOp::Add, var("a"), var("b")))],
        ),
        func("main", &[], "i32", vec![ret(call("add", vec![int(2), int(3)]))]),
    ]
}

pub fn program_with(context: &Context, items: Vec<Item>) -> Program<'_> {
    setup();
    let mut program = Program::new(context, CompilerConfig::default());
    program.add_items(items);
    program
}

/// Registers and finalizes `items` with the default configuration.
pub fn compile(context: &Context, items: Vec<Item>) -> Result<Module<'_>, CompileErrors> {
    compile_with(context, items, CompilerConfig::default())
}

pub fn compile_with(
    context: &Context,
    items: Vec<Item>,
    config: CompilerConfig,
) -> Result<Module<'_>, CompileErrors> {
    setup();
    let _guard = cpplc::diagnostics::suppress();
    cpplc::compile_items(context, items, config)
}

/// Compiles `items` in a fresh context, keeping only the diagnostics.
pub fn compile_err(items: Vec<Item>) -> CompileErrors {
    let context = Context::create();
    let errors = match compile(&context, items) {
        Ok(module) => panic!("expected errors, got\n{}", module.print_to_string()),
        Err(errors) => errors,
    };
    errors
}

/// Textual IR of a program that must compile.
pub fn gen_ir(items: Vec<Item>) -> anyhow::Result<String> {
    let context = Context::create();
    let module = compile(&context, items)?;
    Ok(module.print_to_string().to_string())
}

pub fn function<'ctx>(module: &Module<'ctx>, name: &str) -> FunctionValue<'ctx> {
    module
        .get_function(name)
        .unwrap_or_else(|| panic!("`{}` is not in the module", name))
}

pub fn block_name(block: BasicBlock<'_>) -> String {
    block.get_name().to_string_lossy().into_owned()
}

pub fn block_names(module: &Module<'_>, name: &str) -> Vec<String> {
    function(module, name)
        .get_basic_blocks()
        .into_iter()
        .map(block_name)
        .collect()
}

pub fn block_named<'ctx>(f: FunctionValue<'ctx>, name: &str) -> BasicBlock<'ctx> {
    f.get_basic_blocks()
        .into_iter()
        .find(|b| block_name(*b) == name)
        .unwrap_or_else(|| panic!("no block `{}`", name))
}

pub fn instructions<'ctx>(f: FunctionValue<'ctx>) -> Vec<InstructionValue<'ctx>> {
    let mut out = Vec::new();
    for block in f.get_basic_blocks() {
        let mut next = block.get_first_instruction();
        while let Some(inst) = next {
            next = inst.get_next_instruction();
            out.push(inst);
        }
    }
    out
}

pub fn opcodes(f: FunctionValue<'_>) -> Vec<InstructionOpcode> {
    instructions(f).iter().map(|i| i.get_opcode()).collect()
}

pub fn phis<'ctx>(f: FunctionValue<'ctx>) -> Vec<PhiValue<'ctx>> {
    instructions(f)
        .into_iter()
        .filter_map(|i| PhiValue::try_from(i).ok())
        .collect()
}

/// Blocks the terminator of `block` can branch to.
pub fn successors<'ctx>(block: BasicBlock<'ctx>) -> Vec<BasicBlock<'ctx>> {
    let Some(term) = block.get_terminator() else {
        return Vec::new();
    };
    (0..term.get_num_operands())
        .filter_map(|i| term.get_operand(i))
        .filter_map(|op| op.right())
        .collect()
}

/// Names of the blocks that branch to `block`.
pub fn predecessors<'ctx>(f: FunctionValue<'ctx>, block: BasicBlock<'ctx>) -> Vec<String> {
    f.get_basic_blocks()
        .into_iter()
        .filter(|b| successors(*b).iter().any(|s| *s == block))
        .map(block_name)
        .collect()
}
