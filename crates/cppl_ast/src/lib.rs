//! cppl AST definitions
//!
//! This crate defines the abstract syntax tree (AST) for the cppl language.
//! It serves as the contract between the parser and the compiler core: the
//! parser guarantees syntactic well-formedness, the compiler performs all
//! name and type resolution.

use serde::{Deserialize, Serialize};
use std::ops::Range;

mod display;

/// Represents a source code span as a byte range.
pub type Span = Range<usize>;

/// Identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub sym: String,
    #[serde(default)]
    pub span: Span,
}

impl Ident {
    pub fn new(sym: impl Into<String>, span: Span) -> Self {
        Ident {
            sym: sym.into(),
            span,
        }
    }
}

/// A reference to a named type. Resolution happens in the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub ident: Ident,
}

impl Type {
    pub fn named(sym: impl Into<String>, span: Span) -> Self {
        Type {
            ident: Ident::new(sym, span),
        }
    }

    /// The type of a function prototype without a return annotation.
    pub fn void() -> Self {
        Type::named("void", 0..0)
    }

    pub fn name(&self) -> &str {
        &self.ident.sym
    }

    pub fn span(&self) -> Span {
        self.ident.span.clone()
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::void()
    }
}

/// A `(name, type)` pair used by prototypes and struct field lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: Ident,
    pub ty: Type,
}

/// Function prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionProto {
    pub name: Ident,
    pub args: Vec<Argument>,
    #[serde(default)]
    pub return_type: Type,
    #[serde(default)]
    pub span: Span,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Expressions in the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Str(StrLit),
    Int(IntLit),
    Bool(BoolLit),
    Ident(Ident),
    Call(CallExpr),
    MethodCall(MethodCallExpr),
    Member(MemberExpr),
    Infix(InfixExpr),
    Make(MakeExpr),
    If(IfExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Str(e) => e.span.clone(),
            Expr::Int(e) => e.span.clone(),
            Expr::Bool(e) => e.span.clone(),
            Expr::Ident(e) => e.span.clone(),
            Expr::Call(e) => e.span.clone(),
            Expr::MethodCall(e) => e.span.clone(),
            Expr::Member(e) => e.span.clone(),
            Expr::Infix(e) => e.span.clone(),
            Expr::Make(e) => e.span.clone(),
            Expr::If(e) => e.span.clone(),
        }
    }
}

/// String literal. `value` holds the decoded bytes as UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrLit {
    pub value: String,
    #[serde(default)]
    pub span: Span,
}

/// Integer literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntLit {
    pub value: i64,
    #[serde(default)]
    pub span: Span,
}

/// Boolean literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolLit {
    pub value: bool,
    #[serde(default)]
    pub span: Span,
}

/// Call expression: `callee(args...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// Method call expression: `object.method(args...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCallExpr {
    pub object: Box<Expr>,
    pub method: Ident,
    pub args: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// Member access: `object.field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub field: Ident,
    #[serde(default)]
    pub span: Span,
}

/// Binary arithmetic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfixExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// Struct construction: `make T { fields... }`, fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeExpr {
    pub ty: Type,
    pub fields: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// `if`/`else if`/`else` chain. Only the last branch may lack a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpr {
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub span: Span,
}

impl IfExpr {
    /// Whether the chain ends in an unconditional `else`.
    pub fn has_else(&self) -> bool {
        self.branches.last().is_some_and(|b| b.cond.is_none())
    }
}

/// One arm of an `if` chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub cond: Option<Expr>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

/// Statements in the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Declaration(Declaration),
    Expr(ExprStmt),
    Return(ReturnStmt),
    Empty(EmptyStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Declaration(s) => s.span.clone(),
            Stmt::Expr(s) => s.span.clone(),
            Stmt::Return(s) => s.span.clone(),
            Stmt::Empty(s) => s.span.clone(),
        }
    }
}

/// Variable declaration: `let name: ty = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: Ident,
    pub ty: Type,
    pub value: Expr,
    #[serde(default)]
    pub span: Span,
}

/// Expression statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    #[serde(default)]
    pub span: Span,
}

/// Return statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// Empty statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyStmt {
    #[serde(default)]
    pub span: Span,
}

/// Top-level items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Function(FunctionDecl),
    FFIFunction(FFIFunctionDecl),
    Struct(StructDecl),
    Empty(EmptyItem),
}

impl Item {
    /// The name the item binds in the global scope, if any.
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Item::Function(f) => Some(&f.proto.name),
            Item::FFIFunction(f) => Some(&f.proto.name),
            Item::Struct(s) => Some(&s.name),
            Item::Empty(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span.clone(),
            Item::FFIFunction(f) => f.span.clone(),
            Item::Struct(s) => s.span.clone(),
            Item::Empty(e) => e.span.clone(),
        }
    }
}

/// Function definition with a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub proto: FunctionProto,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

/// Foreign function declaration, linked externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FFIFunctionDecl {
    pub proto: FunctionProto,
    #[serde(default)]
    pub span: Span,
}

/// Struct declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<Argument>,
    #[serde(default)]
    pub span: Span,
}

/// Empty item (stray `;` at top level).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyItem {
    #[serde(default)]
    pub span: Span,
}
