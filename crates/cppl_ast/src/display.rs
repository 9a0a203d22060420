//! Source-syntax printing for AST nodes.
//!
//! Diagnostics use these impls to quote the offending expression, and the
//! compiler's verbose output uses them to echo parsed items.

use crate::*;
use std::fmt;

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn block(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, stmt) in body.iter().enumerate() {
        if i > 0 {
            write!(f, ";")?;
        }
        write!(f, " {}", stmt)?;
    }
    write!(f, " }}")
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sym)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ident.sym)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

impl fmt::Display for FunctionProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        comma_list(f, &self.args)?;
        write!(f, ")")?;
        if self.return_type.name() != "void" {
            write!(f, ": {}", self.return_type)?;
        }
        Ok(())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Str(s) => write!(f, "{:?}", s.value),
            Expr::Int(i) => write!(f, "{}", i.value),
            Expr::Bool(b) => write!(f, "{}", b.value),
            Expr::Ident(id) => write!(f, "{}", id),
            Expr::Call(call) => {
                write!(f, "{}(", call.callee)?;
                comma_list(f, &call.args)?;
                write!(f, ")")
            }
            Expr::MethodCall(call) => {
                write!(f, "{}.{}(", call.object, call.method)?;
                comma_list(f, &call.args)?;
                write!(f, ")")
            }
            Expr::Member(member) => write!(f, "{}.{}", member.object, member.field),
            Expr::Infix(infix) => write!(f, "({} {} {})", infix.lhs, infix.op, infix.rhs),
            Expr::Make(make) => {
                write!(f, "make {} {{ ", make.ty)?;
                comma_list(f, &make.fields)?;
                write!(f, " }}")
            }
            Expr::If(if_expr) => {
                for (i, branch) in if_expr.branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, " else ")?;
                    }
                    if let Some(cond) = &branch.cond {
                        write!(f, "if {} ", cond)?;
                    }
                    block(f, &branch.body)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Declaration(decl) => {
                write!(f, "let {}: {} = {}", decl.name, decl.ty, decl.value)
            }
            Stmt::Expr(stmt) => write!(f, "{}", stmt.expr),
            Stmt::Return(ret) => match &ret.value {
                Some(value) => write!(f, "return {}", value),
                None => write!(f, "return"),
            },
            Stmt::Empty(_) => Ok(()),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Function(func) => {
                write!(f, "{} = ", func.proto)?;
                block(f, &func.body)
            }
            Item::FFIFunction(ffi) => write!(f, "ffi {};", ffi.proto),
            Item::Struct(s) => {
                write!(f, "struct {} {{ ", s.name)?;
                comma_list(f, &s.fields)?;
                write!(f, " }}")
            }
            Item::Empty(_) => write!(f, ";"),
        }
    }
}
