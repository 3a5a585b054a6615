//! Grammar dump in EBNF-like notation.
//!
//! Used for diagnostics and golden tests. Sub-expressions are
//! parenthesized by operator priority, so the dump parses the way the tree
//! is shaped.

use std::fmt::{self, Write};

use crate::ast::{ConstExpr, Declaration, NativeNameKind, NativeRefKind, SyntaxExpr, SyntaxExprKind};
use crate::grammar::Grammar;

/// Syntax operator priorities, loosest first. The order of constants is
/// significant: a sub-expression is parenthesized when its priority is
/// below the context's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Top,
    Or,
    And,
    Term,
}

pub fn write_grammar(grammar: &Grammar, out: &mut impl Write) -> fmt::Result {
    for declaration in grammar.declarations() {
        write_declaration(*declaration, out)?;
        out.write_char('\n')?;
    }
    Ok(())
}

pub fn write_declaration(declaration: Declaration, out: &mut impl Write) -> fmt::Result {
    match declaration {
        Declaration::Type(decl) => write!(out, "type {};", decl.name),
        Declaration::Terminal(decl) => {
            write!(out, "token {}", decl.name)?;
            if let Some(raw_type) = decl.raw_type {
                write!(out, " {{{}}}", raw_type.name)?;
            }
            out.write_char(';')
        }
        Declaration::CustomTerminalType(decl) => {
            write!(out, "token {{{}}};", decl.raw_type.name)
        }
        Declaration::Nonterminal(decl) => {
            if decl.start {
                out.write_char('@')?;
            }
            write!(out, "{}", decl.name)?;
            if let Some(raw_type) = decl.explicit_raw_type {
                write!(out, " {{{}}}", raw_type.name)?;
            }
            out.write_str(" : ")?;
            write_expr(&decl.expression, out, Prec::Top)?;
            out.write_char(';')
        }
    }
}

pub fn write_expr(expr: &SyntaxExpr, out: &mut impl Write, prec: Prec) -> fmt::Result {
    let own = expr_prec(expr);
    if own < prec {
        out.write_char('(')?;
        write_expr_bare(expr, out)?;
        out.write_char(')')
    } else {
        write_expr_bare(expr, out)
    }
}

fn expr_prec(expr: &SyntaxExpr) -> Prec {
    match expr.kind() {
        SyntaxExprKind::Or(_) => Prec::Or,
        SyntaxExprKind::And(_) | SyntaxExprKind::Empty => Prec::And,
        _ => Prec::Term,
    }
}

fn write_expr_bare(expr: &SyntaxExpr, out: &mut impl Write) -> fmt::Result {
    match expr.kind() {
        SyntaxExprKind::Empty => Ok(()),
        SyntaxExprKind::Or(or) => {
            for (i, sub) in or.sub_exprs.iter().enumerate() {
                if i > 0 {
                    out.write_str(" | ")?;
                }
                write_expr(sub, out, Prec::And)?;
            }
            Ok(())
        }
        SyntaxExprKind::And(and) => {
            for (i, sub) in and.sub_exprs.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                write_expr(sub, out, Prec::Term)?;
            }
            if let Some(raw_type) = and.raw_type {
                write!(out, " {{{}}}", raw_type.name)?;
            }
            Ok(())
        }
        SyntaxExprKind::NameElement(element) => {
            if !element.name.is_empty() {
                write!(out, "{}=", element.name)?;
            }
            write_expr(&element.expression, out, Prec::Term)
        }
        SyntaxExprKind::ThisElement(element) => {
            out.write_str("this=")?;
            write_expr(&element.expression, out, Prec::Term)
        }
        SyntaxExprKind::NameRef(name_ref) => write!(out, "{}", name_ref.name),
        SyntaxExprKind::StringLiteral(literal) => write!(out, "\"{}\"", literal.value),
        SyntaxExprKind::Cast(cast) => {
            write!(out, "{{{}}}(", cast.raw_type.name)?;
            write_expr(&cast.expression, out, Prec::Top)?;
            out.write_char(')')
        }
        SyntaxExprKind::ZeroOne(zero_one) => {
            write_expr(&zero_one.sub_expr, out, Prec::Term)?;
            out.write_char('?')
        }
        SyntaxExprKind::ZeroMany(repeat) | SyntaxExprKind::OneMany(repeat) => {
            let suffix = match expr.kind() {
                SyntaxExprKind::ZeroMany(_) => '*',
                _ => '+',
            };
            match repeat.body.separator {
                None => {
                    write_expr(&repeat.body.expression, out, Prec::Term)?;
                }
                Some(separator) => {
                    out.write_char('(')?;
                    write_expr(&repeat.body.expression, out, Prec::Term)?;
                    out.write_str(" : ")?;
                    write_expr(&separator, out, Prec::Term)?;
                    out.write_char(')')?;
                }
            }
            out.write_char(suffix)
        }
        SyntaxExprKind::Const(constant) => {
            out.write_char('<')?;
            write_const_expr(&constant.value, out)?;
            out.write_char('>')
        }
    }
}

fn write_const_expr(expr: &ConstExpr, out: &mut impl Write) -> fmt::Result {
    match expr {
        ConstExpr::Integer(value) => write!(out, "{value}"),
        ConstExpr::String(value) => write!(out, "\"{value}\""),
        ConstExpr::Boolean(value) => write!(out, "{value}"),
        ConstExpr::Native(native) => {
            for qualifier in &native.qualifiers {
                write!(out, "{qualifier}.")?;
            }
            write_native_name(&native.name, out)?;
            for reference in &native.references {
                match reference.kind {
                    NativeRefKind::Pointer => out.write_str("->")?,
                    NativeRefKind::Reference => out.write_char('.')?,
                }
                write_native_name(&reference.name, out)?;
            }
            Ok(())
        }
    }
}

fn write_native_name(name: &crate::ast::NativeName, out: &mut impl Write) -> fmt::Result {
    write!(out, "{}", name.name)?;
    if let NativeNameKind::Function { arguments } = &name.kind {
        out.write_char('(')?;
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            write_const_expr(argument, out)?;
        }
        out.write_char(')')?;
    }
    Ok(())
}
