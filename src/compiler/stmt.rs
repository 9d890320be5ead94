use crate::{
    ast::{expressions::ExprKind, statements::StmtKind},
    errors::errors::Error,
    type_checker::typed_ast::{TypedExpr, TypedStmt},
};

use super::{
    compiler::{invariant, variable_id, Compiler, SCRATCH_LOCAL},
    expr::{field_offset, gen_expression, gen_receiver_check},
    runtime::TRUE_WORD,
};

pub fn gen_statement(
    compiler: &mut Compiler,
    statement: &TypedStmt,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    match &statement.kind {
        StmtKind::Expr(expression) => {
            gen_expression(compiler, expression, out)?;
            out.push(format!("local.set {}", SCRATCH_LOCAL));
        }
        StmtKind::VarInit { name, init, .. } => {
            gen_expression(compiler, init, out)?;
            if compiler.in_function {
                out.push(format!("local.set {}", variable_id(name)));
            } else {
                out.push(format!("global.set {}", variable_id(name)));
            }
        }
        StmtKind::Assign { target, value } => gen_assignment(compiler, target, value, out)?,
        StmtKind::Pass => {}
        StmtKind::Return(value) => {
            gen_expression(compiler, value, out)?;
            out.push("return".to_string());
        }
        StmtKind::While { cond, body } => {
            let label = compiler.next_label();
            let exit = format!("$$while_exit_{}", label);
            let start = format!("$$while_start_{}", label);

            out.push(format!("block {}", exit));
            out.push(format!("loop {}", start));
            gen_expression(compiler, cond, out)?;
            out.push(format!("i32.const {}", TRUE_WORD));
            out.push("i32.ne".to_string());
            out.push(format!("br_if {}", exit));
            for stmt in body {
                gen_statement(compiler, stmt, out)?;
            }
            out.push(format!("br {}", start));
            out.push("end".to_string());
            out.push("end".to_string());
        }
        StmtKind::If {
            cond,
            body,
            elifs,
            else_body,
        } => gen_if(compiler, cond, body, elifs, else_body, out)?,
        StmtKind::Define(_) | StmtKind::Class { .. } => {
            return Err(invariant(
                format!("nested {}", statement.kind.describe()),
                statement.span.start.clone(),
            ));
        }
    }

    Ok(())
}

fn gen_assignment(
    compiler: &mut Compiler,
    target: &TypedExpr,
    value: &TypedExpr,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    match &target.kind {
        ExprKind::Id { name, global } => {
            gen_expression(compiler, value, out)?;
            if *global {
                out.push(format!("global.set {}", variable_id(name)));
            } else {
                out.push(format!("local.set {}", variable_id(name)));
            }
        }
        ExprKind::Field { object, field } => {
            let class = object.get_type().class_name().ok_or_else(|| {
                invariant(
                    format!("field assignment on `{}`", object.get_type()),
                    target.span.start.clone(),
                )
            })?;
            let offset = field_offset(compiler, target, class, field)?;

            gen_expression(compiler, object, out)?;
            gen_receiver_check(out);
            out.push(format!("i32.const {}", offset));
            out.push("i32.add".to_string());
            gen_expression(compiler, value, out)?;
            out.push("i32.store".to_string());
        }
        _ => {
            return Err(invariant(
                "assignment to a non-variable target".to_string(),
                target.span.start.clone(),
            ))
        }
    }

    Ok(())
}

/// `elif` branches nest as `else` arms of the preceding test.
fn gen_if(
    compiler: &mut Compiler,
    cond: &TypedExpr,
    body: &[TypedStmt],
    elifs: &[(TypedExpr, Vec<TypedStmt>)],
    else_body: &[TypedStmt],
    out: &mut Vec<String>,
) -> Result<(), Error> {
    gen_expression(compiler, cond, out)?;
    out.push(format!("i32.const {}", TRUE_WORD));
    out.push("i32.eq".to_string());
    out.push("if".to_string());
    for stmt in body {
        gen_statement(compiler, stmt, out)?;
    }

    match elifs.split_first() {
        Some(((elif_cond, elif_body), rest)) => {
            out.push("else".to_string());
            gen_if(compiler, elif_cond, elif_body, rest, else_body, out)?;
        }
        None if !else_body.is_empty() => {
            out.push("else".to_string());
            for stmt in else_body {
                gen_statement(compiler, stmt, out)?;
            }
        }
        None => {}
    }

    out.push("end".to_string());
    Ok(())
}
