use crate::{
    ast::{
        expressions::{BinaryOp, ExprKind, UnaryOp},
        types::Type,
    },
    errors::errors::Error,
    type_checker::{type_checker::PRINT, typed_ast::TypedExpr},
};

use super::{
    compiler::{
        function_id, import_id, invariant, method_id, variable_id, Compiler, HEAP_POINTER,
        LHS_LOCAL, RECEIVER_LOCAL, RHS_LOCAL,
    },
    runtime::{
        encode_bool, encode_int, ERR, FALSE_WORD, HEAP_START, NONE_WORD, PRINT_BOOL,
        PRINT_NONE, PRINT_NUM, TAG_BITS, TRUE_WORD, WORD_SIZE,
    },
};

/// Generates the instructions that leave the value of `expression` on the
/// stack.
pub fn gen_expression(
    compiler: &mut Compiler,
    expression: &TypedExpr,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    match &expression.kind {
        ExprKind::Number(value) => out.push(format!("i32.const {}", encode_int(*value))),
        ExprKind::True => out.push(format!("i32.const {}", encode_bool(true))),
        ExprKind::False => out.push(format!("i32.const {}", encode_bool(false))),
        ExprKind::None => out.push(format!("i32.const {}", NONE_WORD)),
        ExprKind::Id { name, global } => {
            match &compiler.self_local {
                Some(local) if name == "self" && !global => {
                    out.push(format!("local.get {}", local))
                }
                _ if *global => out.push(format!("global.get {}", variable_id(name))),
                _ => out.push(format!("local.get {}", variable_id(name))),
            }
        }
        ExprKind::Unary { op, operand } => match (op, &operand.kind) {
            (UnaryOp::Neg, ExprKind::Number(value)) => {
                out.push(format!("i32.const {}", encode_int(-value)))
            }
            (UnaryOp::Neg, _) => {
                out.push("i32.const 0".to_string());
                gen_expression(compiler, operand, out)?;
                out.push("i32.sub".to_string());
            }
            (UnaryOp::Not, _) => {
                gen_expression(compiler, operand, out)?;
                out.push("i32.const 1".to_string());
                out.push("i32.xor".to_string());
            }
        },
        ExprKind::Binary { op, lhs, rhs } => gen_binary(compiler, *op, lhs, rhs, out)?,
        ExprKind::Call { name, args } if name == PRINT => {
            let arg = args.first().ok_or_else(|| {
                invariant(
                    "print called without an argument".to_string(),
                    expression.span.start.clone(),
                )
            })?;
            gen_expression(compiler, arg, out)?;
            gen_print(arg.get_type(), out);
        }
        ExprKind::Call { name, args } => {
            for arg in args {
                gen_expression(compiler, arg, out)?;
            }
            out.push(format!("call {}", function_id(name)));
        }
        ExprKind::Construct { class } => gen_construct(compiler, expression, class, out)?,
        ExprKind::Field { object, field } => {
            let class = receiver_class(object)?;
            let offset = field_offset(compiler, expression, class, field)?;

            gen_expression(compiler, object, out)?;
            gen_receiver_check(out);
            out.push(format!("i32.const {}", offset));
            out.push("i32.add".to_string());
            out.push("i32.load".to_string());
        }
        ExprKind::MethodCall {
            object,
            method,
            args,
        } => {
            let class = receiver_class(object)?.to_string();

            gen_expression(compiler, object, out)?;
            gen_receiver_check(out);
            for arg in args {
                gen_expression(compiler, arg, out)?;
            }
            out.push(format!("call {}", method_id(&class, method)));
        }
    }

    Ok(())
}

/// Both operands are evaluated. Each counts as true only when it is the
/// True word, so the result is always True or False.
fn gen_logical(
    compiler: &mut Compiler,
    op: BinaryOp,
    lhs: &TypedExpr,
    rhs: &TypedExpr,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    gen_expression(compiler, lhs, out)?;
    push_truth_test(out);
    gen_expression(compiler, rhs, out)?;
    push_truth_test(out);

    out.push(if op == BinaryOp::And { "i32.and" } else { "i32.or" }.to_string());
    out.push(format!("i32.const {}", FALSE_WORD));
    out.push("i32.or".to_string());

    Ok(())
}

fn push_truth_test(out: &mut Vec<String>) {
    out.push(format!("i32.const {}", TRUE_WORD));
    out.push("i32.eq".to_string());
}

fn gen_binary(
    compiler: &mut Compiler,
    op: BinaryOp,
    lhs: &TypedExpr,
    rhs: &TypedExpr,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    if let BinaryOp::And | BinaryOp::Or = op {
        return gen_logical(compiler, op, lhs, rhs, out);
    }

    gen_expression(compiler, lhs, out)?;

    // Ints are stored shifted, so one operand is untagged before multiplying.
    if op == BinaryOp::Mul {
        out.push(format!("i32.const {}", TAG_BITS));
        out.push("i32.shr_s".to_string());
    }

    gen_expression(compiler, rhs, out)?;

    let instruction = match op {
        BinaryOp::Add => "i32.add",
        BinaryOp::Sub => "i32.sub",
        BinaryOp::Mul => "i32.mul",
        BinaryOp::And | BinaryOp::Or => {
            return Err(invariant(
                format!("logical operator {:?} reached arithmetic lowering", op),
                lhs.span.start.clone(),
            ))
        }
        BinaryOp::FloorDiv => {
            gen_floor_div(out);
            return Ok(());
        }
        BinaryOp::Mod => {
            gen_floor_mod(out);
            return Ok(());
        }
        BinaryOp::Eq | BinaryOp::Is => "i32.eq",
        BinaryOp::Ne => "i32.ne",
        BinaryOp::Lt => "i32.lt_s",
        BinaryOp::Gt => "i32.gt_s",
        BinaryOp::Le => "i32.le_s",
        BinaryOp::Ge => "i32.ge_s",
    };
    out.push(instruction.to_string());

    if op.is_comparison() || op == BinaryOp::Is {
        // 0 or 1 becomes False or True.
        out.push(format!("i32.const {}", FALSE_WORD));
        out.push("i32.or".to_string());
    }

    Ok(())
}

/// Pushes 1 when the operands' remainder is non-zero and their signs differ.
fn push_rounding_adjustment(out: &mut Vec<String>) {
    out.extend([
        format!("local.get {}", LHS_LOCAL),
        format!("local.get {}", RHS_LOCAL),
        "i32.rem_s".to_string(),
        "i32.const 0".to_string(),
        "i32.ne".to_string(),
        format!("local.get {}", LHS_LOCAL),
        format!("local.get {}", RHS_LOCAL),
        "i32.xor".to_string(),
        "i32.const 0".to_string(),
        "i32.lt_s".to_string(),
        "i32.and".to_string(),
    ]);
}

fn store_operands(out: &mut Vec<String>) {
    out.push(format!("local.set {}", RHS_LOCAL));
    out.push(format!("local.set {}", LHS_LOCAL));
}

/// Division rounding toward negative infinity. Both operands are tagged, so
/// the truncated quotient is already the untagged result.
fn gen_floor_div(out: &mut Vec<String>) {
    store_operands(out);
    out.push(format!("local.get {}", LHS_LOCAL));
    out.push(format!("local.get {}", RHS_LOCAL));
    out.push("i32.div_s".to_string());
    push_rounding_adjustment(out);
    out.push("i32.sub".to_string());
    out.push(format!("i32.const {}", TAG_BITS));
    out.push("i32.shl".to_string());
}

/// Remainder taking the sign of the divisor.
fn gen_floor_mod(out: &mut Vec<String>) {
    store_operands(out);
    out.push(format!("local.get {}", LHS_LOCAL));
    out.push(format!("local.get {}", RHS_LOCAL));
    out.push("i32.rem_s".to_string());
    out.push(format!("local.get {}", RHS_LOCAL));
    push_rounding_adjustment(out);
    out.push("i32.mul".to_string());
    out.push("i32.add".to_string());
}

/// Prints the word on the stack according to its static type and replaces
/// it with `None`.
fn gen_print(typ: &Type, out: &mut Vec<String>) {
    match typ {
        Type::Int => out.push(format!("call {}", import_id(PRINT_NUM))),
        Type::Bool => out.push(format!("call {}", import_id(PRINT_BOOL))),
        Type::None => out.push(format!("call {}", import_id(PRINT_NONE))),
        Type::Object(_) => {
            // Only a None reference can be printed.
            out.push(format!("local.tee {}", RECEIVER_LOCAL));
            out.push(format!("i32.const {}", NONE_WORD));
            out.push("i32.ne".to_string());
            out.push("if".to_string());
            out.push(format!("call {}", import_id(ERR)));
            out.push("end".to_string());
            out.push(format!("local.get {}", RECEIVER_LOCAL));
            out.push(format!("call {}", import_id(PRINT_NONE)));
        }
    }
    out.push("drop".to_string());
    out.push(format!("i32.const {}", NONE_WORD));
}

/// Traps through the host when the object on the stack is `None`, leaving
/// the object in place.
pub fn gen_receiver_check(out: &mut Vec<String>) {
    out.push(format!("local.tee {}", RECEIVER_LOCAL));
    out.push(format!("i32.const {}", HEAP_START));
    out.push("i32.lt_s".to_string());
    out.push("if".to_string());
    out.push(format!("call {}", import_id(ERR)));
    out.push("end".to_string());
    out.push(format!("local.get {}", RECEIVER_LOCAL));
}

/// Reserves the object before running the field initializers, which see the
/// new object as `self`.
fn gen_construct(
    compiler: &mut Compiler,
    expression: &TypedExpr,
    class: &str,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    if compiler.constructing.iter().any(|name| name == class) {
        return Err(invariant(
            format!("class {} is constructed by its own field initializers", class),
            expression.span.start.clone(),
        ));
    }

    let layout = compiler.layout(class, &expression.span.start)?.clone();
    let local = compiler.enter_construction();

    out.push(format!("global.get {}", HEAP_POINTER));
    out.push(format!("local.set {}", local));
    out.push(format!("global.get {}", HEAP_POINTER));
    out.push(format!("i32.const {}", layout.size()));
    out.push("i32.add".to_string());
    out.push(format!("global.set {}", HEAP_POINTER));

    let outer_self = compiler.self_local.replace(local.clone());
    compiler.constructing.push(class.to_string());

    let mut result = Ok(());
    for (index, field) in layout.fields.iter().enumerate() {
        out.push(format!("local.get {}", local));
        out.push(format!("i32.const {}", index as i32 * WORD_SIZE));
        out.push("i32.add".to_string());
        result = gen_expression(compiler, &field.init, out);
        if result.is_err() {
            break;
        }
        out.push("i32.store".to_string());
    }

    compiler.constructing.pop();
    compiler.self_local = outer_self;
    compiler.exit_construction();
    result?;

    out.push(format!("local.get {}", local));
    Ok(())
}

fn receiver_class(object: &TypedExpr) -> Result<&str, Error> {
    object.get_type().class_name().ok_or_else(|| {
        invariant(
            format!("member access on a value of type `{}`", object.get_type()),
            object.span.start.clone(),
        )
    })
}

pub fn field_offset(
    compiler: &Compiler,
    expression: &TypedExpr,
    class: &str,
    field: &str,
) -> Result<i32, Error> {
    compiler
        .layout(class, &expression.span.start)?
        .offsets
        .get(field)
        .copied()
        .ok_or_else(|| {
            invariant(
                format!("class `{}` has no field `{}`", class, field),
                expression.span.start.clone(),
            )
        })
}
