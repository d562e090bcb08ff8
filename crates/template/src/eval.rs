// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluates a parsed [`Expr`] against a strict `{flows, sources}` context.

use crate::ast::{CompareOp, Expr, PathSeg};
use crate::error::TemplateError;
use crate::filters;
use weft_core::Value;

/// The two namespaces visible to a template expression. Any other root
/// identifier is undefined by construction.
pub struct Context<'a> {
    pub flows: &'a Value,
    pub sources: &'a Value,
}

impl<'a> Context<'a> {
    pub fn new(flows: &'a Value, sources: &'a Value) -> Self {
        Self { flows, sources }
    }
}

pub fn eval(expr: &Expr, ctx: &Context<'_>) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Path { root, segs } => eval_path(root, segs, ctx),
        Expr::Concat(parts) => {
            let mut out = String::new();
            for part in parts {
                out.push_str(&eval(part, ctx)?.display_string());
            }
            Ok(Value::String(out))
        }
        Expr::Conditional { value, cond, else_ } => {
            if eval(cond, ctx)?.truthy() {
                eval(value, ctx)
            } else {
                eval(else_, ctx)
            }
        }
        Expr::Filter { base, name, args } => eval_filter(base, name, args, ctx),
        Expr::Compare { left, op, right } => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            eval_compare(&l, *op, &r)
        }
    }
}

fn eval_path(root: &str, segs: &[PathSeg], ctx: &Context<'_>) -> Result<Value, TemplateError> {
    let mut current = match root {
        "flows" => ctx.flows,
        "sources" => ctx.sources,
        other => {
            return Err(TemplateError::Undefined {
                path: other.to_string(),
            })
        }
    };
    let mut path = root.to_string();

    for seg in segs {
        let next = match seg {
            PathSeg::Field(name) => {
                path.push('.');
                path.push_str(name);
                current.get_member(name)
            }
            PathSeg::Index(expr) => {
                let index_value = eval(expr, ctx)?;
                path.push('[');
                path.push_str(&index_value.display_string());
                path.push(']');
                current.get_index(&index_value)
            }
        };
        match next {
            Some(v) => current = v,
            None => return Err(TemplateError::Undefined { path }),
        }
    }

    Ok(current.clone())
}

fn eval_filter(
    base: &Expr,
    name: &str,
    args: &[Expr],
    ctx: &Context<'_>,
) -> Result<Value, TemplateError> {
    if name == "default" {
        return match eval(base, ctx) {
            Err(TemplateError::Undefined { .. }) => {
                let arg = args.first().ok_or(TemplateError::FilterArity {
                    name: "default".to_string(),
                    expected: 1,
                    got: 0,
                })?;
                eval(arg, ctx)
            }
            other => other,
        };
    }

    let base_value = eval(base, ctx)?;
    let arg_values: Vec<Value> = args
        .iter()
        .map(|a| eval(a, ctx))
        .collect::<Result<_, _>>()?;
    filters::apply(name, base_value, &arg_values)
}

fn eval_compare(left: &Value, op: CompareOp, right: &Value) -> Result<Value, TemplateError> {
    use CompareOp::*;

    if matches!(op, Eq | Ne) {
        let equal = values_equal(left, right);
        return Ok(Value::Bool(if matches!(op, Eq) { equal } else { !equal }));
    }

    let ordering = match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => match (left, right) {
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => None,
        },
    };

    let ordering = ordering.ok_or_else(|| TemplateError::Incomparable {
        left: left.display_string(),
        op: format!("{op:?}"),
        right: right.display_string(),
    })?;

    let result = match op {
        Lt => ordering.is_lt(),
        Le => ordering.is_le(),
        Gt => ordering.is_gt(),
        Ge => ordering.is_ge(),
        Eq | Ne => unreachable!("handled above"),
    };
    Ok(Value::Bool(result))
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (numeric(l), numeric(r)) {
        (Some(a), Some(b)) => a == b,
        _ => l == r,
    }
}
