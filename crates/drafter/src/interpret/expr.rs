//! Evaluation of argument trees and expressions against a scope.

use indexmap::IndexMap;

use drafter_core::{Entity, Error, Result, Value, entity::Polycurve};
use drafter_parser::{Arg, BinaryOp, Expr, ExprKind, Literal, UnaryOp};

use super::{Scope, functions};

fn type_error(message: String) -> Error {
    Error::Expression(message)
}

/// Convert a literal from the document into a value.
pub(crate) fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::List(items) => Value::List(items.iter().map(literal_value).collect()),
        Literal::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), literal_value(item)))
                .collect(),
        ),
    }
}

/// Evaluate an argument tree element-wise.
pub(crate) fn eval_arg(arg: &Arg, scope: &Scope) -> Result<Value> {
    match arg {
        Arg::Literal(literal) => Ok(literal_value(literal)),
        Arg::Expr(expr) => eval(expr, scope),
        Arg::List(items) => items
            .iter()
            .map(|item| eval_arg(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Arg::Map(entries) => entries
            .iter()
            .map(|(key, item)| Ok((key.clone(), eval_arg(item, scope)?)))
            .collect::<Result<IndexMap<_, _>>>()
            .map(Value::Map),
    }
}

/// Evaluate an expression.
pub(crate) fn eval(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr.kind() {
        ExprKind::Null => Ok(Value::Null),
        ExprKind::Bool(b) => Ok(Value::Bool(*b)),
        ExprKind::Number(n) => Ok(Value::Number(*n)),
        ExprKind::Str(s) => Ok(Value::Str(s.clone())),
        ExprKind::Variable(name) => scope.lookup(name),
        ExprKind::List(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        ExprKind::Unary { op, operand } => unary(*op, eval(operand, scope)?),
        ExprKind::Binary { op, lhs, rhs } => binary(*op, lhs, rhs, scope),
        ExprKind::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval(condition, scope)?.is_truthy() {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
        ExprKind::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| number(&eval(arg, scope)?, function))
                .collect::<Result<Vec<_>>>()?;
            functions::call(function, &args).map(Value::Number)
        }
        ExprKind::Index { target, index } => {
            let target = eval(target, scope)?;
            let index = eval(index, scope)?;
            self::index(target, &index)
        }
        ExprKind::Member { target, name } => member(eval(target, scope)?, name),
    }
}

fn number(value: &Value, context: &str) -> Result<f64> {
    value.as_number().ok_or_else(|| {
        type_error(format!(
            "`{context}` expects a number, found {}",
            value.type_name()
        ))
    })
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match op {
        UnaryOp::Negate => number(&value, "-").map(|n| Value::Number(-n)),
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

fn binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, scope: &Scope) -> Result<Value> {
    // Logical operators short-circuit.
    match op {
        BinaryOp::And => {
            let result = eval(lhs, scope)?.is_truthy() && eval(rhs, scope)?.is_truthy();
            return Ok(Value::Bool(result));
        }
        BinaryOp::Or => {
            let result = eval(lhs, scope)?.is_truthy() || eval(rhs, scope)?.is_truthy();
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    let lhs = eval(lhs, scope)?;
    let rhs = eval(rhs, scope)?;
    match (op, lhs, rhs) {
        (BinaryOp::Equal, a, b) => Ok(Value::Bool(a == b)),
        (BinaryOp::NotEqual, a, b) => Ok(Value::Bool(a != b)),
        (BinaryOp::Add, Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
        (BinaryOp::Add, a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (BinaryOp::Add, Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual,
            Value::Str(a),
            Value::Str(b),
        ) => Ok(Value::Bool(compare(op, a.cmp(&b)))),
        (op, Value::Number(a), Value::Number(b)) => arithmetic(op, a, b),
        (op, a, b) => Err(type_error(format!(
            "cannot apply `{op}` to {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEqual => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}

fn arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide | BinaryOp::Remainder if b == 0.0 => {
            return Err(type_error("division by zero".to_string()));
        }
        BinaryOp::Divide => a / b,
        BinaryOp::Remainder => a % b,
        BinaryOp::Power => a.powf(b),
        BinaryOp::Less => return Ok(Value::Bool(a < b)),
        BinaryOp::LessEqual => return Ok(Value::Bool(a <= b)),
        BinaryOp::Greater => return Ok(Value::Bool(a > b)),
        BinaryOp::GreaterEqual => return Ok(Value::Bool(a >= b)),
        BinaryOp::Equal => return Ok(Value::Bool(a == b)),
        BinaryOp::NotEqual => return Ok(Value::Bool(a != b)),
        BinaryOp::And => return Ok(Value::Bool(a != 0.0 && b != 0.0)),
        BinaryOp::Or => return Ok(Value::Bool(a != 0.0 || b != 0.0)),
    };
    Ok(Value::Number(n))
}

fn index(target: Value, index: &Value) -> Result<Value> {
    match (target, index) {
        (Value::List(mut items), Value::Number(n)) => {
            let len = items.len();
            if n.fract() != 0.0 || *n < 0.0 || *n as usize >= len {
                return Err(type_error(format!(
                    "index {n} out of range for a list of {len}"
                )));
            }
            Ok(items.swap_remove(*n as usize))
        }
        (Value::Map(mut entries), Value::Str(key)) => entries
            .swap_remove(key.as_str())
            .ok_or_else(|| type_error(format!("map has no key `{key}`"))),
        (target, index) => Err(type_error(format!(
            "cannot index {} with {}",
            target.type_name(),
            index.type_name()
        ))),
    }
}

fn point_list(points: impl IntoIterator<Item = drafter_core::geometry::Point>) -> Value {
    Value::List(points.into_iter().map(Value::from).collect())
}

fn entity_member(entity: &Entity, name: &str) -> Option<Value> {
    let value = match (entity, name) {
        (Entity::Point { position }, "x") => Value::Number(position.x()),
        (Entity::Point { position }, "y") => Value::Number(position.y()),
        (Entity::Segment { start, .. }, "start") => Value::from(*start),
        (Entity::Segment { end, .. }, "end") => Value::from(*end),
        (Entity::Segment { start, end }, "length") => Value::Number(start.distance(*end)),
        (Entity::Circle { center, .. } | Entity::Arc { center, .. }, "center") => {
            Value::from(*center)
        }
        (Entity::Circle { radius, .. } | Entity::Arc { radius, .. }, "radius") => {
            Value::Number(*radius)
        }
        (Entity::Arc { start_angle, .. }, "start_angle") => Value::Number(*start_angle),
        (Entity::Arc { end_angle, .. }, "end_angle") => Value::Number(*end_angle),
        (Entity::Polycurve(curve), "vertices") => point_list(curve.vertices().iter().copied()),
        (Entity::Polycurve(curve), "closed") => Value::Bool(curve.is_closed()),
        (Entity::Polycurve(curve), "edges") => Value::List(edges(curve)),
        (Entity::Polyface(face), "outer") => match face.outer() {
            Some(curve) => Value::Entity(Entity::Polycurve(curve.clone())),
            None => Value::Null,
        },
        (Entity::Polyface(face), "holes") => Value::List(
            face.holes()
                .iter()
                .map(|curve| Value::Entity(Entity::Polycurve(curve.clone())))
                .collect(),
        ),
        (Entity::Text { position, .. }, "position") => Value::from(*position),
        (Entity::Text { content, .. }, "content") => Value::Str(content.clone()),
        (Entity::Text { size, .. }, "size") => Value::Number(*size),
        (_, "vertices") => point_list(entity.anchor_points()),
        (_, "kind") => Value::from(entity.kind()),
        _ => return None,
    };
    Some(value)
}

fn edges(curve: &Polycurve) -> Vec<Value> {
    curve
        .edges()
        .map(|(start, end, _)| Value::Entity(Entity::Segment { start, end }))
        .collect()
}

/// Member access. Sketches expose `shape`, `name`, `entities` and
/// `children`; other names fall through to the sketch's first entity.
fn member(target: Value, name: &str) -> Result<Value> {
    let missing = |target: &Value| {
        type_error(format!("{} has no member `{name}`", target.type_name()))
    };
    match target {
        Value::Sketch(sketch) => match name {
            "shape" => Ok(Value::Entity(sketch.first_entity()?.clone())),
            "name" => Ok(Value::from(sketch.node().name())),
            "entities" => Ok(Value::List(
                sketch
                    .node()
                    .entities()
                    .iter()
                    .cloned()
                    .map(Value::Entity)
                    .collect(),
            )),
            "children" => Ok(Value::List(
                sketch
                    .node()
                    .children()
                    .iter()
                    .map(|child| Value::Sketch(sketch.with_node(child.clone())))
                    .collect(),
            )),
            _ => {
                let entity = sketch.first_entity()?;
                entity_member(entity, name).ok_or_else(|| missing(&Value::Entity(entity.clone())))
            }
        },
        Value::Entity(ref entity) => entity_member(entity, name).ok_or_else(|| missing(&target)),
        Value::Map(mut entries) => entries
            .swap_remove(name)
            .ok_or_else(|| type_error(format!("map has no key `{name}`"))),
        Value::List(ref items) if name == "length" => Ok(Value::Number(items.len() as f64)),
        Value::Str(ref s) if name == "length" => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(missing(&other)),
    }
}
