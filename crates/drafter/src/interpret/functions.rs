//! Math functions and constants available inside expressions.

use std::f64::consts;

use drafter_core::{Error, Result};

/// Named constants, looked up after the scope.
pub(super) fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(consts::PI),
        "E" => Some(consts::E),
        _ => None,
    }
}

fn unary(name: &str) -> Option<fn(f64) -> f64> {
    let function: fn(f64) -> f64 = match name {
        "abs" => f64::abs,
        "sqrt" => f64::sqrt,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "asin" => f64::asin,
        "acos" => f64::acos,
        "atan" => f64::atan,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => f64::round,
        "rad" => f64::to_radians,
        "deg" => f64::to_degrees,
        _ => return None,
    };
    Some(function)
}

fn binary(name: &str) -> Option<fn(f64, f64) -> f64> {
    let function: fn(f64, f64) -> f64 = match name {
        "atan2" => f64::atan2,
        "hypot" => f64::hypot,
        _ => return None,
    };
    Some(function)
}

fn arity_error(name: &str, expected: &str, found: usize) -> Error {
    Error::Expression(format!(
        "`{name}` takes {expected} argument(s), found {found}"
    ))
}

/// Call the math function `name`. Trigonometry works in radians.
pub(super) fn call(name: &str, args: &[f64]) -> Result<f64> {
    if let Some(function) = unary(name) {
        return match args {
            [x] => Ok(function(*x)),
            _ => Err(arity_error(name, "1", args.len())),
        };
    }
    if let Some(function) = binary(name) {
        return match args {
            [a, b] => Ok(function(*a, *b)),
            _ => Err(arity_error(name, "2", args.len())),
        };
    }
    match name {
        "min" | "max" if args.is_empty() => Err(arity_error(name, "at least 1", 0)),
        "min" => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        _ => Err(Error::Expression(format!("unknown function `{name}`"))),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_unary_functions() {
        assert_approx_eq!(f64, call("sqrt", &[16.0]).unwrap(), 4.0);
        assert_approx_eq!(f64, call("deg", &[consts::PI]).unwrap(), 180.0);
        assert_approx_eq!(f64, call("cos", &[0.0]).unwrap(), 1.0);
        assert_approx_eq!(f64, call("round", &[2.5]).unwrap(), 3.0);
    }

    #[test]
    fn test_binary_and_variadic() {
        assert_approx_eq!(f64, call("hypot", &[3.0, 4.0]).unwrap(), 5.0);
        assert_approx_eq!(f64, call("atan2", &[1.0, 1.0]).unwrap(), consts::FRAC_PI_4);
        assert_approx_eq!(f64, call("min", &[3.0, -1.0, 2.0]).unwrap(), -1.0);
        assert_approx_eq!(f64, call("max", &[3.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(call("sqrt", &[1.0, 2.0]), Err(Error::Expression(_))));
        assert!(matches!(call("max", &[]), Err(Error::Expression(_))));
        assert!(matches!(call("wobble", &[1.0]), Err(Error::Expression(_))));
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("PI"), Some(consts::PI));
        assert_eq!(constant("pi"), None);
    }
}
