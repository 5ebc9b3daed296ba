//! Arithmetic tools.
//!
//! Division is the only operation with a domain error: a zero divisor is
//! reported as a structured error, never folded into a numeric result.

use crate::error::{Result, SvarError};

/// Add two integers.
pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Subtract the second integer from the first.
pub fn subtract(a: i64, b: i64) -> i64 {
    a - b
}

/// Multiply two integers.
pub fn multiply(a: i64, b: i64) -> i64 {
    a * b
}

/// Divide the first integer by the second.
pub fn divide(a: i64, b: i64) -> Result<f64> {
    if b == 0 {
        return Err(SvarError::DivisionByZero);
    }
    Ok(a as f64 / b as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(add(5, 3), 8);
        assert_eq!(subtract(5, 3), 2);
        assert_eq!(multiply(5, 3), 15);
    }

    #[test]
    fn test_divide() {
        let result = divide(5, 3).unwrap();
        assert!((result - 5.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(divide(-6, 2).unwrap(), -3.0);
    }

    #[test]
    fn test_divide_by_zero() {
        match divide(5, 0) {
            Err(SvarError::DivisionByZero) => {}
            other => panic!("Expected DivisionByZero, got {:?}", other),
        }
    }
}
