//! Valuation-rate solver.
//!
//! Inverts the two-stage dividend-discount identity for the implied required
//! rate of return. With `x = r/100` and `u = g/100` the identity is the quadratic
//!
//! ```text
//! P·x² + (P·(1 - u) - D1)·x + u·(D1 - P) - D0 = 0
//! ```
//!
//! and the solver returns the larger root, in percent. A negative discriminant
//! means there is no real rate; that element is `None`, never an error.

use super::SignalError;

/// Required return in percent, or `None` when no real finite solution exists.
///
/// `growth_pct` is a percentage (5.0 means 5%). `div_current` and `div_next`
/// are the current-year and next-year dividend estimates.
pub fn required_return(price: f64, growth_pct: f64, div_current: f64, div_next: f64) -> Option<f64> {
    let u = growth_pct / 100.0;
    let term = price * (1.0 - u);
    let disc = (term - div_next).powi(2) - 4.0 * price * (u * (div_next - price) - div_current);
    if disc.is_nan() || disc < 0.0 {
        return None;
    }
    let r = (div_next - term + disc.sqrt()) / (2.0 * price) * 100.0;
    r.is_finite().then_some(r)
}

/// One solver input: a single value broadcast to every row, or a column.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Series(&'a [f64]),
}

impl Operand<'_> {
    fn len(&self) -> Option<usize> {
        match self {
            Operand::Scalar(_) => None,
            Operand::Series(s) => Some(s.len()),
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            Operand::Scalar(v) => *v,
            Operand::Series(s) => s[i],
        }
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<&'a [f64]> for Operand<'a> {
    fn from(value: &'a [f64]) -> Self {
        Operand::Series(value)
    }
}

impl<'a> From<&'a Vec<f64>> for Operand<'a> {
    fn from(value: &'a Vec<f64>) -> Self {
        Operand::Series(value.as_slice())
    }
}

/// Element-wise `required_return` with scalar broadcasting.
///
/// All series operands must share one length; all-scalar input yields a
/// single element.
pub fn required_return_broadcast<'a>(
    price: impl Into<Operand<'a>>,
    growth_pct: impl Into<Operand<'a>>,
    div_current: impl Into<Operand<'a>>,
    div_next: impl Into<Operand<'a>>,
) -> Result<Vec<Option<f64>>, SignalError> {
    let ops = [
        price.into(),
        growth_pct.into(),
        div_current.into(),
        div_next.into(),
    ];

    let mut len: Option<usize> = None;
    for op in &ops {
        if let Some(n) = op.len() {
            match len {
                Some(m) if m != n => {
                    return Err(SignalError::ShapeMismatch {
                        expected: m,
                        actual: n,
                    })
                }
                _ => len = Some(n),
            }
        }
    }

    let n = len.unwrap_or(1);
    Ok((0..n)
        .map(|i| required_return(ops[0].at(i), ops[1].at(i), ops[2].at(i), ops[3].at(i)))
        .collect())
}
