//! Smoother: trailing rolling mean over every field except price.
//!
//! The first `window - 1` rows have no full window and are dropped, so a
//! gap-free input of length `n` yields `n - window + 1` rows. Price is carried
//! through unsmoothed.

use tracing::debug;

use super::series::Observation;
use super::SignalError;

/// Trailing mean over `window` values. A NaN or infinite value anywhere in the
/// window gives NaN, as do the first `window - 1` positions.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut gap_count = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            gap_count += 1;
        } else {
            sum += v;
        }
        if i >= window {
            let leaving = values[i - window];
            if !leaving.is_finite() {
                gap_count -= 1;
            } else {
                sum -= leaving;
            }
        }
        if i + 1 >= window && gap_count == 0 {
            result[i] = sum / window as f64;
        }
    }
    result
}

/// Forward-fill NaN values from the last non-NaN value above.
fn forward_fill(values: &mut [f64]) {
    let mut last: Option<f64> = None;
    for v in values.iter_mut() {
        if v.is_nan() {
            if let Some(prev) = last {
                *v = prev;
            }
        } else {
            last = Some(*v);
        }
    }
}

/// Smooth a series of observations with a trailing window.
pub fn smooth(observations: &[Observation], window: usize) -> Result<Vec<Observation>, SignalError> {
    if window == 0 {
        return Err(SignalError::InvalidLookback(window));
    }

    // Column-major: index 0 is price and stays raw.
    let mut columns: Vec<Vec<f64>> = (0..7)
        .map(|c| observations.iter().map(|o| o.values()[c]).collect())
        .collect();
    for column in columns.iter_mut().skip(1) {
        *column = rolling_mean(column, window);
    }
    for column in columns.iter_mut() {
        forward_fill(column);
    }

    let smoothed: Vec<Observation> = observations
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let mut values = [0.0; 7];
            for (slot, column) in values.iter_mut().zip(&columns) {
                *slot = column[i];
            }
            Observation::from_values(o.date, values)
        })
        .filter(Observation::is_complete)
        .collect();

    debug!(
        window,
        input = observations.len(),
        output = smoothed.len(),
        "smoothed series"
    );

    Ok(smoothed)
}
