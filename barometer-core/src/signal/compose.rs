//! Signal composer: smoothed observations → derived fields → forward Sharpe.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::policy::{IndexKind, ScalingPolicy};
use super::rate::required_return;
use super::series::Observation;

/// Every intermediate of the derivation for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub price: f64,
    /// `(1 - payout/100) * roe`, in percent.
    pub growth_rate: f64,
    /// Implied required return in percent; `None` where the quadratic has no real root.
    pub required_return: Option<f64>,
    pub equity_risk_premium: Option<f64>,
    pub raw_sharpe: Option<f64>,
    pub forward_sharpe: Option<f64>,
}

/// One point of the chart-ready output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub forward_sharpe: Option<f64>,
}

/// Price vs forward Sharpe for one index, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub index: IndexKind,
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point with a defined forward Sharpe.
    pub fn latest(&self) -> Option<&SignalPoint> {
        self.points.iter().rev().find(|p| p.forward_sharpe.is_some())
    }
}

pub fn growth_rate(payout_ratio: f64, roe: f64) -> f64 {
    (1.0 - payout_ratio / 100.0) * roe
}

/// Derive every field for one smoothed observation.
pub fn derive_row(obs: &Observation, policy: &ScalingPolicy) -> DerivedRow {
    let growth = growth_rate(obs.payout_ratio, obs.roe);
    let required = required_return(obs.price, growth, obs.dividend_current, obs.dividend_next);
    let erp = required.map(|r| r - obs.reference_rate);
    let raw = erp.map(|e| e / obs.volatility).filter(|v| !v.is_nan());
    DerivedRow {
        date: obs.date,
        price: obs.price,
        growth_rate: growth,
        required_return: required,
        equity_risk_premium: erp,
        raw_sharpe: raw,
        forward_sharpe: raw.and_then(|v| policy.apply(v)),
    }
}

pub fn compose(observations: &[Observation], policy: &ScalingPolicy) -> Vec<DerivedRow> {
    observations.iter().map(|o| derive_row(o, policy)).collect()
}

/// Keep only the chart columns.
pub fn to_signal_series(index: IndexKind, rows: &[DerivedRow]) -> SignalSeries {
    SignalSeries {
        index,
        points: rows
            .iter()
            .map(|r| SignalPoint {
                date: r.date,
                price: r.price,
                forward_sharpe: r.forward_sharpe,
            })
            .collect(),
    }
}
