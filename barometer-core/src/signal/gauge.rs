//! Buy / Hold / Sell classification of the latest forward Sharpe.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::compose::SignalSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zone::Buy => "Buy",
            Zone::Hold => "Hold",
            Zone::Sell => "Sell",
        };
        f.write_str(label)
    }
}

/// Zone boundaries: below `buy_below` is Buy, above `sell_above` is Sell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeThresholds {
    pub buy_below: f64,
    pub sell_above: f64,
}

impl Default for GaugeThresholds {
    fn default() -> Self {
        Self {
            buy_below: 0.3,
            sell_above: 0.7,
        }
    }
}

impl GaugeThresholds {
    pub fn classify(&self, value: f64) -> Zone {
        if value < self.buy_below {
            Zone::Buy
        } else if value <= self.sell_above {
            Zone::Hold
        } else {
            Zone::Sell
        }
    }
}

/// The dial reading shown next to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    pub date: chrono::NaiveDate,
    /// Latest forward Sharpe rounded to two decimals.
    pub value: f64,
    pub zone: Zone,
}

/// `None` means "no data": the series is empty or has no defined value.
pub fn read_gauge(series: &SignalSeries, thresholds: &GaugeThresholds) -> Option<GaugeReading> {
    let latest = series.latest()?;
    let value = (latest.forward_sharpe? * 100.0).round() / 100.0;
    Some(GaugeReading {
        date: latest.date,
        value,
        zone: thresholds.classify(value),
    })
}
