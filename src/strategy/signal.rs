//! Turning prices into training labels and predictions into trades.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::LearnerError;

/// Trading action derived from a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Positive predictions buy, negative ones sell, zero holds.
    pub fn from_prediction(prediction: f64) -> Self {
        if prediction > 0.0 {
            Signal::Buy
        } else if prediction < 0.0 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Class label used for training: 1, -1 or 0.
    pub fn label(self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Sell => -1.0,
            Signal::Hold => 0.0,
        }
    }
}

/// Parameters for labelling a price series by its forward return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    lookahead: usize,
    critical: f64,
    impact: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalParams {
    pub fn new() -> Self {
        Self {
            lookahead: 5,
            critical: 0.02,
            impact: 0.0,
        }
    }

    pub fn set_lookahead(&mut self, lookahead: usize) -> Result<(), LearnerError> {
        if lookahead < 1 {
            return Err(LearnerError::InvalidParameter {
                name: "lookahead",
                reason: "must be at least 1".into(),
            });
        }
        self.lookahead = lookahead;
        Ok(())
    }

    /// Minimum absolute forward return, before market impact, that counts
    /// as a move.
    pub fn set_critical(&mut self, critical: f64) -> Result<(), LearnerError> {
        if !critical.is_finite() || critical < 0.0 {
            return Err(LearnerError::InvalidParameter {
                name: "critical",
                reason: format!("must be a non-negative number, got {critical}"),
            });
        }
        self.critical = critical;
        Ok(())
    }

    pub fn set_impact(&mut self, impact: f64) -> Result<(), LearnerError> {
        if !impact.is_finite() || impact < 0.0 {
            return Err(LearnerError::InvalidParameter {
                name: "impact",
                reason: format!("must be a non-negative number, got {impact}"),
            });
        }
        self.impact = impact;
        Ok(())
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Forward return above which a day is labelled as a buy.
    pub fn buy_threshold(&self) -> f64 {
        self.critical + self.impact
    }

    /// Forward return below which a day is labelled as a sell.
    pub fn sell_threshold(&self) -> f64 {
        -(self.critical + self.impact)
    }
}

/// Labels each day by the return `lookahead` days later: 1 above the buy
/// threshold, -1 below the sell threshold, 0 otherwise.
///
/// The output has `prices.len() - lookahead` entries, aligned with the first
/// days of `prices`.
///
/// # Errors
///
/// Fails when there are no more prices than `lookahead`, or when a base
/// price is zero.
pub fn label_forward_returns(
    prices: &[f64],
    params: &SignalParams,
) -> Result<DVector<f64>, LearnerError> {
    let lookahead = params.lookahead();
    if prices.len() <= lookahead {
        return Err(LearnerError::InvalidParameter {
            name: "prices",
            reason: format!(
                "need more than {lookahead} prices, got {}",
                prices.len()
            ),
        });
    }

    let labels = prices
        .windows(lookahead + 1)
        .map(|window| {
            let (base, future) = (window[0], window[lookahead]);
            if base == 0.0 {
                return Err(LearnerError::InvalidParameter {
                    name: "prices",
                    reason: "base price is zero".into(),
                });
            }
            let ratio = (future - base) / base;
            let signal = if ratio > params.buy_threshold() {
                Signal::Buy
            } else if ratio < params.sell_threshold() {
                Signal::Sell
            } else {
                Signal::Hold
            };
            Ok(signal.label())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DVector::from_vec(labels))
}

/// Converts a signal per day into the share change to trade that day.
///
/// Positions are short, flat or long by `unit` shares. A buy opens or flips
/// to long, a sell opens or flips to short, a hold goes flat. The last day
/// only closes whatever position is open.
pub fn target_trades(signals: &[Signal], unit: f64) -> Vec<f64> {
    let mut trades = vec![0.0; signals.len()];
    let Some(last) = signals.len().checked_sub(1) else {
        return trades;
    };

    let mut position = 0.0;
    for (day, signal) in signals[..last].iter().enumerate() {
        let target = match signal {
            Signal::Buy => unit,
            Signal::Sell => -unit,
            Signal::Hold => 0.0,
        };
        trades[day] = target - position;
        position = target;
    }
    trades[last] = -position;
    trades
}
