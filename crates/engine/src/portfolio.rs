use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// A quantity of one token held by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub token: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    pub token: String,
    pub quantity: f64,
    pub price: f64,
    pub value: f64,
    /// Share of the total priced value, in `[0, 1]`.
    pub weight: f64,
}

/// Value aggregation only: no cost basis, no P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub positions: Vec<PositionValue>,
    pub total_value: f64,
    /// Held tokens with no price history.
    pub unpriced: Vec<String>,
}

/// Price every holding with `price_of` and compute weights.
pub fn value_holdings<F>(holdings: &[Holding], price_of: F) -> Result<PortfolioValuation>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut positions = Vec::new();
    let mut unpriced = Vec::new();

    for holding in holdings {
        if !holding.quantity.is_finite() || holding.quantity < 0.0 {
            return Err(Error::InvalidInput(format!(
                "quantity for {} must be non-negative, got {}",
                holding.token, holding.quantity
            )));
        }
        match price_of(&holding.token) {
            Some(price) => positions.push(PositionValue {
                token: holding.token.clone(),
                quantity: holding.quantity,
                price,
                value: holding.quantity * price,
                weight: 0.0,
            }),
            None => unpriced.push(holding.token.clone()),
        }
    }

    let total_value: f64 = positions.iter().map(|p| p.value).sum();
    if total_value > 0.0 {
        for p in &mut positions {
            p.weight = p.value / total_value;
        }
    }

    Ok(PortfolioValuation {
        positions,
        total_value,
        unpriced,
    })
}
