use serde::{Deserialize, Serialize};

/// One tracked position. `cost_basis` is the average price paid per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub cost_basis: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub symbol: String,
    pub quantity: f64,
    pub cost: f64,
    /// `None` while no price is known for the symbol
    pub market_value: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioValuation {
    pub positions: Vec<HoldingValuation>,
    /// Totals cover priced positions only
    pub total_cost: f64,
    pub total_value: f64,
    pub unpriced: usize,
}

impl PortfolioValuation {
    pub fn value<F>(holdings: &[Holding], price_of: F) -> Self
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut valuation = Self::default();
        for h in holdings {
            let cost = h.quantity * h.cost_basis;
            let market_value = price_of(&h.symbol).map(|p| p * h.quantity);
            let pnl = market_value.map(|v| v - cost);
            let pnl_pct = pnl.and_then(|p| (cost != 0.0).then(|| p / cost * 100.0));

            match market_value {
                Some(v) => {
                    valuation.total_cost += cost;
                    valuation.total_value += v;
                }
                None => valuation.unpriced += 1,
            }
            valuation.positions.push(HoldingValuation {
                symbol: h.symbol.clone(),
                quantity: h.quantity,
                cost,
                market_value,
                pnl,
                pnl_pct,
            });
        }
        valuation
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_value - self.total_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, quantity: f64, cost_basis: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity,
            cost_basis,
        }
    }

    #[test]
    fn values_priced_and_counts_unpriced() {
        let holdings = vec![holding("BTCUSDT", 0.5, 40_000.0), holding("FOOUSDT", 3.0, 1.0)];
        let v = PortfolioValuation::value(&holdings, |s| (s == "BTCUSDT").then_some(50_000.0));

        assert_eq!(v.unpriced, 1);
        assert_eq!(v.total_cost, 20_000.0);
        assert_eq!(v.total_value, 25_000.0);
        assert_eq!(v.total_pnl(), 5_000.0);
        assert_eq!(v.positions[0].pnl_pct, Some(25.0));
        assert_eq!(v.positions[1].market_value, None);
    }

    #[test]
    fn zero_cost_has_no_percentage() {
        let v = PortfolioValuation::value(&[holding("AIRDROPUSDT", 100.0, 0.0)], |_| Some(0.1));
        assert_eq!(v.positions[0].pnl, Some(10.0));
        assert_eq!(v.positions[0].pnl_pct, None);
    }
}
