use serde::{Deserialize, Serialize};

// Point-in-time valuation of a wallet, used for historical charting.
// Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub id: uuid::Uuid,
    pub wallet_id: uuid::Uuid,
    /// Cash plus current value of all open positions.
    pub total_value: f64,
    pub invested_value: f64,
    pub available_balance: f64,
    /// Unrealized P&L over open positions; realized P&L already lives in
    /// the balance via sale proceeds.
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Named lookback window for snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "1Y")]
    Year,
    #[serde(rename = "MAX")]
    Max,
}

impl HistoryPeriod {
    /// Inclusive lower bound of the window, `None` for MAX.
    pub fn start_from(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            HistoryPeriod::Week => Some(now - chrono::Duration::days(7)),
            HistoryPeriod::Month => Some(now - chrono::Duration::days(30)),
            HistoryPeriod::Year => Some(now - chrono::Duration::days(365)),
            HistoryPeriod::Max => None,
        }
    }
}

impl std::str::FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1W" => Ok(HistoryPeriod::Week),
            "1M" => Ok(HistoryPeriod::Month),
            "1Y" => Ok(HistoryPeriod::Year),
            "MAX" => Ok(HistoryPeriod::Max),
            other => Err(format!("Unknown period: {other}")),
        }
    }
}

/// Change in total value between the oldest and newest snapshot of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodPnL {
    pub change: f64,
    pub percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("1w".parse::<HistoryPeriod>(), Ok(HistoryPeriod::Week));
        assert_eq!("MAX".parse::<HistoryPeriod>(), Ok(HistoryPeriod::Max));
        assert!("2W".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn max_period_has_no_lower_bound() {
        assert!(HistoryPeriod::Max.start_from(chrono::Utc::now()).is_none());
    }

    #[test]
    fn week_window_starts_seven_days_back() {
        let now = chrono::Utc::now();
        let start = HistoryPeriod::Week.start_from(now).unwrap();
        assert_eq!(now - start, chrono::Duration::days(7));
    }
}
