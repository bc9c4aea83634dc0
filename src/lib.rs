pub mod book;
pub mod config;
pub mod errors;
pub mod external;
pub mod jobs;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

pub use book::{PositionBook, SellOutcome};
pub use config::EngineConfig;
pub use errors::EngineError;
pub use ledger::TransactionLedger;
pub use models::{
    AssetType, BuyOrder, HistoryPeriod, Market, PeriodPnL, PortfolioSnapshot, Position,
    PositionTotals, SellOrder, Transaction, TransactionFilter, TransactionType, Wallet,
    WalletSummary,
};
pub use services::wallet_service::{ExecutedOrder, PriceRefreshReport, ValuationEngine};
