mod order;
mod position;
mod snapshot;
mod transaction;
mod wallet;

pub use order::{BuyOrder, SellOrder};
pub use position::{AssetType, Market, Position, PositionTotals};
pub use snapshot::{HistoryPeriod, PeriodPnL, PortfolioSnapshot};
pub use transaction::{Transaction, TransactionFilter, TransactionType};
pub use wallet::{Wallet, WalletSummary};
