pub mod snapshot_service;
pub mod wallet_service;
