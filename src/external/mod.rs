pub mod cached;
pub mod price_source;
pub mod simulated;
