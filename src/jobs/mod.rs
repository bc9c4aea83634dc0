pub mod valuation_job;
