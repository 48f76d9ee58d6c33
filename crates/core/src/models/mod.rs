pub mod analytics;
pub mod goal;
pub mod holding;
pub mod portfolio;
pub mod projection;
pub mod quote;
pub mod rates;
pub mod settings;
pub mod valuation;
