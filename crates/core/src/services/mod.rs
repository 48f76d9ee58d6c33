pub mod analytics_service;
pub mod currency_service;
pub mod portfolio_service;
pub mod projection_service;
pub mod quote_service;
pub mod validation_service;
pub mod valuation_service;
