pub mod dashboard;
pub mod price_cards;
pub mod price_chart;
pub mod sign_in;
pub mod timeframe_tabs;
