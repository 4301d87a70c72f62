pub mod auth;
pub mod backpack;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod history;
pub mod logging;
pub mod prices;
pub mod server;
pub mod types;
