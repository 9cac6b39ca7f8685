pub mod backtest;
pub mod cli;
pub mod commands;
pub mod data;
pub mod discovery;
pub mod ledger;
pub mod types;
