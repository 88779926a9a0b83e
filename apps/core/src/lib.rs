pub mod action_executor;
pub mod command_table;
pub mod config;
pub mod contract;
pub mod discovery;
pub mod host;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod ranking;
pub mod runtime;
pub mod search;
pub mod session;
pub mod symbols;
pub mod transport;

