pub mod account;
pub mod app;
pub mod bidding;
pub mod config;
pub mod database;
pub mod delivery;
pub mod error;
pub mod handlers;
pub mod message_broker;
pub mod project;
pub mod query;
pub mod review;
pub mod state;
pub mod storage;
