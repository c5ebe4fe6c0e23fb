pub mod config;
pub mod error;
pub mod eth;
pub mod model;
pub mod queries;
pub mod repository;
pub mod router;
pub mod runtime;
pub mod server;
pub mod setup;
pub mod submission;
pub mod transaction;
pub mod utils;
pub mod view;
pub mod wallet;
