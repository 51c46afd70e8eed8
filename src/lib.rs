// Library crate exposing modules for integration tests

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod repository;
pub mod util;
