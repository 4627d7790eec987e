//! Kraken module - REST client for Kraken's public and private API

pub mod auth;
pub mod errors;
pub mod messages;
pub mod rest;

pub use rest::KrakenRestClient;
