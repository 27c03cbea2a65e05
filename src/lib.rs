pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod distance_service;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod fingerprint;
pub mod planning;
pub mod repository;
pub mod server;
pub mod validation;

#[cfg(test)]
mod test_support;
