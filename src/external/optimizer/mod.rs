//! Client for the remote route optimization engine.

mod client;
mod contract;
mod error;
mod wire;

pub use client::{
    DynOptimizerClient, HttpOptimizerClient, OptimizerClient, OptimizerClientConfig,
    DEFAULT_ENDPOINT, DEFAULT_RETRY_DELAYS_MS, DEFAULT_TIMEOUT,
};
pub use contract::{DistanceMatrix, OptimizerRequest, OptimizerResponse};
pub use error::{OptimizerClientError, OptimizerErrorCode};
pub use wire::{WireDiagnostics, WireOptions, WireOrderedStop, WireRequest, WireResponse};
