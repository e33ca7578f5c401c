//! Configuration structures for the client.
//!
//! [`EndpointConfig`] identifies the RPC and subscription endpoints of one
//! node; [`ChainConfig`] carries the persisted per-chain tuning fields
//! (poll periods, transaction timeout, preflight and commitment settings).

mod chain;
pub use chain::*;

mod endpoint;
pub use endpoint::*;
