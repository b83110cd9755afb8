//! # clientpool
//!
//! Bounded, thread-safe pool of reusable HTTP client handles, used to
//! amortize connection setup across repeated outbound requests in load
//! generation and benchmarking runs.
//!
//! ## Features
//!
//! - Lock-free bounded buffer; `get` and `put` never block
//! - Factory-backed: an empty pool creates clients on demand
//! - Overflowing returns are released instead of queued
//! - Idempotent shutdown that releases every idle client
//! - RAII checkout guard
//! - `reqwest::Client` factory driven by [`HttpClientConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use clientpool::ClientPool;
//!
//! let pool = ClientPool::new(1, 10, reqwest::Client::new).unwrap();
//! {
//!     let client = pool.checkout();
//!     let _request = client.get("http://localhost:8080/health");
//!     // Client goes back to the pool when `client` goes out of scope
//! }
//! assert_eq!(pool.len(), 1);
//! pool.shutdown();
//! ```

mod pool;
mod config;
mod handle;
mod http;
mod errors;
pub mod logging;

pub use pool::{ClientPool, PooledClient, PoolState};
pub use config::{HttpClientConfig, PoolConfiguration};
pub use handle::{ClientHandle, Factory};
pub use http::HttpClientFactory;
pub use errors::{PoolError, PoolResult, ReleaseError};
