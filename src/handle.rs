//! Client handles and the factory that produces them

use crate::errors::ReleaseError;
use std::sync::Arc;

/// A reusable network client that the pool can hand out and tear down.
///
/// `release` is called when the pool discards a handle: on overflow, on a
/// late return after shutdown, and while draining at shutdown. The default
/// simply drops the handle.
pub trait ClientHandle: Send + Sized + 'static {
    /// Tear down the handle's transport resources
    fn release(self) -> Result<(), ReleaseError> {
        drop(self);
        Ok(())
    }
}

/// Dropping the last clone of a `reqwest::Client` closes its idle connections.
impl ClientHandle for reqwest::Client {}

/// Function producing a fresh client handle
pub type Factory<C> = Arc<dyn Fn() -> C + Send + Sync>;

pub(crate) fn release_client<C: ClientHandle>(client: C) {
    if let Err(err) = client.release() {
        tracing::warn!("{}", err);
    }
}
