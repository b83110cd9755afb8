//! Core client pool implementation

use crate::config::{HttpClientConfig, PoolConfiguration};
use crate::errors::{PoolError, PoolResult};
use crate::handle::{release_client, ClientHandle, Factory};
use crate::http::HttpClientFactory;

use crossbeam::queue::ArrayQueue;
use parking_lot::RwLock;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Lifecycle of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Accepting `get` and `put`
    Open,

    /// Terminal; resident clients have been released
    Shutdown,
}

/// Bounded, thread-safe pool of reusable client handles.
///
/// Neither `get` nor `put` ever waits for capacity: an empty pool creates a
/// new client through the factory, and a full pool releases the returned
/// client instead of queueing it.
///
/// # Examples
///
/// ```
/// use clientpool::ClientPool;
///
/// let pool = ClientPool::new(2, 5, reqwest::Client::new).unwrap();
/// assert_eq!(pool.len(), 2);
///
/// let client = pool.get();
/// assert_eq!(pool.len(), 1);
///
/// pool.put(Some(client)).unwrap();
/// assert_eq!(pool.len(), 2);
///
/// assert!(pool.shutdown());
/// ```
pub struct ClientPool<C: ClientHandle> {
    clients: ArrayQueue<C>,
    factory: Factory<C>,
    state: RwLock<PoolState>,
}

impl<C: ClientHandle> ClientPool<C> {
    /// Create a pool holding at most `max_capacity` idle clients, filled
    /// with `initial_capacity` clients from `factory`.
    pub fn new<F>(initial_capacity: usize, max_capacity: usize, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        let config = PoolConfiguration::new()
            .with_initial_capacity(initial_capacity)
            .with_max_capacity(max_capacity);
        Self::with_config(config, factory)
    }

    /// Create a pool from a [`PoolConfiguration`]
    pub fn with_config<F>(config: PoolConfiguration, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        config.validate()?;

        let pool = Self {
            clients: ArrayQueue::new(config.max_capacity),
            factory: Arc::new(factory),
            state: RwLock::new(PoolState::Open),
        };

        for _ in 0..config.initial_capacity {
            let client = (pool.factory)();
            // Cannot overflow: initial_capacity <= max_capacity.
            if let Err(client) = pool.clients.push(client) {
                release_client(client);
            }
        }

        debug!(
            initial = config.initial_capacity,
            max = config.max_capacity,
            "client pool created"
        );
        Ok(pool)
    }

    /// Take an idle client, or create one if none is available
    pub fn get(&self) -> C {
        if let Some(client) = self.clients.pop() {
            return client;
        }

        if self.is_shutdown() {
            warn!("get() called on a shut down pool; returning an unpooled client");
        }
        (self.factory)()
    }

    /// Like [`get`](Self::get), but refuses to hand out clients after shutdown
    pub fn try_get(&self) -> PoolResult<C> {
        if self.is_shutdown() {
            return Err(PoolError::PoolClosed);
        }
        Ok(self.get())
    }

    /// Take a client wrapped in a guard that returns it on drop
    pub fn checkout(&self) -> PooledClient<'_, C> {
        PooledClient {
            client: Some(self.get()),
            pool: self,
        }
    }

    /// Return a client to the pool.
    ///
    /// `None` is rejected. When the pool is full or shut down the client is
    /// released and the call still succeeds.
    pub fn put(&self, client: Option<C>) -> PoolResult<()> {
        let client = client.ok_or(PoolError::RejectedNilHandle)?;

        // Held across the push so shutdown cannot drain in between.
        let state = self.state.read();
        if *state == PoolState::Shutdown {
            drop(state);
            release_client(client);
            return Ok(());
        }

        if let Err(client) = self.clients.push(client) {
            drop(state);
            trace!("client pool full, releasing returned client");
            release_client(client);
        }
        Ok(())
    }

    /// Number of idle clients currently held. Advisory under concurrency.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Maximum number of idle clients the pool keeps
    pub fn capacity(&self) -> usize {
        self.clients.capacity()
    }

    pub fn state(&self) -> PoolState {
        *self.state.read()
    }

    pub fn is_shutdown(&self) -> bool {
        self.state() == PoolState::Shutdown
    }

    /// Close the pool and release every idle client.
    ///
    /// Returns `true` for the call that performed the shutdown and `false`
    /// for any later call, which does nothing.
    pub fn shutdown(&self) -> bool {
        {
            let mut state = self.state.write();
            if *state == PoolState::Shutdown {
                return false;
            }
            *state = PoolState::Shutdown;
        }

        let mut released = 0usize;
        while let Some(client) = self.clients.pop() {
            release_client(client);
            released += 1;
        }
        debug!(released, "client pool shut down");
        true
    }
}

impl ClientPool<reqwest::Client> {
    /// Create a pool of `reqwest::Client` handles built from `http_config`
    ///
    /// # Examples
    ///
    /// ```
    /// use clientpool::{ClientPool, HttpClientConfig, PoolConfiguration};
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_initial_capacity(1)
    ///     .with_max_capacity(4);
    /// let pool = ClientPool::for_http(config, HttpClientConfig::default()).unwrap();
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn for_http(config: PoolConfiguration, http_config: HttpClientConfig) -> PoolResult<Self> {
        config.validate()?;
        let factory = HttpClientFactory::new(http_config)?;
        Self::with_config(config, move || factory.create())
    }
}

impl<C: ClientHandle> Drop for ClientPool<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A checked-out client that goes back to its pool when dropped
pub struct PooledClient<'a, C: ClientHandle> {
    client: Option<C>,
    pool: &'a ClientPool<C>,
}

impl<C: ClientHandle> PooledClient<'_, C> {
    /// Detach the client from the pool; it will not be returned on drop
    pub fn into_inner(mut self) -> Option<C> {
        self.client.take()
    }
}

impl<C: ClientHandle> Deref for PooledClient<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        match self.client.as_ref() {
            Some(client) => client,
            None => unreachable!("client is only taken by into_inner or drop"),
        }
    }
}

impl<C: ClientHandle> DerefMut for PooledClient<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.client.as_mut() {
            Some(client) => client,
            None => unreachable!("client is only taken by into_inner or drop"),
        }
    }
}

impl<C: ClientHandle> Drop for PooledClient<'_, C> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            let _ = self.pool.put(Some(client));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test_support::*;
    use std::thread;

    fn mock_pool(initial: usize, max: usize) -> (ClientPool<MockClient>, Arc<Tally>) {
        let tally = Arc::new(Tally::default());
        let pool = ClientPool::new(initial, max, mock_factory(Arc::clone(&tally))).unwrap();
        (pool, tally)
    }

    #[test]
    fn test_new_prefills_initial_capacity() {
        for (initial, max) in [(0, 1), (1, 1), (0, 5), (3, 5), (5, 5)] {
            let (pool, tally) = mock_pool(initial, max);
            assert_eq!(pool.len(), initial);
            assert_eq!(pool.capacity(), max);
            assert_eq!(tally.created(), initial);
        }
    }

    #[test]
    fn test_new_rejects_invalid_capacity() {
        let tally = Arc::new(Tally::default());
        for (initial, max) in [(0, 0), (3, 0), (6, 5)] {
            let result = ClientPool::new(initial, max, mock_factory(Arc::clone(&tally)));
            assert!(matches!(
                result,
                Err(PoolError::InvalidCapacity { initial: i, max: m }) if i == initial && m == max
            ));
        }
        assert_eq!(tally.created(), 0);
    }

    #[test]
    fn test_get_reuses_then_creates() {
        let (pool, tally) = mock_pool(1, 2);

        let first = pool.get();
        assert_eq!(first.id, 0);
        assert_eq!(tally.created(), 1);

        let second = pool.get();
        assert_eq!(second.id, 1);
        assert_eq!(tally.created(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_put_get_round_trip_keeps_len() {
        let (pool, _tally) = mock_pool(2, 5);
        let client = pool.get();
        pool.put(Some(client)).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_put_overflow_releases_client() {
        let tally = Arc::new(Tally::default());
        let factory = mock_factory(Arc::clone(&tally));
        let pool = ClientPool::new(0, 3, mock_factory(Arc::clone(&tally))).unwrap();

        for _ in 0..4 {
            pool.put(Some(factory())).unwrap();
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(tally.released(), 1);
    }

    #[test]
    fn test_put_none_is_rejected() {
        let (pool, tally) = mock_pool(1, 2);
        assert_eq!(pool.put(None), Err(PoolError::RejectedNilHandle));
        assert_eq!(pool.len(), 1);
        assert_eq!(tally.released(), 0);
    }

    #[test]
    fn test_shutdown_releases_resident_clients() {
        let (pool, tally) = mock_pool(3, 5);
        let _out = pool.get();

        assert!(pool.shutdown());
        assert_eq!(pool.state(), PoolState::Shutdown);
        assert_eq!(pool.len(), 0);
        assert_eq!(tally.released(), 2);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (pool, tally) = mock_pool(2, 2);
        assert!(pool.shutdown());
        assert!(!pool.shutdown());
        assert_eq!(tally.released(), 2);
    }

    #[test]
    fn test_put_after_shutdown_releases() {
        let (pool, tally) = mock_pool(0, 2);
        let factory = mock_factory(Arc::clone(&tally));
        pool.shutdown();

        assert_eq!(pool.put(Some(factory())), Ok(()));
        assert_eq!(pool.len(), 0);
        assert_eq!(tally.released(), 1);
    }

    #[test]
    fn test_get_after_shutdown() {
        let (pool, tally) = mock_pool(1, 1);
        pool.shutdown();

        assert_eq!(pool.try_get().err(), Some(PoolError::PoolClosed));
        let client = pool.get();
        assert_eq!(client.id, 1);
        assert_eq!(tally.created(), 2);
    }

    #[test]
    fn test_release_failure_does_not_fail_put() {
        let tally = Arc::new(Tally::default());
        let pool = ClientPool::new(1, 1, mock_factory(Arc::clone(&tally))).unwrap();
        assert_eq!(pool.put(Some(failing_client(&tally))), Ok(()));
        assert_eq!(pool.len(), 1);
        assert_eq!(tally.released(), 1);
    }

    #[test]
    fn test_scenario_two_five() {
        let tally = Arc::new(Tally::default());
        let factory = mock_factory(Arc::clone(&tally));
        let pool = ClientPool::new(2, 5, mock_factory(Arc::clone(&tally))).unwrap();
        assert_eq!(pool.len(), 2);

        let h1 = pool.get();
        let h2 = pool.get();
        assert_eq!(pool.len(), 0);

        pool.put(Some(h1)).unwrap();
        pool.put(Some(h2)).unwrap();
        pool.put(Some(factory())).unwrap();
        assert_eq!(pool.len(), 3);

        pool.shutdown();
        assert_eq!(pool.len(), 0);

        assert_eq!(pool.put(Some(factory())), Ok(()));
        assert_eq!(pool.len(), 0);
        assert_eq!(tally.released(), 4);
    }

    #[test]
    fn test_checkout_returns_on_drop() {
        let (pool, _tally) = mock_pool(1, 2);
        {
            let client = pool.checkout();
            assert_eq!(client.id, 0);
            assert_eq!(pool.len(), 0);
        }
        assert_eq!(pool.len(), 1);

        let detached = pool.checkout().into_inner();
        assert!(detached.is_some());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_drop_releases_resident_clients() {
        let (pool, tally) = mock_pool(4, 4);
        drop(pool);
        assert_eq!(tally.released(), 4);
    }

    #[test]
    fn test_concurrent_get_put_stays_bounded() {
        let (pool, tally) = mock_pool(2, 4);
        let pool = Arc::new(pool);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let client = pool.get();
                        assert!(pool.len() <= 4);
                        pool.put(Some(client)).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(pool.len() <= 4);
        assert_eq!(tally.created() - tally.released(), pool.len());
    }

    #[test]
    fn test_concurrent_put_during_shutdown_leaks_nothing() {
        let tally = Arc::new(Tally::default());
        let factory = Arc::new(mock_factory(Arc::clone(&tally)));
        let pool = Arc::new(ClientPool::new(0, 16, mock_factory(Arc::clone(&tally))).unwrap());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let factory = Arc::clone(&factory);
                thread::spawn(move || {
                    for _ in 0..200 {
                        pool.put(Some(factory())).unwrap();
                    }
                })
            })
            .collect();
        pool.shutdown();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(pool.len(), 0);
        assert_eq!(tally.released(), tally.created());
    }

    #[test]
    fn test_http_pool() {
        let config = PoolConfiguration::new()
            .with_initial_capacity(2)
            .with_max_capacity(3);
        let pool = ClientPool::for_http(config, HttpClientConfig::new().with_http1_only()).unwrap();
        assert_eq!(pool.len(), 2);

        let client = pool.get();
        pool.put(Some(client)).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.shutdown());
    }

    #[tokio::test]
    async fn test_pool_shared_across_tasks() {
        let (pool, _tally) = mock_pool(0, 8);
        let pool = Arc::new(pool);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    let client = pool.get();
                    tokio::task::yield_now().await;
                    pool.put(Some(client))
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok(()));
        }
        assert!(pool.len() <= 8);
    }
}
