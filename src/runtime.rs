//! Runtime abstraction layer for fire-and-forget async work
//!
//! Image fetches are spawned onto whatever runtime the host is driving. The
//! bootstrapper itself never blocks on them.

use crate::Result;
use futures::future::BoxFuture;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync {
    /// Schedules a future; fails if no runtime is available
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<()>;
}

/// Spawns onto the default spawner
pub fn spawn<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    default_spawner().spawn_boxed(Box::pin(future))
}

/// The spawner matching the enabled runtime feature
pub fn default_spawner() -> &'static dyn AsyncSpawner {
    #[cfg(feature = "tokio-runtime")]
    {
        &spawners::tokio_impl::TokioSpawner
    }
    #[cfg(not(feature = "tokio-runtime"))]
    {
        &spawners::NoRuntime
    }
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use crate::MapError;

    /// Spawner used when no async runtime is compiled in
    pub struct NoRuntime;

    impl AsyncSpawner for NoRuntime {
        fn spawn_boxed(&self, _future: BoxFuture<'static, ()>) -> Result<()> {
            Err(MapError::Runtime(
                "no async runtime compiled in".to_string(),
            ))
        }
    }

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;

        /// Tokio-based async spawner; uses the runtime of the calling thread
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<()> {
                let handle = ::tokio::runtime::Handle::try_current()
                    .map_err(|e| MapError::Runtime(format!("no tokio runtime on this thread: {}", e)))?;
                // Detached: results travel over the loader's channel
                drop(handle.spawn(future));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapError;

    #[test]
    fn test_spawn_without_runtime_fails() {
        assert!(matches!(spawn(async {}), Err(MapError::Runtime(_))));
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_spawn_inside_runtime() {
        let (tx, rx) = ::tokio::sync::oneshot::channel();
        spawn(async move {
            let _ = tx.send(7);
        })
        .unwrap();
        assert_eq!(rx.await.unwrap(), 7);
    }
}
