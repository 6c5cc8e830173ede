use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::bail;
use crate::engine::Engine;
use crate::error::{ErrorKind, VaultResult};
use crate::merge::{MergeOutcome, MergePlan};
use crate::types::ObjectName;

#[derive(Debug, Default)]
struct Inner {
    failing_targets: HashSet<ObjectName>,
    scanned_streams: Vec<ObjectName>,
    merge_calls: u64,
    close_calls: u64,
}

/// Engine wrapper that records how a run used its session.
///
/// Merges into targets registered with [`TestEngineWrapper::fail_merges_into`] are rejected
/// with [`ErrorKind::EngineQueryFailed`] before reaching the wrapped engine.
#[derive(Debug, Clone)]
pub struct TestEngineWrapper<E> {
    wrapped_engine: E,
    inner: Arc<RwLock<Inner>>,
}

impl<E> TestEngineWrapper<E> {
    pub fn wrap(engine: E) -> Self {
        Self {
            wrapped_engine: engine,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub fn wrapped(&self) -> &E {
        &self.wrapped_engine
    }

    pub async fn fail_merges_into(&self, target: &str) -> VaultResult<()> {
        let target = ObjectName::parse(target)?;
        let mut inner = self.inner.write().await;
        inner.failing_targets.insert(target);

        Ok(())
    }

    pub async fn scanned_streams(&self) -> Vec<ObjectName> {
        self.inner.read().await.scanned_streams.clone()
    }

    pub async fn merge_calls(&self) -> u64 {
        self.inner.read().await.merge_calls
    }

    pub async fn close_calls(&self) -> u64 {
        self.inner.read().await.close_calls
    }
}

impl<E> Engine for TestEngineWrapper<E>
where
    E: Engine + Send + Sync,
{
    fn name() -> &'static str {
        E::name()
    }

    async fn has_pending_changes(&self, stream: &ObjectName) -> VaultResult<bool> {
        {
            let mut inner = self.inner.write().await;
            inner.scanned_streams.push(stream.clone());
        }

        self.wrapped_engine.has_pending_changes(stream).await
    }

    async fn merge(&self, plan: &MergePlan) -> VaultResult<MergeOutcome> {
        {
            let mut inner = self.inner.write().await;
            inner.merge_calls += 1;
            if inner.failing_targets.contains(&plan.target) {
                bail!(
                    ErrorKind::EngineQueryFailed,
                    "Injected merge failure",
                    plan.target
                );
            }
        }

        self.wrapped_engine.merge(plan).await
    }

    async fn close(&self) -> VaultResult<()> {
        {
            let mut inner = self.inner.write().await;
            inner.close_calls += 1;
        }

        self.wrapped_engine.close().await
    }
}
