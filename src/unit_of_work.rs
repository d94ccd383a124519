use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{DaoError, DaoResult, TxStage};
use crate::handle::{ResourceFactory, ResourceHandle};

/// Boxed future returned by a unit-of-work operation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Unit of Work executor.
///
/// Every call to [`UnitOfWork::execute`] acquires its own handle, opens one
/// transaction, runs the operation, commits on success and rolls back on
/// failure, then releases the handle whatever happened. Nothing is kept
/// between calls.
#[derive(Debug, Clone)]
pub struct UnitOfWork<F> {
    factory: F,
}

impl<F: ResourceFactory> UnitOfWork<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run `operation` inside a transaction and return its value.
    ///
    /// Failures of the operation are returned as they are after the rollback;
    /// store errors raised through `?` already arrive as
    /// [`DaoError::Transaction`].
    pub async fn execute<T, Op>(&self, operation: Op) -> DaoResult<T>
    where
        T: Send,
        Op: for<'h> FnOnce(&'h mut dyn ResourceHandle) -> BoxFuture<'h, DaoResult<T>> + Send,
    {
        let unit = Uuid::new_v4();
        let started = Instant::now();

        let mut handle = match self.factory.acquire().await {
            Ok(handle) => handle,
            Err(err) => {
                error!(%unit, error = %err, "cannot acquire resource handle");
                return Err(DaoError::Resource(err));
            }
        };

        let outcome = run_in_transaction(unit, &mut handle, operation).await;

        if let Err(err) = handle.release().await {
            warn!(%unit, error = %err, "releasing resource handle failed");
        }

        debug!(
            %unit,
            ok = outcome.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "unit of work finished"
        );
        outcome
    }

    /// [`UnitOfWork::execute`] for operations without a result.
    pub async fn execute_void<Op>(&self, operation: Op) -> DaoResult<()>
    where
        Op: for<'h> FnOnce(&'h mut dyn ResourceHandle) -> BoxFuture<'h, DaoResult<()>> + Send,
    {
        self.execute(operation).await
    }
}

async fn run_in_transaction<T, Op>(
    unit: Uuid,
    handle: &mut dyn ResourceHandle,
    operation: Op,
) -> DaoResult<T>
where
    Op: for<'h> FnOnce(&'h mut dyn ResourceHandle) -> BoxFuture<'h, DaoResult<T>>,
{
    handle
        .begin()
        .await
        .map_err(|err| DaoError::transaction(TxStage::Begin, err))?;
    debug!(%unit, "transaction started");

    let result = operation(&mut *handle).await;
    match result {
        Ok(value) => match handle.commit().await {
            Ok(()) => {
                debug!(%unit, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = handle.rollback().await {
                    warn!(%unit, error = %rollback_err, "rollback after failed commit failed");
                }
                Err(DaoError::transaction(TxStage::Commit, err))
            }
        },
        Err(err) => {
            if let Err(rollback_err) = handle.rollback().await {
                warn!(%unit, error = %rollback_err, cause = %err, "rollback failed");
            }
            debug!(%unit, error = %err, "transaction rolled back");
            Err(err)
        }
    }
}
