use async_trait::async_trait;

use crate::error::StoreResult;
use crate::mapper::{Column, Row, Value};

/// Hands out exclusive connections to the store.
///
/// Implementations own whatever pooling and authentication the store needs;
/// the unit of work only asks for one handle per invocation.
#[async_trait]
pub trait ResourceFactory: Send + Sync {
    type Handle: ResourceHandle + 'static;

    /// Acquire a ready connection.
    async fn acquire(&self) -> StoreResult<Self::Handle>;
}

/// One exclusive, scoped connection to the store.
///
/// A handle is used by a single unit of work at a time and is never shared.
#[async_trait]
pub trait ResourceHandle: Send {
    async fn begin(&mut self) -> StoreResult<()>;

    async fn commit(&mut self) -> StoreResult<()>;

    async fn rollback(&mut self) -> StoreResult<()>;

    /// Run a statement with bound parameters and return the number of rows
    /// it affected.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> StoreResult<u64>;

    /// Run a query with bound parameters, decoding each returned row by the
    /// given column list. Declared columns the store did not return are
    /// left out of the row.
    async fn query(
        &mut self,
        sql: &str,
        params: &[Value],
        columns: &[Column],
    ) -> StoreResult<Vec<Row>>;

    /// Give the connection back. Further calls fail with
    /// [`crate::StoreError::Released`]; releasing twice is a no-op.
    async fn release(&mut self) -> StoreResult<()>;
}
