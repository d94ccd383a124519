use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{
    Column as _, Connection as _, Executor as _, PgConnection, PgPool, Postgres, Row as _,
    TypeInfo as _,
};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::handle::{ResourceFactory, ResourceHandle};
use crate::mapper::{Column, Kind, Row, Value};

/// Resource factory backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgResourceFactory {
    pool: PgPool,
}

impl PgResourceFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pool from `config` and wrap it.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        info!(
            max_connections = config.max_connections,
            "connecting to PostgreSQL"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ResourceFactory for PgResourceFactory {
    type Handle = PgHandle;

    async fn acquire(&self) -> StoreResult<PgHandle> {
        let conn = self.pool.acquire().await?;
        Ok(PgHandle::new(conn))
    }
}

/// One pooled PostgreSQL connection.
///
/// A connection still inside a transaction when the handle is released or
/// dropped is detached and closed instead of going back to the pool.
pub struct PgHandle {
    conn: Option<PoolConnection<Postgres>>,
    in_transaction: bool,
}

impl PgHandle {
    fn new(conn: PoolConnection<Postgres>) -> Self {
        Self {
            conn: Some(conn),
            in_transaction: false,
        }
    }

    fn connection(&mut self) -> StoreResult<&mut PgConnection> {
        self.conn.as_deref_mut().ok_or(StoreError::Released)
    }
}

#[async_trait]
impl ResourceHandle for PgHandle {
    async fn begin(&mut self) -> StoreResult<()> {
        self.connection()?.execute("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.connection()?.execute("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.connection()?.execute("ROLLBACK").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> StoreResult<u64> {
        let conn = self.connection()?;
        let result = bind_all(sql, params).execute(conn).await?;
        Ok(result.rows_affected())
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[Value],
        columns: &[Column],
    ) -> StoreResult<Vec<Row>> {
        let conn = self.connection()?;
        let rows = bind_all(sql, params).fetch_all(conn).await?;
        rows.iter().map(|row| decode(row, columns)).collect()
    }

    async fn release(&mut self) -> StoreResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.in_transaction {
            self.in_transaction = false;
            conn.detach().close().await?;
        }
        Ok(())
    }
}

impl Drop for PgHandle {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Some(conn) = self.conn.take() {
                drop(conn.detach());
            }
        }
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, Postgres, PgArguments> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, value| match value {
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Decimal(v) => query.bind(*v),
            Value::Date(v) => query.bind(*v),
            Value::Timestamp(v) => query.bind(*v),
            Value::Null(Kind::Int) => query.bind(None::<i64>),
            Value::Null(Kind::Text) => query.bind(None::<String>),
            Value::Null(Kind::Decimal) => query.bind(None::<Decimal>),
            Value::Null(Kind::Date) => query.bind(None::<NaiveDate>),
            Value::Null(Kind::Timestamp) => query.bind(None::<NaiveDateTime>),
        })
}

fn decode(row: &PgRow, columns: &[Column]) -> StoreResult<Row> {
    let mut decoded = Row::with_capacity(columns.len());
    for column in columns {
        let Ok(pg_column) = row.try_column(column.name) else {
            continue;
        };
        let name = column.name;
        let type_name = pg_column.type_info().name();
        let value = match column.kind {
            Kind::Int => match type_name {
                "INT2" => row.try_get::<Option<i16>, _>(name)?.map(i64::from),
                "INT4" => row.try_get::<Option<i32>, _>(name)?.map(i64::from),
                _ => row.try_get::<Option<i64>, _>(name)?,
            }
            .map(Value::Int),
            Kind::Text => row.try_get::<Option<String>, _>(name)?.map(Value::Text),
            Kind::Decimal => row.try_get::<Option<Decimal>, _>(name)?.map(Value::Decimal),
            Kind::Date => row.try_get::<Option<NaiveDate>, _>(name)?.map(Value::Date),
            Kind::Timestamp => match type_name {
                "TIMESTAMPTZ" => row
                    .try_get::<Option<DateTime<Utc>>, _>(name)?
                    .map(|v| v.naive_utc()),
                _ => row.try_get::<Option<NaiveDateTime>, _>(name)?,
            }
            .map(Value::Timestamp),
        };
        decoded.push(name, value.unwrap_or(Value::Null(column.kind)));
    }
    Ok(decoded)
}
