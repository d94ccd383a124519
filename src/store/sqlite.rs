use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Connection as _, Executor as _, Row as _, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::handle::{ResourceFactory, ResourceHandle};
use crate::mapper::{Column, Kind, Row, Value};

/// Resource factory backed by an SQLite connection pool.
///
/// Decimals are stored as their text form; declare decimal columns `TEXT`.
#[derive(Debug, Clone)]
pub struct SqliteResourceFactory {
    pool: SqlitePool,
}

impl SqliteResourceFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        info!(
            max_connections = config.max_connections,
            "opening SQLite database"
        );
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A private in-memory database.
    ///
    /// The pool keeps exactly one connection alive for its whole lifetime;
    /// the database disappears with it.
    pub async fn in_memory() -> StoreResult<Self> {
        info!("opening in-memory SQLite database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ResourceFactory for SqliteResourceFactory {
    type Handle = SqliteHandle;

    async fn acquire(&self) -> StoreResult<SqliteHandle> {
        let conn = self.pool.acquire().await?;
        Ok(SqliteHandle::new(conn))
    }
}

/// One pooled SQLite connection.
pub struct SqliteHandle {
    conn: Option<PoolConnection<Sqlite>>,
    in_transaction: bool,
}

impl SqliteHandle {
    fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self {
            conn: Some(conn),
            in_transaction: false,
        }
    }

    fn connection(&mut self) -> StoreResult<&mut SqliteConnection> {
        self.conn.as_deref_mut().ok_or(StoreError::Released)
    }
}

#[async_trait]
impl ResourceHandle for SqliteHandle {
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

impl Drop for SqliteHandle {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Some(conn) = self.conn.take() {
                drop(conn.detach());
            }
        }
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, value| match value {
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Decimal(v) => query.bind(v.to_string()),
            Value::Date(v) => query.bind(*v),
            Value::Timestamp(v) => query.bind(*v),
            Value::Null(Kind::Int) => query.bind(None::<i64>),
            Value::Null(_) => query.bind(None::<String>),
        })
}

fn decode(row: &SqliteRow, columns: &[Column]) -> StoreResult<Row> {
    let mut decoded = Row::with_capacity(columns.len());
    for column in columns {
        if row.try_column(column.name).is_err() {
            continue;
        }
        let name = column.name;
        let value = match column.kind {
            Kind::Int => row.try_get::<Option<i64>, _>(name)?.map(Value::Int),
            Kind::Text => row.try_get::<Option<String>, _>(name)?.map(Value::Text),
            // numeric affinity may have stored the text as INTEGER or REAL
            Kind::Decimal => row
                .try_get_unchecked::<Option<String>, _>(name)?
                .map(|text| parse_decimal(name, &text))
                .transpose()?
                .map(Value::Decimal),
            Kind::Date => row.try_get::<Option<NaiveDate>, _>(name)?.map(Value::Date),
            Kind::Timestamp => row
                .try_get::<Option<NaiveDateTime>, _>(name)?
                .map(Value::Timestamp),
        };
        decoded.push(name, value.unwrap_or(Value::Null(column.kind)));
    }
    Ok(decoded)
}

fn parse_decimal(column: &str, text: &str) -> StoreResult<Decimal> {
    Decimal::from_str(text).map_err(|err| StoreError::Decode {
        column: column.to_string(),
        message: err.to_string(),
    })
}
