#![allow(dead_code)]

pub mod scripted;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use transactional_dao::{Product, SqliteResourceFactory, UnitOfWork};

pub use scripted::{Event, Failures, ScriptedFactory};

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE company (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        producer TEXT NOT NULL,
        price TEXT,
        expiration_date TEXT NOT NULL,
        company_id INTEGER REFERENCES company(id),
        creation_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE account (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        birthday TEXT NOT NULL,
        gender TEXT NOT NULL,
        balance TEXT,
        creation_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE photo (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE photo_comment (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL CHECK (length(text) > 0),
        created_on TEXT NOT NULL,
        photo_id INTEGER NOT NULL REFERENCES photo(id)
    )
    "#,
];

/// Routes `tracing` output through the test harness; set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh in-memory database with every table created and empty.
pub async fn sqlite_store() -> UnitOfWork<SqliteResourceFactory> {
    init_tracing();
    let factory = SqliteResourceFactory::in_memory()
        .await
        .expect("Failed to open in-memory database");

    for statement in SQLITE_SCHEMA {
        sqlx::query(statement)
            .execute(factory.pool())
            .await
            .expect("Failed to create schema");
    }

    UnitOfWork::new(factory)
}

/// Rows in `table`, counted straight through the pool.
pub async fn count_rows(uow: &UnitOfWork<SqliteResourceFactory>, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(uow.factory().pool())
        .await
        .expect("Failed to count rows");
    count
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn fanta() -> Product {
    Product::new("Fanta", date(2020, 4, 14))
        .with_producer("The Coca-Cola Company")
        .with_price(Decimal::from(22))
}

pub fn product(name: &str, price: i64) -> Product {
    Product::new(name, date(2030, 1, 1))
        .with_producer("ACME")
        .with_price(Decimal::from(price))
}
