//! Transactional DAO core
//!
//! Data-access objects for products, accounts, companies and photos, each
//! operation running in exactly one unit of work: acquire a connection,
//! begin, run the operation, commit or roll back, release.

pub mod config;
pub mod dao;
pub mod error;
pub mod handle;
pub mod mapper;
pub mod model;
pub mod store;
pub mod unit_of_work;

pub use config::{ConfigError, StoreConfig};
pub use dao::{AccountDao, CompanyDao, CrudDao, PhotoDao, ProductDao, Statements, Table};
pub use error::{DaoError, DaoResult, StoreError, StoreResult, TxStage};
pub use handle::{ResourceFactory, ResourceHandle};
pub use mapper::{Column, Kind, Row, RowMapper, Value};
pub use model::{Account, Company, Entity, Gender, Photo, PhotoComment, Product};
pub use store::{PgResourceFactory, SqliteResourceFactory};
pub use unit_of_work::{BoxFuture, UnitOfWork};
