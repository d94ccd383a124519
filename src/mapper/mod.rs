//! Row mapping between store rows and entities.
//!
//! Every mapper declares its columns in a fixed order: identifier, declared
//! fields, then store-assigned fields. `bind_parameters` yields the declared
//! fields only, in the same order the write statements expect them.

mod row;

pub use row::{Column, FromValue, Kind, Row, Value};

use crate::error::{DaoError, DaoResult};
use crate::model::Entity;

/// Name of the primary-key column shared by every table.
pub const ID: &str = "id";

/// Key column read back by `INSERT ... RETURNING id`.
pub const KEY_COLUMNS: &[Column] = &[Column::new(ID, Kind::Int)];

/// Translates rows into entities and entities into bind values.
pub trait RowMapper: Send + Sync + 'static {
    type Entity: Entity;

    /// Columns selected for this entity, in mapping order.
    const COLUMNS: &'static [Column];

    fn to_entity(row: &Row) -> DaoResult<Self::Entity>;

    fn bind_parameters(entity: &Self::Entity) -> Vec<Value>;

    fn to_entities(rows: &[Row]) -> DaoResult<Vec<Self::Entity>> {
        rows.iter().map(Self::to_entity).collect()
    }
}

/// Reads the store-assigned identifier of a freshly inserted row.
pub fn generated_key<E: Entity>(rows: &[Row]) -> DaoResult<i64> {
    rows.first()
        .map(|row| row.optional::<i64>(ID))
        .transpose()?
        .flatten()
        .ok_or_else(|| {
            DaoError::Mapping(format!("cannot obtain identifier for inserted {}", E::NAME))
        })
}

/// Builds the row a select would return for `id` plus `bind_parameters`.
///
/// Pairs the values with `M::COLUMNS` after the identifier; store-assigned
/// trailing columns are left out.
pub fn row_from_parameters<M: RowMapper>(id: i64, parameters: Vec<Value>) -> Row {
    let mut row = Row::with_capacity(parameters.len() + 1);
    row.push(ID, Value::Int(id));
    for (column, value) in M::COLUMNS.iter().skip(1).zip(parameters) {
        row.push(column.name, value);
    }
    row
}
