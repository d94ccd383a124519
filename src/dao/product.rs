use super::{CrudDao, Statements, Table};
use crate::error::DaoResult;
use crate::mapper::{Column, Kind, Row, RowMapper, Value, ID};
use crate::model::Product;

pub struct ProductMapper;

pub type ProductDao<F> = CrudDao<F, ProductMapper>;

/// Products owned by one company; bound to the company identifier.
pub(crate) const SELECT_BY_COMPANY: &str = "SELECT id, name, producer, price, expiration_date, company_id, creation_time \
     FROM products WHERE company_id = $1 ORDER BY id";

impl RowMapper for ProductMapper {
    type Entity = Product;

    const COLUMNS: &'static [Column] = &[
        Column::new(ID, Kind::Int),
        Column::new("name", Kind::Text),
        Column::new("producer", Kind::Text),
        Column::new("price", Kind::Decimal),
        Column::new("expiration_date", Kind::Date),
        Column::new("company_id", Kind::Int),
        Column::new("creation_time", Kind::Timestamp),
    ];

    fn to_entity(row: &Row) -> DaoResult<Product> {
        let mut product = Product::new(
            row.required::<String>("name")?,
            row.required("expiration_date")?,
        );
        product.producer = Some(row.required("producer")?);
        product.price = row.optional("price")?;
        Ok(Product::restore(
            row.required(ID)?,
            row.optional("company_id")?,
            row.optional("creation_time")?,
            product,
        ))
    }

    fn bind_parameters(product: &Product) -> Vec<Value> {
        vec![
            Value::from(product.name.as_str()),
            Value::nullable(product.producer.as_deref(), Kind::Text),
            Value::nullable(product.price, Kind::Decimal),
            Value::from(product.expiration_date),
            Value::nullable(product.company_id(), Kind::Int),
        ]
    }
}

impl Table for ProductMapper {
    const STATEMENTS: Statements = Statements {
        insert: "INSERT INTO products (name, producer, price, expiration_date, company_id) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
        select_all: "SELECT id, name, producer, price, expiration_date, company_id, creation_time \
                     FROM products ORDER BY id",
        select_by_id: "SELECT id, name, producer, price, expiration_date, company_id, creation_time \
                       FROM products WHERE id = $1",
        update: "UPDATE products SET name = $1, producer = $2, price = $3, expiration_date = $4, \
                 company_id = $5 WHERE id = $6",
        delete: "DELETE FROM products WHERE id = $1",
        count: "SELECT COUNT(*) AS count FROM products",
    };
}
