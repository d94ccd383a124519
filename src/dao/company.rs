use super::product::SELECT_BY_COMPANY;
use super::{not_found, CrudDao, ProductMapper, Statements, Table};
use crate::error::DaoResult;
use crate::handle::ResourceFactory;
use crate::mapper::{Column, Kind, Row, RowMapper, Value, ID};
use crate::model::{Company, Entity};

pub struct CompanyMapper;

pub type CompanyDao<F> = CrudDao<F, CompanyMapper>;

impl RowMapper for CompanyMapper {
    type Entity = Company;

    const COLUMNS: &'static [Column] = &[Column::new(ID, Kind::Int), Column::new("name", Kind::Text)];

    fn to_entity(row: &Row) -> DaoResult<Company> {
        Ok(Company::new(row.required::<String>("name")?).with_id(row.required(ID)?))
    }

    fn bind_parameters(company: &Company) -> Vec<Value> {
        vec![Value::from(company.name.as_str())]
    }
}

impl Table for CompanyMapper {
    const STATEMENTS: Statements = Statements {
        insert: "INSERT INTO company (name) VALUES ($1) RETURNING id",
        select_all: "SELECT id, name FROM company ORDER BY id",
        select_by_id: "SELECT id, name FROM company WHERE id = $1",
        update: "UPDATE company SET name = $1 WHERE id = $2",
        delete: "DELETE FROM company WHERE id = $1",
        count: "SELECT COUNT(*) AS count FROM company",
    };
}

impl<F: ResourceFactory> CrudDao<F, CompanyMapper> {
    /// Loads a company together with all of its products.
    ///
    /// A company without products comes back with an empty collection.
    pub async fn find_by_id_fetch_products(&self, id: i64) -> DaoResult<Company> {
        self.unit_of_work()
            .execute(move |handle| {
                Box::pin(async move {
                    let params = [Value::Int(id)];
                    let rows = handle
                        .query(CompanyMapper::STATEMENTS.select_by_id, &params, CompanyMapper::COLUMNS)
                        .await?;
                    let mut company = match rows.first() {
                        Some(row) => CompanyMapper::to_entity(row)?,
                        None => return Err(not_found::<Company>(id)),
                    };

                    let product_rows = handle
                        .query(SELECT_BY_COMPANY, &params, ProductMapper::COLUMNS)
                        .await?;
                    for product in ProductMapper::to_entities(&product_rows)? {
                        company.add_product(product);
                    }
                    Ok(company)
                })
            })
            .await
    }
}
