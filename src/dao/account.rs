use tracing::debug;

use super::{CrudDao, Statements, Table};
use crate::error::{DaoError, DaoResult};
use crate::handle::ResourceFactory;
use crate::mapper::{Column, Kind, Row, RowMapper, Value, ID};
use crate::model::{Account, Gender};

pub struct AccountMapper;

pub type AccountDao<F> = CrudDao<F, AccountMapper>;

const SELECT_BY_EMAIL: &str = "SELECT id, first_name, last_name, email, birthday, gender, balance, creation_time \
     FROM account WHERE email = $1";

impl RowMapper for AccountMapper {
    type Entity = Account;

    const COLUMNS: &'static [Column] = &[
        Column::new(ID, Kind::Int),
        Column::new("first_name", Kind::Text),
        Column::new("last_name", Kind::Text),
        Column::new("email", Kind::Text),
        Column::new("birthday", Kind::Date),
        Column::new("gender", Kind::Text),
        Column::new("balance", Kind::Decimal),
        Column::new("creation_time", Kind::Timestamp),
    ];

    fn to_entity(row: &Row) -> DaoResult<Account> {
        let gender = row
            .required::<String>("gender")?
            .parse::<Gender>()
            .map_err(DaoError::Mapping)?;
        let mut account = Account::new(
            row.required::<String>("first_name")?,
            row.required::<String>("last_name")?,
            row.required::<String>("email")?,
            row.required("birthday")?,
            gender,
        );
        account.balance = row.optional("balance")?;
        Ok(Account::restore(
            row.required(ID)?,
            row.optional("creation_time")?,
            account,
        ))
    }

    fn bind_parameters(account: &Account) -> Vec<Value> {
        vec![
            Value::from(account.first_name.as_str()),
            Value::from(account.last_name.as_str()),
            Value::from(account.email.as_str()),
            Value::from(account.birthday),
            Value::from(account.gender.to_string()),
            Value::nullable(account.balance, Kind::Decimal),
        ]
    }
}

impl Table for AccountMapper {
    const STATEMENTS: Statements = Statements {
        insert: "INSERT INTO account (first_name, last_name, email, birthday, gender, balance) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        select_all: "SELECT id, first_name, last_name, email, birthday, gender, balance, creation_time \
                     FROM account ORDER BY id",
        select_by_id: "SELECT id, first_name, last_name, email, birthday, gender, balance, creation_time \
                       FROM account WHERE id = $1",
        update: "UPDATE account SET first_name = $1, last_name = $2, email = $3, birthday = $4, \
                 gender = $5, balance = $6 WHERE id = $7",
        delete: "DELETE FROM account WHERE id = $1",
        count: "SELECT COUNT(*) AS count FROM account",
    };
}

impl<F: ResourceFactory> CrudDao<F, AccountMapper> {
    /// Looks an account up by its unique e-mail address.
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Account> {
        let email = email.to_string();
        debug!(entity = "account", "find by email");
        self.unit_of_work()
            .execute(move |handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(
                            SELECT_BY_EMAIL,
                            &[Value::Text(email.clone())],
                            AccountMapper::COLUMNS,
                        )
                        .await?;
                    match rows.first() {
                        Some(row) => AccountMapper::to_entity(row),
                        None => Err(DaoError::NotFound(format!(
                            "no account with email = {email}"
                        ))),
                    }
                })
            })
            .await
    }
}
