use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::{same_identity, Entity};

#[derive(Debug, Clone)]
pub struct Product {
    id: Option<i64>,
    pub name: String,
    /// Required by the schema; left optional so a missing producer reaches
    /// the store and is rejected there.
    pub producer: Option<String>,
    pub price: Option<Decimal>,
    pub expiration_date: NaiveDate,
    company_id: Option<i64>,
    creation_time: Option<NaiveDateTime>,
}

impl Product {
    pub fn new(name: impl Into<String>, expiration_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            producer: None,
            price: None,
            expiration_date,
            company_id: None,
            creation_time: None,
        }
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Refers to a row that is assumed to exist already.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Identifier of the owning company; maintained by [`super::Company`].
    pub fn company_id(&self) -> Option<i64> {
        self.company_id
    }

    /// Assigned by the store on insert.
    pub fn creation_time(&self) -> Option<NaiveDateTime> {
        self.creation_time
    }

    pub(crate) fn set_company_id(&mut self, company_id: Option<i64>) {
        self.company_id = company_id;
    }

    pub(crate) fn restore(
        id: i64,
        company_id: Option<i64>,
        creation_time: Option<NaiveDateTime>,
        product: Product,
    ) -> Self {
        Self {
            id: Some(id),
            company_id,
            creation_time,
            ..product
        }
    }
}

impl Entity for Product {
    const NAME: &'static str = "product";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}
