use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::{same_identity, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "MALE"),
            Self::Female => write!(f, "FEMALE"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub balance: Option<Decimal>,
    creation_time: Option<NaiveDateTime>,
}

impl Account {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        birthday: NaiveDate,
        gender: Gender,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            birthday,
            gender,
            balance: None,
            creation_time: None,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn creation_time(&self) -> Option<NaiveDateTime> {
        self.creation_time
    }

    pub(crate) fn restore(id: i64, creation_time: Option<NaiveDateTime>, account: Account) -> Self {
        Self {
            id: Some(id),
            creation_time,
            ..account
        }
    }
}

impl Entity for Account {
    const NAME: &'static str = "account";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}
