//! Entity DAOs.
//!
//! [`CrudDao`] implements save / find / update / remove once for every
//! table; entity modules add their statements, row mappers and the few
//! entity-specific operations. Each public operation runs in exactly one
//! unit of work.

mod account;
mod company;
mod photo;
mod product;

pub use account::{AccountDao, AccountMapper};
pub use company::{CompanyDao, CompanyMapper};
pub use photo::{PhotoCommentMapper, PhotoDao, PhotoMapper};
pub use product::{ProductDao, ProductMapper};

use std::marker::PhantomData;

use tracing::debug;

use crate::error::{DaoError, DaoResult};
use crate::handle::ResourceFactory;
use crate::mapper::{generated_key, Column, Kind, RowMapper, Value, KEY_COLUMNS};
use crate::model::Entity;
use crate::unit_of_work::UnitOfWork;

/// SQL text for one table.
///
/// `update` binds the mapper's parameters first and the identifier last.
#[derive(Debug, Clone, Copy)]
pub struct Statements {
    pub insert: &'static str,
    pub select_all: &'static str,
    pub select_by_id: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub count: &'static str,
}

/// A row mapper bound to its table's statements.
pub trait Table: RowMapper {
    const STATEMENTS: Statements;
}

/// Generic data-access object for one table.
pub struct CrudDao<F, M> {
    uow: UnitOfWork<F>,
    _mapper: PhantomData<fn() -> M>,
}

impl<F: Clone, M> Clone for CrudDao<F, M> {
    fn clone(&self) -> Self {
        Self {
            uow: self.uow.clone(),
            _mapper: PhantomData,
        }
    }
}

impl<F, M> CrudDao<F, M>
where
    F: ResourceFactory,
    M: Table,
{
    pub fn new(uow: UnitOfWork<F>) -> Self {
        Self {
            uow,
            _mapper: PhantomData,
        }
    }

    pub fn unit_of_work(&self) -> &UnitOfWork<F> {
        &self.uow
    }

    /// Insert `entity` and assign the generated identifier to it once the
    /// transaction has committed.
    pub async fn save(&self, entity: &mut M::Entity) -> DaoResult<()> {
        let params = M::bind_parameters(entity);
        let id = self
            .uow
            .execute(move |handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(M::STATEMENTS.insert, &params, KEY_COLUMNS)
                        .await?;
                    generated_key::<M::Entity>(&rows)
                })
            })
            .await?;
        entity.set_id(id);
        debug!(entity = <M::Entity as Entity>::NAME, id, "saved");
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> DaoResult<M::Entity> {
        self.uow
            .execute(move |handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(M::STATEMENTS.select_by_id, &[Value::Int(id)], M::COLUMNS)
                        .await?;
                    match rows.first() {
                        Some(row) => M::to_entity(row),
                        None => Err(not_found::<M::Entity>(id)),
                    }
                })
            })
            .await
    }

    pub async fn find_all(&self) -> DaoResult<Vec<M::Entity>> {
        self.uow
            .execute(|handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(M::STATEMENTS.select_all, &[], M::COLUMNS)
                        .await?;
                    M::to_entities(&rows)
                })
            })
            .await
    }

    pub async fn update(&self, entity: &M::Entity) -> DaoResult<()> {
        let id = require_id(entity, "update")?;
        let mut params = M::bind_parameters(entity);
        params.push(Value::Int(id));
        self.uow
            .execute_void(move |handle| {
                Box::pin(async move {
                    let affected = handle.execute(M::STATEMENTS.update, &params).await?;
                    ensure_affected::<M::Entity>(affected, id)
                })
            })
            .await?;
        debug!(entity = <M::Entity as Entity>::NAME, id, "updated");
        Ok(())
    }

    pub async fn remove(&self, entity: &M::Entity) -> DaoResult<()> {
        let id = require_id(entity, "remove")?;
        self.uow
            .execute_void(move |handle| {
                Box::pin(async move {
                    let affected = handle
                        .execute(M::STATEMENTS.delete, &[Value::Int(id)])
                        .await?;
                    ensure_affected::<M::Entity>(affected, id)
                })
            })
            .await?;
        debug!(entity = <M::Entity as Entity>::NAME, id, "removed");
        Ok(())
    }

    /// Number of rows currently stored in the table.
    pub async fn count(&self) -> DaoResult<i64> {
        self.uow
            .execute(|handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(M::STATEMENTS.count, &[], COUNT_COLUMNS)
                        .await?;
                    match rows.first() {
                        Some(row) => row.required::<i64>("count"),
                        None => Err(DaoError::Mapping("count query returned no row".to_string())),
                    }
                })
            })
            .await
    }
}

const COUNT_COLUMNS: &[Column] = &[Column::new("count", Kind::Int)];

/// The identifier of an entity a write is about to target.
pub(crate) fn require_id<E: Entity>(entity: &E, action: &str) -> DaoResult<i64> {
    entity.id().ok_or_else(|| {
        DaoError::Validation(format!(
            "cannot {action} a {} without an identifier",
            E::NAME
        ))
    })
}

pub(crate) fn not_found<E: Entity>(id: i64) -> DaoError {
    DaoError::NotFound(format!("no {} with id = {id}", E::NAME))
}

/// Escalates a write that touched no row to Not Found.
pub(crate) fn ensure_affected<E: Entity>(affected: u64, id: i64) -> DaoResult<()> {
    if affected == 0 {
        return Err(DaoError::NotFound(format!(
            "{} with id = {id} does not exist",
            E::NAME
        )));
    }
    Ok(())
}
