//! Persisted domain entities.
//!
//! Identity is defined only once the store has assigned an identifier: two
//! entities are equal iff both carry the same identifier. Two unpersisted
//! entities are never equal, which is why none of them implements `Eq`.

mod account;
mod company;
mod photo;
mod product;

pub use account::{Account, Gender};
pub use company::Company;
pub use photo::{Photo, PhotoComment};
pub use product::Product;

/// An entity with a store-assigned identifier.
pub trait Entity: Send + Sync + 'static {
    /// Lower-case entity name used in error messages.
    const NAME: &'static str;

    /// `None` until the first successful save.
    fn id(&self) -> Option<i64>;

    /// Records the identifier assigned by the store.
    fn set_id(&mut self, id: i64);

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}

pub(crate) fn same_identity(left: Option<i64>, right: Option<i64>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l == r)
}
