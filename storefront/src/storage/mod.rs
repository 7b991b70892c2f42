// Storage seam between the order service and the database.
pub mod postgres;

pub use postgres::PgOrderStorage;

use async_trait::async_trait;

use crate::model::{
    GenericError, NewOrderItem, Order, OrderChanges, OrderStatus, OrderWithItems, Product,
};

/// Persistence operations needed by the order service.
///
/// All reads that serve user-facing endpoints are owner-scoped: a missing
/// row and a row owned by someone else are indistinguishable to callers.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Batch-load the referenced products with their variants eagerly
    /// attached. Unknown ids are simply absent from the result.
    async fn products_with_variants(&self, ids: &[String])
        -> Result<Vec<Product>, GenericError>;

    /// Persist an order and its line items in one transaction; an order is
    /// never observable with a subset of its items.
    async fn insert_order(
        &self,
        order: &Order,
        items: &[NewOrderItem],
    ) -> Result<OrderWithItems, GenericError>;

    /// Fetch one order with items, scoped to its owner.
    async fn fetch_order(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<OrderWithItems>, GenericError>;

    /// Page through a user's orders, newest first, with the total count for
    /// pagination metadata.
    async fn list_orders(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderWithItems>, i64), GenericError>;

    /// Apply an admin edit. Not owner-scoped; returns the updated order or
    /// `None` when the id does not exist.
    async fn update_order(
        &self,
        id: &str,
        changes: &OrderChanges,
    ) -> Result<Option<OrderWithItems>, GenericError>;

    /// Mark an order cancelled and refresh its `updated_at`. Ownership and
    /// cancellability are checked by the caller beforehand.
    async fn cancel_order(&self, id: &str) -> Result<Option<OrderWithItems>, GenericError>;
}
