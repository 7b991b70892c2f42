use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, error};

use crate::model::{
    GenericError, NewOrderItem, Order, OrderChanges, OrderItem, OrderStatus, OrderWithItems,
    PaymentStatus, Product, ProductVariant,
};
use crate::storage::OrderStorage;

/// Postgres-backed order storage.
pub struct PgOrderStorage {
    pub pool: PgPool,
}

impl PgOrderStorage {
    pub async fn new(database_url: &str) -> Result<Self, GenericError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_order_any_owner(
        &self,
        id: &str,
    ) -> Result<Option<OrderWithItems>, GenericError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for_orders(&[row.id.clone()]).await?;
        Ok(Some(OrderWithItems {
            order: row.try_into()?,
            items,
        }))
    }

    async fn items_for_orders(
        &self,
        order_ids: &[String],
    ) -> Result<Vec<OrderItem>, GenericError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, variant_id, quantity, price, total \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, payment_status, subtotal, \
     shipping, tax, total, payment_method, shipping_method, notes, shipping_address_id, \
     billing_address_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    user_id: String,
    status: String,
    payment_status: String,
    subtotal: f64,
    shipping: f64,
    tax: f64,
    total: f64,
    payment_method: String,
    shipping_method: String,
    notes: Option<String>,
    shipping_address_id: String,
    billing_address_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = GenericError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status)
            .map_err(|_| format!("unknown order status in row {}: {}", row.id, row.status))?;
        let payment_status = PaymentStatus::from_str(&row.payment_status).map_err(|_| {
            format!(
                "unknown payment status in row {}: {}",
                row.id, row.payment_status
            )
        })?;

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            status,
            payment_status,
            subtotal: row.subtotal,
            shipping: row.shipping,
            tax: row.tax,
            total: row.total,
            payment_method: row.payment_method,
            shipping_method: row.shipping_method,
            notes: row.notes,
            shipping_address_id: row.shipping_address_id,
            billing_address_id: row.billing_address_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    variant_id: Option<String>,
    quantity: i32,
    price: f64,
    total: f64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
            price: row.price,
            total: row.total,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    slug: String,
    price: f64,
    image: Option<String>,
}

#[derive(Debug, FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    name: String,
    price: Option<f64>,
}

#[async_trait]
impl OrderStorage for PgOrderStorage {
    async fn products_with_variants(
        &self,
        ids: &[String],
    ) -> Result<Vec<Product>, GenericError> {
        debug!("Loading {} products for price resolution", ids.len());

        let products = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, slug, price, image FROM products WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let variants = sqlx::query_as::<_, VariantRow>(
            "SELECT id, product_id, name, price FROM product_variants WHERE product_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products
            .into_iter()
            .map(|p| {
                let product_variants = variants
                    .iter()
                    .filter(|v| v.product_id == p.id)
                    .map(|v| ProductVariant {
                        id: v.id.clone(),
                        product_id: v.product_id.clone(),
                        name: v.name.clone(),
                        price: v.price,
                    })
                    .collect();
                Product {
                    id: p.id,
                    name: p.name,
                    slug: p.slug,
                    price: p.price,
                    image: p.image,
                    variants: product_variants,
                }
            })
            .collect())
    }

    async fn insert_order(
        &self,
        order: &Order,
        items: &[NewOrderItem],
    ) -> Result<OrderWithItems, GenericError> {
        debug!(
            "Inserting order {} with {} items",
            order.order_number,
            items.len()
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (\
                 id, order_number, user_id, status, payment_status, subtotal, shipping, tax, \
                 total, payment_method, shipping_method, notes, shipping_address_id, \
                 billing_address_id, created_at, updated_at\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.user_id)
        .bind(order.status.to_string())
        .bind(order.payment_status.to_string())
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.tax)
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(&order.shipping_method)
        .bind(&order.notes)
        .bind(&order.shipping_address_id)
        .bind(&order.billing_address_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut persisted_items = Vec::with_capacity(items.len());
        for item in items {
            let item_id = uuid::Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, variant_id, quantity, price, total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&item_id)
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(&item.variant_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;

            persisted_items.push(OrderItem {
                id: item_id,
                order_id: order.id.clone(),
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                quantity: item.quantity,
                price: item.price,
                total: item.total,
            });
        }

        match tx.commit().await {
            Ok(_) => debug!("Committed order {}", order.order_number),
            Err(e) => {
                error!("Failed to commit order {}: {}", order.order_number, e);
                return Err(e.into());
            }
        }

        Ok(OrderWithItems {
            order: order.clone(),
            items: persisted_items,
        })
    }

    async fn fetch_order(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<OrderWithItems>, GenericError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for_orders(&[row.id.clone()]).await?;
        Ok(Some(OrderWithItems {
            order: row.try_into()?,
            items,
        }))
    }

    async fn list_orders(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderWithItems>, i64), GenericError> {
        let status_filter = status.map(|s| s.to_string());

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(&status_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(&status_filter)
        .fetch_one(&self.pool)
        .await?;

        let order_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let all_items = self.items_for_orders(&order_ids).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = all_items
                .iter()
                .filter(|i| i.order_id == row.id)
                .cloned()
                .collect();
            orders.push(OrderWithItems {
                order: row.try_into()?,
                items,
            });
        }

        Ok((orders, total))
    }

    async fn update_order(
        &self,
        id: &str,
        changes: &OrderChanges,
    ) -> Result<Option<OrderWithItems>, GenericError> {
        debug!("Applying admin update to order {}", id);

        let result = sqlx::query(
            "UPDATE orders SET \
                 status = COALESCE($2, status), \
                 payment_status = COALESCE($3, payment_status), \
                 notes = COALESCE($4, notes), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(changes.status.map(|s| s.to_string()))
        .bind(changes.payment_status.map(|s| s.to_string()))
        .bind(&changes.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_order_any_owner(id).await
    }

    async fn cancel_order(&self, id: &str) -> Result<Option<OrderWithItems>, GenericError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(OrderStatus::Cancelled.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_order_any_owner(id).await
    }
}
