use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{FieldError, OrderError};
use crate::model::{
    CreateOrderRequest, ListMeta, NewOrderItem, Order, OrderChanges, OrderList, OrderStatus,
    OrderWithItems, PaymentStatus, TimelineEntry, TrackingInfo,
};
use crate::shipping::ShippingProvider;
use crate::storage::OrderStorage;

/// Flat shipping cost applied to every order. The shipping method is
/// accepted as input but does not affect the charge.
pub const SHIPPING_COST: f64 = 10.0;

/// Flat tax rate applied to the subtotal regardless of jurisdiction.
pub const TAX_RATE: f64 = 0.15;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Order lifecycle logic: creation with price resolution, reads with the
/// synthesized timeline, admin updates, cancellation, and tracking lookups.
/// Stateless per request; every operation is its own storage round trip.
pub struct OrderService {
    storage: Arc<dyn OrderStorage>,
    shipping: Arc<dyn ShippingProvider>,
}

impl OrderService {
    pub fn new(storage: Arc<dyn OrderStorage>, shipping: Arc<dyn ShippingProvider>) -> Self {
        Self { storage, shipping }
    }

    /// Validate, price, and persist a new order for `user_id`.
    ///
    /// Pricing: per-item unit price comes from the product, overridden by
    /// the variant's price when one is set; subtotal is the sum of item
    /// totals; shipping and tax are the fixed constants above. The order
    /// and its items are written in a single transaction, so an unknown
    /// product or variant aborts the whole request with nothing persisted.
    pub async fn create_order(
        &self,
        user_id: &str,
        request: CreateOrderRequest,
    ) -> Result<OrderWithItems, OrderError> {
        let violations = validate_create_request(&request);
        if !violations.is_empty() {
            return Err(OrderError::Validation(violations));
        }

        let product_ids: Vec<String> = request
            .items
            .iter()
            .map(|i| i.product_id.clone())
            .collect();
        let products = self.storage.products_with_variants(&product_ids).await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| OrderError::Rule(format!("Product not found: {}", item.product_id)))?;

            let mut price = product.price;
            if let Some(variant_id) = &item.variant_id {
                let variant = product
                    .variants
                    .iter()
                    .find(|v| &v.id == variant_id)
                    .ok_or_else(|| OrderError::Rule(format!("Variant not found: {}", variant_id)))?;

                if let Some(variant_price) = variant.price {
                    price = variant_price;
                }
            }

            items.push(NewOrderItem {
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                quantity: item.quantity,
                price,
                total: price * item.quantity as f64,
            });
        }

        let subtotal: f64 = items.iter().map(|i| i.total).sum();
        let shipping = SHIPPING_COST;
        let tax = subtotal * TAX_RATE;
        let total = subtotal + shipping + tax;

        let now = Utc::now();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: generate_order_number(),
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            subtotal,
            shipping,
            tax,
            total,
            payment_method: request.payment_method,
            shipping_method: request.shipping_method,
            notes: request.notes,
            shipping_address_id: request.shipping_address_id.clone(),
            billing_address_id: request
                .billing_address_id
                .unwrap_or(request.shipping_address_id),
            created_at: now,
            updated_at: now,
        };

        let created = self.storage.insert_order(&order, &items).await?;
        info!(
            order_number = %created.order.order_number,
            total = created.order.total,
            "Created order"
        );
        Ok(created)
    }

    /// Fetch an order scoped to its owner, with the synthesized timeline.
    pub async fn get_order(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<(OrderWithItems, Vec<TimelineEntry>), OrderError> {
        let order = self
            .storage
            .fetch_order(id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let timeline = build_timeline(&order.order);
        Ok((order, timeline))
    }

    /// Page through the user's own orders, newest first.
    pub async fn list_orders(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderList, OrderError> {
        let page = page.max(1);
        let limit = if limit > 0 { limit } else { DEFAULT_PAGE_SIZE };
        let offset = (page - 1) * limit;

        debug!(user_id, page, limit, "Listing orders");
        let (orders, total_items) = self
            .storage
            .list_orders(user_id, status, limit, offset)
            .await?;

        let total_pages = (total_items + limit - 1) / limit;
        let meta = ListMeta {
            current_page: page,
            total_pages,
            total_items,
            page_size: limit,
            has_more: page < total_pages,
        };

        Ok(OrderList { orders, meta })
    }

    /// Apply an admin edit to any order. Role checks happen at the API
    /// boundary; no status transition graph is enforced here.
    pub async fn update_order(
        &self,
        id: &str,
        changes: OrderChanges,
    ) -> Result<OrderWithItems, OrderError> {
        let updated = self
            .storage
            .update_order(id, &changes)
            .await?
            .ok_or(OrderError::NotFound)?;

        info!(order_id = %id, "Applied admin update to order");
        Ok(updated)
    }

    /// Owner-initiated cancellation, permitted only before shipping. No
    /// compensating action (refund, inventory release) is performed.
    pub async fn cancel_order(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self
            .storage
            .fetch_order(id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.order.status.can_cancel() {
            return Err(OrderError::Rule(
                "This order cannot be cancelled".to_string(),
            ));
        }

        let cancelled = self
            .storage
            .cancel_order(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        info!(order_number = %cancelled.order.order_number, "Cancelled order");
        Ok(cancelled)
    }

    /// Tracking feed for an owner's order, per the shipping provider.
    pub async fn tracking(&self, user_id: &str, id: &str) -> Result<TrackingInfo, OrderError> {
        let order = self
            .storage
            .fetch_order(id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        Ok(self.shipping.tracking_for(&order.order, Utc::now()))
    }
}

/// `ORD-<epoch millis>-<3-digit random>`. Uniqueness is probabilistic:
/// collisions are neither detected nor retried.
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD-{}-{:03}", millis, suffix)
}

/// Collects every violation so the caller sees all of them at once.
fn validate_create_request(request: &CreateOrderRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push(FieldError::new("items", "Order must contain at least one item"));
    }
    for (index, item) in request.items.iter().enumerate() {
        if item.product_id.trim().is_empty() {
            errors.push(FieldError::new(
                format!("items[{}].productId", index),
                "Product id must not be blank",
            ));
        }
        if item.quantity < 1 {
            errors.push(FieldError::new(
                format!("items[{}].quantity", index),
                "Quantity must be a positive integer",
            ));
        }
    }
    if request.shipping_address_id.trim().is_empty() {
        errors.push(FieldError::new(
            "shippingAddressId",
            "Shipping address is required",
        ));
    }
    if request.payment_method.trim().is_empty() {
        errors.push(FieldError::new("paymentMethod", "Payment method is required"));
    }
    if request.shipping_method.trim().is_empty() {
        errors.push(FieldError::new(
            "shippingMethod",
            "Shipping method is required",
        ));
    }

    errors
}

const TIMELINE_STAGES: [(OrderStatus, &str, i64, &str); 4] = [
    (
        OrderStatus::Pending,
        "Order Placed",
        0,
        "Your order has been received and is being processed",
    ),
    (
        OrderStatus::Processing,
        "Processing",
        1,
        "Your order is being prepared for shipping",
    ),
    (
        OrderStatus::Shipped,
        "Shipped",
        2,
        "Your order has been shipped and is on its way",
    ),
    (
        OrderStatus::Delivered,
        "Delivered",
        5,
        "Your order has been delivered",
    ),
];

/// Synthesize the display timeline from the order's status and timestamps.
///
/// Projected dates, not history: each forward stage is dated by a fixed
/// day offset from order creation, marked completed when the current status
/// is at or past it and current on exact equality. Cancelled orders get an
/// extra entry dated at the last update.
pub fn build_timeline(order: &Order) -> Vec<TimelineEntry> {
    let stage = order.status.stage_index();

    let mut timeline: Vec<TimelineEntry> = TIMELINE_STAGES
        .iter()
        .map(|(status, label, offset, description)| {
            let completed = match (stage, status.stage_index()) {
                // The pending stage is always reached, even for cancelled orders.
                (None, Some(0)) => true,
                (Some(current), Some(this)) => current >= this,
                _ => false,
            };
            TimelineEntry {
                status: *status,
                label: (*label).to_string(),
                date: stage_date(order.created_at, *offset),
                completed,
                current: order.status == *status,
                description: (*description).to_string(),
            }
        })
        .collect();

    if order.status == OrderStatus::Cancelled {
        timeline.push(TimelineEntry {
            status: OrderStatus::Cancelled,
            label: "Cancelled".to_string(),
            date: order.updated_at,
            completed: true,
            current: true,
            description: "Your order has been cancelled".to_string(),
        });
    }

    timeline
}

fn stage_date(created_at: DateTime<Utc>, offset_days: i64) -> DateTime<Utc> {
    created_at + Duration::days(offset_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreateOrderItem, GenericError, Product, ProductVariant};
    use crate::shipping::ExpressDeliveryMock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory storage stub with configurable catalog and orders.
    #[derive(Default)]
    struct MockStorage {
        products: Vec<Product>,
        orders: Mutex<Vec<OrderWithItems>>,
        insert_called: AtomicBool,
        cancel_called: AtomicBool,
    }

    impl MockStorage {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products,
                ..Default::default()
            }
        }

        fn with_orders(orders: Vec<OrderWithItems>) -> Self {
            Self {
                orders: Mutex::new(orders),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl OrderStorage for MockStorage {
        async fn products_with_variants(
            &self,
            ids: &[String],
        ) -> Result<Vec<Product>, GenericError> {
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn insert_order(
            &self,
            order: &Order,
            items: &[NewOrderItem],
        ) -> Result<OrderWithItems, GenericError> {
            self.insert_called.store(true, Ordering::SeqCst);
            let created = OrderWithItems {
                order: order.clone(),
                items: items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| crate::model::OrderItem {
                        id: format!("item_{}", i),
                        order_id: order.id.clone(),
                        product_id: item.product_id.clone(),
                        variant_id: item.variant_id.clone(),
                        quantity: item.quantity,
                        price: item.price,
                        total: item.total,
                    })
                    .collect(),
            };
            self.orders.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn fetch_order(
            &self,
            id: &str,
            user_id: &str,
        ) -> Result<Option<OrderWithItems>, GenericError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.order.id == id && o.order.user_id == user_id)
                .cloned())
        }

        async fn list_orders(
            &self,
            user_id: &str,
            status: Option<OrderStatus>,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<OrderWithItems>, i64), GenericError> {
            let orders = self.orders.lock().unwrap();
            let matching: Vec<OrderWithItems> = orders
                .iter()
                .filter(|o| o.order.user_id == user_id)
                .filter(|o| status.map_or(true, |s| o.order.status == s))
                .cloned()
                .collect();
            let total = matching.len() as i64;
            let page = matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            Ok((page, total))
        }

        async fn update_order(
            &self,
            id: &str,
            changes: &OrderChanges,
        ) -> Result<Option<OrderWithItems>, GenericError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(order) = orders.iter_mut().find(|o| o.order.id == id) else {
                return Ok(None);
            };
            if let Some(status) = changes.status {
                order.order.status = status;
            }
            if let Some(payment_status) = changes.payment_status {
                order.order.payment_status = payment_status;
            }
            if let Some(notes) = &changes.notes {
                order.order.notes = Some(notes.clone());
            }
            order.order.updated_at = Utc::now();
            Ok(Some(order.clone()))
        }

        async fn cancel_order(&self, id: &str) -> Result<Option<OrderWithItems>, GenericError> {
            self.cancel_called.store(true, Ordering::SeqCst);
            let mut orders = self.orders.lock().unwrap();
            let Some(order) = orders.iter_mut().find(|o| o.order.id == id) else {
                return Ok(None);
            };
            order.order.status = OrderStatus::Cancelled;
            order.order.updated_at = Utc::now();
            Ok(Some(order.clone()))
        }
    }

    fn product(id: &str, price: f64, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            slug: format!("product-{}", id),
            price,
            image: None,
            variants,
        }
    }

    fn variant(id: &str, product_id: &str, price: Option<f64>) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            product_id: product_id.to_string(),
            name: format!("Variant {}", id),
            price,
        }
    }

    fn request(items: Vec<CreateOrderItem>) -> CreateOrderRequest {
        CreateOrderRequest {
            items,
            shipping_address_id: "addr_1".to_string(),
            billing_address_id: None,
            payment_method: "card".to_string(),
            shipping_method: "standard".to_string(),
            notes: None,
        }
    }

    fn item(product_id: &str, variant_id: Option<&str>, quantity: i32) -> CreateOrderItem {
        CreateOrderItem {
            product_id: product_id.to_string(),
            variant_id: variant_id.map(|v| v.to_string()),
            quantity,
        }
    }

    fn existing_order(id: &str, user_id: &str, status: OrderStatus) -> OrderWithItems {
        let now = Utc::now();
        OrderWithItems {
            order: Order {
                id: id.to_string(),
                order_number: format!("ORD-1700000000000-{}", id.len()),
                user_id: user_id.to_string(),
                status,
                payment_status: PaymentStatus::Paid,
                subtotal: 100.0,
                shipping: SHIPPING_COST,
                tax: 15.0,
                total: 125.0,
                payment_method: "card".to_string(),
                shipping_method: "standard".to_string(),
                notes: None,
                shipping_address_id: "addr_1".to_string(),
                billing_address_id: "addr_1".to_string(),
                created_at: now,
                updated_at: now,
            },
            items: Vec::new(),
        }
    }

    fn service(storage: MockStorage) -> OrderService {
        OrderService::new(Arc::new(storage), Arc::new(ExpressDeliveryMock))
    }

    #[tokio::test]
    async fn test_create_order_computes_totals() {
        let storage = MockStorage::with_products(vec![product("p1", 50.0, vec![])]);
        let svc = service(storage);

        let created = svc
            .create_order("user_1", request(vec![item("p1", None, 2)]))
            .await
            .unwrap();

        assert_eq!(created.order.subtotal, 100.0);
        assert_eq!(created.order.shipping, 10.0);
        assert_eq!(created.order.tax, 15.0);
        assert_eq!(created.order.total, 125.0);
        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.payment_status, PaymentStatus::Pending);
        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].total, 100.0);
    }

    #[tokio::test]
    async fn test_create_order_variant_price_overrides_base() {
        let storage = MockStorage::with_products(vec![product(
            "p1",
            999.99,
            vec![
                variant("v1", "p1", Some(1199.99)),
                variant("v2", "p1", None),
            ],
        )]);
        let svc = service(storage);

        let created = svc
            .create_order(
                "user_1",
                request(vec![item("p1", Some("v1"), 1), item("p1", Some("v2"), 1)]),
            )
            .await
            .unwrap();

        // v1 overrides the base price, v2 has no price and falls back to it.
        assert_eq!(created.items[0].price, 1199.99);
        assert_eq!(created.items[1].price, 999.99);
    }

    #[tokio::test]
    async fn test_create_order_unknown_product_persists_nothing() {
        let storage = Arc::new(MockStorage::with_products(vec![product("p1", 50.0, vec![])]));
        let svc = OrderService::new(storage.clone(), Arc::new(ExpressDeliveryMock));

        let err = svc
            .create_order(
                "user_1",
                request(vec![item("p1", None, 1), item("ghost", None, 1)]),
            )
            .await
            .unwrap_err();

        match err {
            OrderError::Rule(message) => assert!(message.contains("Product not found: ghost")),
            other => panic!("expected rule error, got {:?}", other),
        }
        assert!(!storage.insert_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_create_order_unknown_variant_fails() {
        let storage = MockStorage::with_products(vec![product(
            "p1",
            50.0,
            vec![variant("v1", "p1", None)],
        )]);
        let svc = service(storage);

        let err = svc
            .create_order("user_1", request(vec![item("p1", Some("v9"), 1)]))
            .await
            .unwrap_err();

        match err {
            OrderError::Rule(message) => assert!(message.contains("Variant not found: v9")),
            other => panic!("expected rule error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_order_validation_collects_all_violations() {
        let svc = service(MockStorage::default());
        let bad_request = CreateOrderRequest {
            items: vec![item("", None, 0)],
            shipping_address_id: "  ".to_string(),
            billing_address_id: None,
            payment_method: String::new(),
            shipping_method: "standard".to_string(),
            notes: None,
        };

        let err = svc.create_order("user_1", bad_request).await.unwrap_err();

        match err {
            OrderError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"items[0].productId"));
                assert!(fields.contains(&"items[0].quantity"));
                assert!(fields.contains(&"shippingAddressId"));
                assert!(fields.contains(&"paymentMethod"));
                assert_eq!(errors.len(), 4);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_order_billing_defaults_to_shipping() {
        let storage = MockStorage::with_products(vec![product("p1", 10.0, vec![])]);
        let svc = service(storage);

        let created = svc
            .create_order("user_1", request(vec![item("p1", None, 1)]))
            .await
            .unwrap();

        assert_eq!(created.order.billing_address_id, "addr_1");
        assert!(created.order.order_number.starts_with("ORD-"));
    }

    #[tokio::test]
    async fn test_get_order_scoped_to_owner() {
        let storage = MockStorage::with_orders(vec![existing_order(
            "ord_1",
            "owner",
            OrderStatus::Pending,
        )]);
        let svc = service(storage);

        assert!(svc.get_order("owner", "ord_1").await.is_ok());

        let err = svc.get_order("intruder", "ord_1").await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound));
    }

    #[tokio::test]
    async fn test_cancel_pending_order_succeeds() {
        let storage =
            MockStorage::with_orders(vec![existing_order("ord_1", "owner", OrderStatus::Pending)]);
        let svc = service(storage);

        let cancelled = svc.cancel_order("owner", "ord_1").await.unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_shipped_order_fails_and_leaves_status() {
        let storage =
            MockStorage::with_orders(vec![existing_order("ord_1", "owner", OrderStatus::Shipped)]);
        let svc = service(storage);

        let err = svc.cancel_order("owner", "ord_1").await.unwrap_err();
        assert!(matches!(err, OrderError::Rule(_)));

        let (order, _) = svc.get_order("owner", "ord_1").await.unwrap();
        assert_eq!(order.order.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_update_order_missing_is_not_found() {
        let svc = service(MockStorage::default());
        let err = svc
            .update_order("ghost", OrderChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound));
    }

    #[tokio::test]
    async fn test_tracking_for_pending_order_is_placeholder() {
        let storage =
            MockStorage::with_orders(vec![existing_order("ord_1", "owner", OrderStatus::Pending)]);
        let svc = service(storage);

        let tracking = svc.tracking("owner", "ord_1").await.unwrap();
        assert_eq!(tracking.tracking_number, None);
        assert!(tracking.events.is_empty());
        assert_eq!(tracking.status, "Not yet shipped");
    }

    #[tokio::test]
    async fn test_list_orders_meta_arithmetic() {
        let orders = (0..25)
            .map(|i| existing_order(&format!("ord_{}", i), "owner", OrderStatus::Pending))
            .collect();
        let svc = service(MockStorage::with_orders(orders));

        let listed = svc.list_orders("owner", 2, 10, None).await.unwrap();
        assert_eq!(listed.orders.len(), 10);
        assert_eq!(listed.meta.current_page, 2);
        assert_eq!(listed.meta.total_pages, 3);
        assert_eq!(listed.meta.total_items, 25);
        assert_eq!(listed.meta.page_size, 10);
        assert!(listed.meta.has_more);

        let last = svc.list_orders("owner", 3, 10, None).await.unwrap();
        assert_eq!(last.orders.len(), 5);
        assert!(!last.meta.has_more);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_status() {
        let svc = service(MockStorage::with_orders(vec![
            existing_order("ord_1", "owner", OrderStatus::Pending),
            existing_order("ord_2", "owner", OrderStatus::Shipped),
        ]));

        let listed = svc
            .list_orders("owner", 1, 10, Some(OrderStatus::Shipped))
            .await
            .unwrap();
        assert_eq!(listed.orders.len(), 1);
        assert_eq!(listed.orders[0].order.id, "ord_2");
    }

    #[test]
    fn test_timeline_delivered_marks_all_stages() {
        let order = existing_order("ord_1", "owner", OrderStatus::Delivered).order;
        let timeline = build_timeline(&order);

        assert_eq!(timeline.len(), 4);
        assert!(timeline.iter().all(|e| e.completed));
        assert!(timeline[3].current);
        assert!(timeline[..3].iter().all(|e| !e.current));
        assert_eq!(timeline[3].date, order.created_at + Duration::days(5));
    }

    #[test]
    fn test_timeline_processing_marks_two_stages() {
        let order = existing_order("ord_1", "owner", OrderStatus::Processing).order;
        let timeline = build_timeline(&order);

        assert!(timeline[0].completed && !timeline[0].current);
        assert!(timeline[1].completed && timeline[1].current);
        assert!(!timeline[2].completed && !timeline[3].completed);
    }

    #[test]
    fn test_timeline_cancelled_appends_fifth_entry() {
        let mut order = existing_order("ord_1", "owner", OrderStatus::Cancelled).order;
        order.updated_at = order.created_at + Duration::hours(6);
        let timeline = build_timeline(&order);

        assert_eq!(timeline.len(), 5);
        let cancelled = &timeline[4];
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.date, order.updated_at);
        assert!(cancelled.completed && cancelled.current);
        // Forward stages past pending never complete for a cancelled order.
        assert!(timeline[0].completed);
        assert!(!timeline[1].completed && !timeline[2].completed && !timeline[3].completed);
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
