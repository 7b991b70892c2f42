use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::model::{Order, OrderStatus, TrackingEvent, TrackingInfo};

/// Source of shipment tracking data for an order.
///
/// Modeled as an explicit collaborator so the mock below can be swapped for
/// a real carrier integration without touching the order service. `now` is
/// passed in rather than read from the clock to keep implementations
/// deterministic under test.
pub trait ShippingProvider: Send + Sync {
    fn tracking_for(&self, order: &Order, now: DateTime<Utc>) -> TrackingInfo;
}

/// Mock carrier that synthesizes a shipment feed from the order's age.
///
/// Milestones are day offsets from order creation, reported only once their
/// trigger date has passed. The tracking number is freshly randomized on
/// every call; a real integration would persist the number assigned by the
/// carrier instead.
#[derive(Debug, Default)]
pub struct ExpressDeliveryMock;

const CARRIER: &str = "Express Delivery";

impl ShippingProvider for ExpressDeliveryMock {
    fn tracking_for(&self, order: &Order, now: DateTime<Utc>) -> TrackingInfo {
        // Only shipped and delivered orders have tracking information.
        if !matches!(order.status, OrderStatus::Shipped | OrderStatus::Delivered) {
            return TrackingInfo {
                tracking_number: None,
                carrier: None,
                status: "Not yet shipped".to_string(),
                estimated_delivery: None,
                events: Vec::new(),
            };
        }

        let delivered = order.status == OrderStatus::Delivered;
        let placed = order.created_at;
        let at_day = |days: i64| placed + Duration::days(days);

        let mut events = vec![
            TrackingEvent {
                date: placed,
                location: "Order Processing Center".to_string(),
                description: "Order received".to_string(),
            },
            TrackingEvent {
                date: at_day(1),
                location: "Distribution Center".to_string(),
                description: "Order processed and ready for shipping".to_string(),
            },
        ];

        if now >= at_day(2) {
            events.push(TrackingEvent {
                date: at_day(2),
                location: "Regional Hub".to_string(),
                description: "Package has shipped".to_string(),
            });
        }

        if now >= at_day(3) {
            events.push(TrackingEvent {
                date: at_day(3),
                location: "Local Facility".to_string(),
                description: "Package in transit to destination".to_string(),
            });
        }

        if now >= at_day(4) && delivered {
            events.push(TrackingEvent {
                date: at_day(4),
                location: "Local Delivery Facility".to_string(),
                description: "Package out for delivery".to_string(),
            });
        }

        if delivered {
            events.push(TrackingEvent {
                date: at_day(5),
                location: "Destination".to_string(),
                description: "Package delivered".to_string(),
            });
        }

        events.sort_by(|a, b| b.date.cmp(&a.date));

        let tracking_number = format!("TRK{:06}", rand::thread_rng().gen_range(0..1_000_000));

        TrackingInfo {
            tracking_number: Some(tracking_number),
            carrier: Some(CARRIER.to_string()),
            status: if delivered { "Delivered" } else { "In Transit" }.to_string(),
            estimated_delivery: Some(at_day(5)),
            events,
        }
    }
}
