use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{domain::order_status::OrderStatus, models::TrackingEvent};

pub const SYSTEM_ACTOR: &str = "system";
pub const ORDER_RECEIVED: &str = "Order received";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAgent {
    pub name: String,
    pub role: String,
}

/// Newest first. Events written in the same instant fall back to insertion order.
pub fn sort_newest_first(events: &mut [TrackingEvent]) {
    events.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.sequence.cmp(&a.sequence))
    });
}

/// `None` when the offset does not fit in a timestamp.
pub fn estimated_delivery(created_at: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    created_at.checked_add_signed(Duration::try_days(days)?)
}

/// Location of the most recent event that recorded one. Expects newest-first input.
pub fn current_location(events: &[TrackingEvent]) -> Option<String> {
    events
        .iter()
        .filter_map(|e| e.location.as_deref())
        .map(str::trim)
        .find(|loc| !loc.is_empty())
        .map(str::to_string)
}

/// The delivery-staff member who last touched an order in transit. Expects newest-first input.
pub fn delivery_agent(status: OrderStatus, events: &[TrackingEvent]) -> Option<DeliveryAgent> {
    if !matches!(status, OrderStatus::Shipped | OrderStatus::Delivered) {
        return None;
    }
    events
        .iter()
        .find(|e| e.updated_by_role == "delivery")
        .map(|e| DeliveryAgent {
            name: e.updated_by.clone(),
            role: e.updated_by_role.clone(),
        })
}

/// Blank locations are stored as absent.
pub fn clean_location(location: Option<String>) -> Option<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn event(seq: i64, minute: u32, status: OrderStatus, location: Option<&str>, role: &str) -> TrackingEvent {
        TrackingEvent {
            id: Uuid::new_v4(),
            sequence: seq,
            order_id: Uuid::nil(),
            status,
            message: format!("step {seq}"),
            location: location.map(str::to_string),
            updated_by_id: None,
            updated_by: format!("{role}-{seq}"),
            updated_by_role: role.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn sorts_by_time_then_sequence() {
        let mut events = vec![
            event(1, 0, OrderStatus::Pending, None, SYSTEM_ACTOR),
            event(3, 5, OrderStatus::Shipped, None, "delivery"),
            event(2, 5, OrderStatus::Processing, None, "admin"),
        ];
        sort_newest_first(&mut events);
        let seqs: Vec<i64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![3, 2, 1]);
    }

    #[test]
    fn current_location_skips_events_without_one() {
        let mut events = vec![
            event(1, 0, OrderStatus::Pending, Some("Warehouse - New York"), SYSTEM_ACTOR),
            event(2, 1, OrderStatus::Shipped, Some("Newark Hub"), "delivery"),
            event(3, 2, OrderStatus::Shipped, Some("   "), "delivery"),
            event(4, 3, OrderStatus::Shipped, None, "admin"),
        ];
        sort_newest_first(&mut events);
        assert_eq!(current_location(&events).as_deref(), Some("Newark Hub"));
    }

    #[test]
    fn no_location_anywhere() {
        let events = vec![event(1, 0, OrderStatus::Pending, None, SYSTEM_ACTOR)];
        assert_eq!(current_location(&events), None);
    }

    #[test]
    fn estimate_is_a_fixed_offset_from_placement() {
        let placed = Utc.with_ymd_and_hms(2026, 1, 28, 9, 30, 0).unwrap();
        assert_eq!(
            estimated_delivery(placed, 7),
            Some(Utc.with_ymd_and_hms(2026, 2, 4, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn oversized_estimate_is_none_instead_of_panicking() {
        let placed = Utc.with_ymd_and_hms(2026, 1, 28, 9, 30, 0).unwrap();
        assert_eq!(estimated_delivery(placed, i64::MAX), None);
        assert_eq!(estimated_delivery(DateTime::<Utc>::MAX_UTC, 1), None);
    }

    #[test]
    fn delivery_agent_only_for_orders_in_transit() {
        let mut events = vec![
            event(1, 0, OrderStatus::Pending, None, SYSTEM_ACTOR),
            event(2, 1, OrderStatus::Shipped, None, "delivery"),
            event(3, 2, OrderStatus::Shipped, None, "admin"),
        ];
        sort_newest_first(&mut events);
        let agent = delivery_agent(OrderStatus::Shipped, &events).unwrap();
        assert_eq!(agent.name, "delivery-2");
        assert_eq!(delivery_agent(OrderStatus::Processing, &events), None);
    }

    #[test]
    fn blank_location_is_dropped() {
        assert_eq!(clean_location(Some("  ".into())), None);
        assert_eq!(clean_location(Some(" Newark Hub ".into())).as_deref(), Some("Newark Hub"));
        assert_eq!(clean_location(None), None);
    }
}
