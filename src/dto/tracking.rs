use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    domain::tracking::DeliveryAgent,
    dto::orders::OrderWithItems,
    models::TrackingEvent,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order: OrderWithItems,
    /// Newest first.
    pub events: Vec<TrackingEvent>,
    pub estimated_delivery: DateTime<Utc>,
    pub current_location: Option<String>,
    pub delivery_agent: Option<DeliveryAgent>,
}
