//! The order model and its shipment tracking metadata.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrderError, Result};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Processing,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
        Self::Refunded,
        Self::Failed,
    ];

    /// Parses a status slug. A `wc-` prefix is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let slug = s.trim().to_ascii_lowercase();
        let slug = slug.strip_prefix("wc-").unwrap_or(&slug);
        Self::ALL
            .into_iter()
            .find(|status| status.slug() == slug)
            .ok_or_else(|| OrderError::InvalidStatus(s.to_string()))
    }

    /// Returns the status slug.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }

    /// Returns the human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending payment",
            Self::Processing => "Processing",
            Self::OnHold => "On hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A billing or shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// A purchased product line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: u64,
    pub name: String,
    pub product_id: u64,
    pub sku: String,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
    pub total: String,
}

/// A note attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub note: String,
    /// Whether the note is visible to the customer.
    #[serde(default)]
    pub customer_note: bool,
}

/// Shipment tracking attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    /// Carrier slug, e.g. `ups`.
    pub tracking_provider: String,
    /// Carrier display name, when it differs from the slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_provider_name: Option<String>,
    pub tracking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<NaiveDate>,
}

impl TrackingInfo {
    /// Creates tracking info for a carrier and number.
    pub fn new(provider: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            tracking_provider: provider.into(),
            tracking_provider_name: None,
            tracking_number: number.into(),
            ship_date: None,
        }
    }

    /// Returns the carrier name shown to customers.
    pub fn provider_display_name(&self) -> &str {
        self.tracking_provider_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.tracking_provider)
    }

    /// Renders the customer-facing shipment line.
    pub fn summary(&self) -> String {
        format!(
            "Your order was shipped via {}. Tracking number is {}.",
            self.provider_display_name(),
            self.tracking_number
        )
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// An order with shipment tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub total_shipping: String,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub customer_note: String,
    #[serde(default)]
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_address: Address,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tracking: Option<TrackingInfo>,
    /// Served by the notes route, not embedded in the order document.
    #[serde(default, skip_serializing)]
    pub notes: Vec<OrderNote>,
}

impl Order {
    /// Creates an empty pending order.
    pub fn new(id: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            order_number: id.to_string(),
            created_at,
            updated_at: created_at,
            completed_at: None,
            status: OrderStatus::Pending,
            currency: default_currency(),
            total: "0.00".to_string(),
            total_shipping: "0.00".to_string(),
            customer_id: 0,
            customer_note: String::new(),
            billing_address: Address::default(),
            shipping_address: Address::default(),
            line_items: Vec::new(),
            tracking: None,
            notes: Vec::new(),
        }
    }

    /// Renders the order document.
    pub fn to_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if self.order_number.is_empty() {
            value["order_number"] = Value::String(self.id.to_string());
        }
        Ok(value)
    }

    /// Appends a note and returns it.
    ///
    /// Note ids follow the highest existing id and stop at `u64::MAX`.
    pub fn add_note(&mut self, note: impl Into<String>, customer_note: bool) -> &OrderNote {
        let id = self
            .notes
            .iter()
            .map(|n| n.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.notes.push(OrderNote {
            id,
            created_at: Utc::now(),
            note: note.into(),
            customer_note,
        });
        &self.notes[self.notes.len() - 1]
    }

    /// Changes the status, recording a note if it actually changed.
    pub fn set_status(&mut self, status: OrderStatus) {
        if self.status == status {
            return;
        }
        let note = format!(
            "Order status changed from {} to {}.",
            self.status.label(),
            status.label()
        );
        self.status = status;
        if status == OrderStatus::Completed {
            self.completed_at = Some(Utc::now());
        }
        self.add_note(note, false);
    }

    /// Records a shipment: stores tracking, completes the order and tells
    /// the customer.
    pub fn ship(&mut self, tracking: TrackingInfo) {
        let summary = tracking.summary();
        self.tracking = Some(tracking);
        self.set_status(OrderStatus::Completed);
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        self.add_note(summary, true);
    }
}

/// Keeps only the comma-separated top-level `fields` of a document.
///
/// `None` or an empty list keeps everything.
pub fn select_fields(value: Value, fields: Option<&str>) -> Value {
    let wanted: Vec<&str> = fields
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    match value {
        Value::Object(map) if !wanted.is_empty() => Value::Object(
            map.into_iter()
                .filter(|(k, _)| wanted.contains(&k.as_str()))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Order {
        Order::new(1, Utc::now())
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(OrderStatus::parse("completed").unwrap(), OrderStatus::Completed);
        assert_eq!(OrderStatus::parse("wc-on-hold").unwrap(), OrderStatus::OnHold);
        assert_eq!(OrderStatus::parse(" Pending ").unwrap(), OrderStatus::Pending);
        assert!(matches!(
            OrderStatus::parse("shipped"),
            Err(OrderError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_value(OrderStatus::OnHold).unwrap(), json!("on-hold"));
        let status: OrderStatus = serde_json::from_value(json!("refunded")).unwrap();
        assert_eq!(status, OrderStatus::Refunded);
    }

    #[test]
    fn test_set_status_adds_note() {
        let mut order = order();
        order.set_status(OrderStatus::Processing);
        assert_eq!(order.notes.len(), 1);
        assert_eq!(
            order.notes[0].note,
            "Order status changed from Pending payment to Processing."
        );
        assert!(!order.notes[0].customer_note);

        order.set_status(OrderStatus::Processing);
        assert_eq!(order.notes.len(), 1);
    }

    #[test]
    fn test_note_ids_follow_highest_and_saturate() {
        let mut order = order();
        assert_eq!(order.add_note("first", false).id, 1);

        order.notes[0].id = 40;
        assert_eq!(order.add_note("second", true).id, 41);

        order.notes[1].id = u64::MAX;
        assert_eq!(order.add_note("third", false).id, u64::MAX);
        assert_eq!(order.notes.len(), 3);
    }

    #[test]
    fn test_ship() {
        let mut order = order();
        let mut tracking = TrackingInfo::new("ups", "1Z999");
        tracking.tracking_provider_name = Some("UPS".to_string());
        order.ship(tracking);

        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());
        assert_eq!(order.notes.len(), 2);
        assert_eq!(
            order.notes[1].note,
            "Your order was shipped via UPS. Tracking number is 1Z999."
        );
        assert!(order.notes[1].customer_note);
        assert_eq!(order.notes[1].id, 2);
    }

    #[test]
    fn test_tracking_summary_falls_back_to_slug() {
        let tracking = TrackingInfo::new("dhl", "JD0001");
        assert_eq!(
            tracking.summary(),
            "Your order was shipped via dhl. Tracking number is JD0001."
        );
    }

    #[test]
    fn test_to_json_omits_notes() {
        let mut order = order();
        order.order_number = String::new();
        order.add_note("internal", false);
        let value = order.to_json().unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["order_number"], "1");
        assert_eq!(value["status"], "pending");
        assert!(value.get("notes").is_none());
        assert_eq!(value["tracking"], Value::Null);
    }

    #[test]
    fn test_select_fields() {
        let doc = json!({"id": 1, "status": "pending", "total": "9.99"});
        assert_eq!(
            select_fields(doc.clone(), Some("id, total")),
            json!({"id": 1, "total": "9.99"})
        );
        assert_eq!(select_fields(doc.clone(), None), doc);
        assert_eq!(select_fields(doc.clone(), Some("")), doc);
    }

    #[test]
    fn test_deserialize_minimal_order() {
        let order: Order = serde_json::from_value(json!({
            "id": 5,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z",
            "status": "processing"
        }))
        .unwrap();
        assert_eq!(order.currency, "USD");
        assert!(order.line_items.is_empty());
        assert!(order.tracking.is_none());
    }
}
