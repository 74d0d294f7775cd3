//! Work order entity - a unit of field service work

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{new_record_id, OrderNumber};

/// Kind of service activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Activity {
    #[serde(rename = "Instalación")]
    #[value(name = "instalacion", alias = "installation")]
    Installation,
    #[serde(rename = "Reparación")]
    #[value(name = "reparacion", alias = "repair")]
    Repair,
    #[serde(rename = "Mantenimiento")]
    #[value(name = "mantenimiento", alias = "maintenance")]
    Maintenance,
}

impl Activity {
    pub const ALL: [Activity; 3] = [
        Activity::Installation,
        Activity::Repair,
        Activity::Maintenance,
    ];

    /// Label as stored and displayed
    pub fn label(&self) -> &'static str {
        match self {
            Activity::Installation => "Instalación",
            Activity::Repair => "Reparación",
            Activity::Maintenance => "Mantenimiento",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instalación" | "instalacion" | "installation" => Ok(Activity::Installation),
            "reparación" | "reparacion" | "repair" => Ok(Activity::Repair),
            "mantenimiento" | "maintenance" => Ok(Activity::Maintenance),
            _ => Err(format!(
                "Invalid activity: {}. Use Instalación, Reparación, or Mantenimiento",
                s
            )),
        }
    }
}

/// Order priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Priority {
    #[serde(rename = "Alta")]
    #[value(name = "alta", alias = "high")]
    High,
    #[serde(rename = "Media")]
    #[value(name = "media", alias = "medium")]
    Medium,
    #[serde(rename = "Baja")]
    #[value(name = "baja", alias = "low")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Media",
            Priority::Low => "Baja",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alta" | "high" => Ok(Priority::High),
            "media" | "medium" => Ok(Priority::Medium),
            "baja" | "low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {}. Use Alta, Media, or Baja", s)),
        }
    }
}

/// Work order lifecycle: Abierta -> En progreso -> Cerrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum OrderStatus {
    #[serde(rename = "Abierta")]
    #[value(name = "abierta", alias = "open")]
    Open,
    #[serde(rename = "En progreso")]
    #[value(name = "en-progreso", alias = "in-progress")]
    InProgress,
    #[serde(rename = "Cerrada")]
    #[value(name = "cerrada", alias = "closed")]
    Closed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Open,
        OrderStatus::InProgress,
        OrderStatus::Closed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Abierta",
            OrderStatus::InProgress => "En progreso",
            OrderStatus::Closed => "Cerrada",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "abierta" | "open" => Ok(OrderStatus::Open),
            "en progreso" | "in progress" => Ok(OrderStatus::InProgress),
            "cerrada" | "closed" => Ok(OrderStatus::Closed),
            _ => Err(format!(
                "Invalid status: {}. Use Abierta, En progreso, or Cerrada",
                s
            )),
        }
    }
}

/// Fields captured by the new-order form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkOrder {
    pub client_id: String,
    pub activity: Activity,
    pub priority: Priority,
    pub description: String,
}

/// Fields the edit form may change; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChange {
    pub activity: Option<Activity>,
    pub priority: Option<Priority>,
    pub status: Option<OrderStatus>,
}

/// A work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    /// Unique identifier
    pub id: String,

    /// Sequential display number, zero-padded (e.g. "007")
    pub order_number: String,

    /// Referenced client (not enforced)
    pub client_id: String,

    pub activity: Activity,

    pub priority: Priority,

    #[serde(default)]
    pub status: OrderStatus,

    /// Work description
    pub description: String,

    /// User who opened the order
    pub responsible_user_id: String,

    /// User currently assigned, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Record for WorkOrder {
    const KEY: &'static str = "work_orders";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl WorkOrder {
    /// Create a new open work order
    pub fn new(number: OrderNumber, fields: NewWorkOrder, responsible_user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            order_number: number.to_string(),
            client_id: fields.client_id,
            activity: fields.activity,
            priority: fields.priority,
            status: OrderStatus::Open,
            description: fields.description,
            responsible_user_id,
            owner_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parsed order number, if the stored value is numeric
    pub fn number(&self) -> Option<OrderNumber> {
        self.order_number.parse().ok()
    }

    /// Apply an edit, returning true when any field actually changed
    pub fn apply(&mut self, change: &OrderChange) -> bool {
        let before = (self.activity, self.priority, self.status);
        if let Some(activity) = change.activity {
            self.activity = activity;
        }
        if let Some(priority) = change.priority {
            self.priority = priority;
        }
        if let Some(status) = change.status {
            self.status = status;
        }
        before != (self.activity, self.priority, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewWorkOrder {
        NewWorkOrder {
            client_id: "1".to_string(),
            activity: Activity::Installation,
            priority: Priority::High,
            description: "Instalación de fibra óptica".to_string(),
        }
    }

    #[test]
    fn test_new_order_starts_open() {
        let order = WorkOrder::new(OrderNumber::new(4), fields(), "7".to_string());
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.order_number, "004");
        assert_eq!(order.responsible_user_id, "7");
        assert!(order.owner_user_id.is_none());
    }

    #[test]
    fn test_enums_serialize_as_spanish_labels() {
        let order = WorkOrder::new(OrderNumber::new(1), fields(), "1".to_string());
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["activity"], "Instalación");
        assert_eq!(json["priority"], "Alta");
        assert_eq!(json["status"], "Abierta");
        assert_eq!(json["orderNumber"], "001");
        assert!(json.get("ownerUserId").is_none());
    }

    #[test]
    fn test_in_progress_label() {
        let status: OrderStatus = serde_json::from_str("\"En progreso\"").unwrap();
        assert_eq!(status, OrderStatus::InProgress);
        assert_eq!(status.to_string(), "En progreso");
    }

    #[test]
    fn test_from_str_accepts_labels_and_slugs() {
        assert_eq!("Reparación".parse::<Activity>().unwrap(), Activity::Repair);
        assert_eq!("reparacion".parse::<Activity>().unwrap(), Activity::Repair);
        assert_eq!("maintenance".parse::<Activity>().unwrap(), Activity::Maintenance);
        assert_eq!("BAJA".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("en-progreso".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!("En progreso".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_apply_change() {
        let mut order = WorkOrder::new(OrderNumber::new(1), fields(), "1".to_string());
        assert!(!order.apply(&OrderChange::default()));
        assert!(order.apply(&OrderChange {
            status: Some(OrderStatus::Closed),
            ..Default::default()
        }));
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.activity, Activity::Installation);
    }

    #[test]
    fn test_number_parses_stored_value() {
        let order = WorkOrder::new(OrderNumber::new(12), fields(), "1".to_string());
        assert_eq!(order.number(), Some(OrderNumber::new(12)));
    }
}
