//! Aggregate order statistics and CSV export

use serde::Serialize;
use std::io;

use crate::core::query::EnrichedOrder;
use crate::entities::{Activity, OrderStatus, Priority, WorkOrder};

/// Count of orders in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: &'static str,
    pub count: usize,
    /// Share of all orders, 0-100 with one decimal
    pub percentage: f64,
}

/// Order totals broken down by status, activity and priority
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub by_status: Vec<CategoryCount>,
    pub by_activity: Vec<CategoryCount>,
    pub by_priority: Vec<CategoryCount>,
}

impl OrderStats {
    /// Orders not yet closed
    pub fn active(&self) -> usize {
        self.total - self.count_of(OrderStatus::Closed.label())
    }

    pub fn closed(&self) -> usize {
        self.count_of(OrderStatus::Closed.label())
    }

    fn count_of(&self, status_label: &str) -> usize {
        self.by_status
            .iter()
            .find(|c| c.label == status_label)
            .map_or(0, |c| c.count)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

fn tally<T: Copy + PartialEq>(
    orders: &[WorkOrder],
    categories: &[T],
    field: impl Fn(&WorkOrder) -> T,
    label: impl Fn(T) -> &'static str,
) -> Vec<CategoryCount> {
    categories
        .iter()
        .map(|&category| {
            let count = orders.iter().filter(|o| field(o) == category).count();
            CategoryCount {
                label: label(category),
                count,
                percentage: percentage(count, orders.len()),
            }
        })
        .collect()
}

/// Compute totals over every stored order
pub fn order_stats(orders: &[WorkOrder]) -> OrderStats {
    OrderStats {
        total: orders.len(),
        by_status: tally(orders, &OrderStatus::ALL, |o| o.status, |s| s.label()),
        by_activity: tally(orders, &Activity::ALL, |o| o.activity, |a| a.label()),
        by_priority: tally(orders, &Priority::ALL, |o| o.priority, |p| p.label()),
    }
}

/// Column headers of the order export
pub const EXPORT_HEADERS: [&str; 6] = ["ID", "Fecha", "Cliente", "Estado", "Tipo", "Prioridad"];

/// Write the given rows as CSV, one line per order
pub fn write_orders_csv<W: io::Write>(rows: &[EnrichedOrder<'_>], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;

    for row in rows {
        let date = row.order.created_at.format("%d-%m-%Y").to_string();
        wtr.write_record([
            row.order.order_number.as_str(),
            date.as_str(),
            row.client_name(),
            row.order.status.label(),
            row.order.activity.label(),
            row.order.priority.label(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::OrderNumber;
    use crate::core::query::enrich;
    use crate::entities::{Client, ClientDraft, NewWorkOrder};

    fn order(n: u64, activity: Activity, priority: Priority, status: OrderStatus) -> WorkOrder {
        let mut o = WorkOrder::new(
            OrderNumber::new(n),
            NewWorkOrder {
                client_id: "1".to_string(),
                activity,
                priority,
                description: "x".to_string(),
            },
            "1".to_string(),
        );
        o.status = status;
        o
    }

    fn sample() -> Vec<WorkOrder> {
        vec![
            order(1, Activity::Installation, Priority::High, OrderStatus::InProgress),
            order(2, Activity::Repair, Priority::Medium, OrderStatus::Open),
            order(3, Activity::Maintenance, Priority::Low, OrderStatus::Closed),
            order(4, Activity::Installation, Priority::High, OrderStatus::Open),
        ]
    }

    #[test]
    fn test_order_stats() {
        let stats = order_stats(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.closed(), 1);
        assert_eq!(stats.active(), 3);

        let install = &stats.by_activity[0];
        assert_eq!(install.label, "Instalación");
        assert_eq!(install.count, 2);
        assert_eq!(install.percentage, 50.0);

        let high = stats.by_priority.iter().find(|c| c.label == "Alta").unwrap();
        assert_eq!(high.count, 2);
    }

    #[test]
    fn test_order_stats_empty() {
        let stats = order_stats(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.by_status.iter().all(|c| c.count == 0 && c.percentage == 0.0));
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[test]
    fn test_csv_export() {
        let mut client = Client::new(ClientDraft {
            name: "Rodríguez, Carlos".to_string(),
            ..Default::default()
        });
        client.id = "1".to_string();
        let clients = vec![client];
        let orders = sample();
        let rows = enrich(&orders, &clients);

        let mut out = Vec::new();
        write_orders_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "ID,Fecha,Cliente,Estado,Tipo,Prioridad");
        assert!(lines[1].starts_with("001,"));
        assert!(lines[1].contains("\"Rodríguez, Carlos\""));
        assert!(lines[1].ends_with("En progreso,Instalación,Alta"));
    }
}
