//! Table formatting for CLI list commands
//!
//! Client and order lists share one formatter so every list honors the same
//! `--format` values. Column widths are sized to content and capped by the
//! column definition.

use chrono::{DateTime, Local, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_short_id_str, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::{Activity, OrderStatus, Priority};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 client(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// No summary line, for piping or when the caller prints its own footer
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id (truncated in TSV)
    Id(String),
    /// Order number, cyan colored
    OrderNumber(String),
    /// Plain text, truncated to the column
    Text(String),
    /// Order status with color coding
    Status(OrderStatus),
    /// Priority with color coding
    Priority(Priority),
    Activity(Activity),
    /// DateTime displayed as date only
    Date(DateTime<Utc>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                format!("{:<width$}", format_short_id_str(id), width = width)
            }
            CellValue::OrderNumber(n) => format!("{:<width$}", style(n).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Status(status) => {
                let styled = match status {
                    OrderStatus::Open => style(status.label()).yellow(),
                    OrderStatus::InProgress => style(status.label()).cyan(),
                    OrderStatus::Closed => style(status.label()).green().dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Priority(priority) => {
                let styled = match priority {
                    Priority::Low => style(priority.label()).dim(),
                    Priority::Medium => style(priority.label()).white(),
                    Priority::High => style(priority.label()).red().bold(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Activity(activity) => {
                format!("{:<width$}", activity.label(), width = width)
            }
            CellValue::Date(_) => format!("{:<width$}", self.raw(), width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            _ => escape_csv(&self.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            _ => self.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::OrderNumber(s) | CellValue::Text(s) => s.clone(),
            CellValue::Status(status) => status.label().to_string(),
            CellValue::Priority(priority) => priority.label().to_string(),
            CellValue::Activity(activity) => activity.label().to_string(),
            CellValue::Date(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%d").to_string()
            }
            CellValue::Empty => String::new(),
        }
    }

    /// Display width of this cell's content in characters
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => id.chars().count().min(16),
            CellValue::Date(_) => 10,
            CellValue::Empty => 1,
            _ => self.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(full_id: impl Into<String>) -> Self {
        Self {
            full_id: full_id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in the list output formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.full_id)).collect(),
            _ => self.render_tsv(rows),
        }
    }

    /// Print rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    /// Dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                // +2 leaves room for the truncation marker
                let natural = col.header.len().max(max_content.saturating_add(2));
                natural.min(col.width)
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| format!("{:<w$}", style(col.header).bold()))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, &w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(w),
                    None => format!("{:<w$}", "-"),
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.config.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = String::from("id");
        for col in self.columns {
            out.push(',');
            out.push_str(col.key);
        }
        out.push('\n');

        for row in rows {
            out.push_str(&escape_csv(&row.full_id));
            for col in self.columns {
                out.push(',');
                if let Some(value) = row.get(col.key) {
                    out.push_str(&value.format_csv());
                }
            }
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        let mut out = format!("| {} |\n", headers.join(" | "));
        out.push_str(&format!("|{}\n", "---|".repeat(self.columns.len())));

        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map_or("-".to_string(), CellValue::format_md))
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("number", "#", 6),
        ColumnDef::new("client", "CLIENTE", 24),
        ColumnDef::new("status", "ESTADO", 13),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("01J0000000000000000000000A")
                .cell("number", CellValue::OrderNumber("001".to_string()))
                .cell("client", CellValue::Text("Rodríguez, Carlos".to_string()))
                .cell("status", CellValue::Status(OrderStatus::InProgress)),
            TableRow::new("01J0000000000000000000000B")
                .cell("number", CellValue::OrderNumber("002".to_string()))
                .cell("client", CellValue::Text("Ana | Sofía".to_string()))
                .cell("status", CellValue::Empty),
        ]
    }

    #[test]
    fn test_render_csv() {
        let out = TableFormatter::new(COLUMNS, "order").render(&rows(), OutputFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id,number,client,status");
        assert_eq!(
            lines[1],
            "01J0000000000000000000000A,001,\"Rodríguez, Carlos\",En progreso"
        );
        assert!(lines[2].ends_with(",002,Ana | Sofía,"));
    }

    #[test]
    fn test_render_md_escapes_pipes() {
        let out = TableFormatter::new(COLUMNS, "order").render(&rows(), OutputFormat::Md);
        assert!(out.starts_with("| # | CLIENTE | ESTADO |\n|---|---|---|\n"));
        assert!(out.contains("Ana \\| Sofía"));
        assert!(out.contains("| 002 | Ana \\| Sofía | - |"));
    }

    #[test]
    fn test_render_ids() {
        let out = TableFormatter::new(COLUMNS, "order").render(&rows(), OutputFormat::Id);
        assert_eq!(out, "01J0000000000000000000000A\n01J0000000000000000000000B\n");
    }

    #[test]
    fn test_render_tsv_summary() {
        let out = TableFormatter::new(COLUMNS, "order").render(&rows(), OutputFormat::Tsv);
        assert!(out.contains("Rodríguez, Carlos"));
        assert!(out.contains("order(s) found."));

        let bare = TableFormatter::new(COLUMNS, "order")
            .with_config(TableConfig::for_pipe())
            .render(&rows(), OutputFormat::Tsv);
        assert!(!bare.contains("found."));
    }

    #[test]
    fn test_display_width_counts_characters() {
        assert_eq!(CellValue::Text("Sofía".to_string()).display_width(), 5);
        assert_eq!(CellValue::Activity(Activity::Repair).display_width(), 10);
    }
}
