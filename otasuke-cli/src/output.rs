use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use otasuke_client::models::{
    CompanyResponse, ContractorDashboard, DirectOrderListResponse, DirectOrderResponse,
    NotificationListResponse, OrderListResponse, OrderResponse, ProjectListResponse,
    ProjectResponse, QuoteListResponse, QuoteResponse, SubcontractorDashboard, UserResponse,
};
use serde::Serialize;
use std::io::Write;
#[cfg(feature = "table-output")]
use tabled::{builder::Builder, settings::Style};

/// Something the CLI can print in every output format.
pub trait Render: Serialize {
    fn title(&self) -> String;
    fn headers(&self) -> &'static [&'static str];
    fn rows(&self) -> Vec<Vec<String>>;
}

pub struct OutputManager {
    colored: bool,
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { colored, format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render<T: Render>(&self, value: &T) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => Ok(self.format_pretty(value)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)? + "\n"),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(value)? + "\n"),
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(self.format_table(value)),
            #[cfg(not(feature = "table-output"))]
            OutputFormat::Table => {
                // Fallback to pretty format when table feature is disabled
                Ok(self.format_pretty(value))
            }
        }
    }

    /// A one-line status message, wrapped in JSON for machine formats.
    pub fn message(&self, text: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let value = serde_json::json!({ "status": "ok", "message": text });
                Ok(serde_json::to_string(&value)? + "\n")
            }
            _ => Ok(format!("{} {}\n", self.colorize("✓", &Color::Green, true), text)),
        }
    }

    fn format_pretty<T: Render>(&self, value: &T) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize(&value.title(), &Color::Green, true));
        output.push('\n');

        let headers = value.headers();
        let rows = value.rows();
        if rows.is_empty() {
            output.push_str("  (none)\n");
            return output;
        }

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            for (header, cell) in headers.iter().zip(row) {
                if cell.is_empty() {
                    continue;
                }
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize(header, &Color::Yellow, false),
                    self.colorize(cell, &Color::Cyan, false)
                ));
            }
        }
        output
    }

    #[cfg(feature = "table-output")]
    fn format_table<T: Render>(&self, value: &T) -> String {
        let mut builder = Builder::default();
        builder.push_record(value.headers().iter().copied());
        for row in value.rows() {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        format!("{}\n{}\n", value.title(), table)
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Cyan,
}

pub fn write_output(content: &str) -> Result<()> {
    print!("{content}");
    std::io::stdout().flush()?;
    Ok(())
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

fn budget(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} - {}", yen(min), yen(max)),
        (Some(min), None) => format!("{} -", yen(min)),
        (None, Some(max)) => format!("- {}", yen(max)),
        (None, None) => String::new(),
    }
}

/// Signed-in user and company, for `whoami`.
#[derive(Serialize)]
pub struct Whoami {
    pub user: UserResponse,
    pub company: Option<CompanyResponse>,
}

impl Render for Whoami {
    fn title(&self) -> String {
        "Signed in".to_string()
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Email", "Role", "User ID", "Company", "Rating"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.user.email.clone(),
            self.user.role.to_string(),
            self.user.id.to_string(),
            self.company
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "(not registered)".to_string()),
            opt(self.company.as_ref().and_then(|c| c.average_rating)),
        ]]
    }
}

const PROJECT_HEADERS: &[&str] = &["ID", "Title", "Status", "Location", "Budget", "Deadline"];

fn project_row(p: &ProjectResponse) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.title.clone(),
        p.status.to_string(),
        opt(p.location.as_deref()),
        budget(p.budget_min, p.budget_max),
        opt(p.deadline.as_deref()),
    ]
}

impl Render for ProjectResponse {
    fn title(&self) -> String {
        format!("Project {}", self.title)
    }

    fn headers(&self) -> &'static [&'static str] {
        PROJECT_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![project_row(self)]
    }
}

impl Render for ProjectListResponse {
    fn title(&self) -> String {
        format!(
            "Projects (page {}/{}, {} total)",
            self.page,
            self.pages.max(1),
            self.total
        )
    }

    fn headers(&self) -> &'static [&'static str] {
        PROJECT_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items.iter().map(project_row).collect()
    }
}

const QUOTE_HEADERS: &[&str] = &["ID", "Project", "Amount", "Days", "Status", "Message"];

fn quote_row(q: &QuoteResponse) -> Vec<String> {
    vec![
        q.id.to_string(),
        q.project_id.to_string(),
        yen(q.amount),
        opt(q.estimated_days),
        q.status.to_string(),
        opt(q.message.as_deref()),
    ]
}

impl Render for QuoteResponse {
    fn title(&self) -> String {
        "Quote".to_string()
    }

    fn headers(&self) -> &'static [&'static str] {
        QUOTE_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![quote_row(self)]
    }
}

impl Render for QuoteListResponse {
    fn title(&self) -> String {
        format!("Quotes ({} total)", self.total)
    }

    fn headers(&self) -> &'static [&'static str] {
        QUOTE_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items.iter().map(quote_row).collect()
    }
}

const ORDER_HEADERS: &[&str] = &["ID", "Project", "Amount", "Status", "Created"];

fn order_row(o: &OrderResponse) -> Vec<String> {
    vec![
        o.id.to_string(),
        o.project_id.to_string(),
        yen(o.amount),
        o.status.to_string(),
        o.created_at.format("%Y-%m-%d").to_string(),
    ]
}

impl Render for OrderResponse {
    fn title(&self) -> String {
        "Order".to_string()
    }

    fn headers(&self) -> &'static [&'static str] {
        ORDER_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![order_row(self)]
    }
}

impl Render for OrderListResponse {
    fn title(&self) -> String {
        format!("Orders ({} total)", self.total)
    }

    fn headers(&self) -> &'static [&'static str] {
        ORDER_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items.iter().map(order_row).collect()
    }
}

impl Render for NotificationListResponse {
    fn title(&self) -> String {
        format!("Notifications ({} unread)", self.unread_count)
    }

    fn headers(&self) -> &'static [&'static str] {
        &["ID", "Type", "Title", "Read", "Received"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|n| {
                vec![
                    n.id.to_string(),
                    n.kind.to_string(),
                    n.title.clone(),
                    if n.is_read { "yes" } else { "no" }.to_string(),
                    n.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect()
    }
}

const DIRECT_ORDER_HEADERS: &[&str] = &[
    "ID",
    "Title",
    "Contractor",
    "Subcontractor",
    "Amount",
    "Deadline",
    "Status",
    "Decline reason",
];

fn direct_order_row(o: &DirectOrderResponse) -> Vec<String> {
    vec![
        o.id.to_string(),
        o.title.clone(),
        opt(o.contractor_company.as_ref().map(|c| c.name.as_str())),
        opt(o.subcontractor_company.as_ref().map(|c| c.name.as_str())),
        yen(o.amount),
        opt(o.deadline),
        o.status.to_string(),
        opt(o.decline_reason.as_deref()),
    ]
}

impl Render for DirectOrderResponse {
    fn title(&self) -> String {
        format!("Direct order {}", self.title)
    }

    fn headers(&self) -> &'static [&'static str] {
        DIRECT_ORDER_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![direct_order_row(self)]
    }
}

impl Render for DirectOrderListResponse {
    fn title(&self) -> String {
        format!("Direct orders ({} total)", self.total)
    }

    fn headers(&self) -> &'static [&'static str] {
        DIRECT_ORDER_HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items.iter().map(direct_order_row).collect()
    }
}

impl Render for ContractorDashboard {
    fn title(&self) -> String {
        "Contractor dashboard".to_string()
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "Projects",
            "Open",
            "In progress",
            "Completed",
            "Orders",
            "Pending quotes",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.total_projects.to_string(),
            self.open_projects.to_string(),
            self.in_progress_projects.to_string(),
            self.completed_projects.to_string(),
            self.total_orders.to_string(),
            self.pending_quotes.to_string(),
        ]]
    }
}

impl Render for SubcontractorDashboard {
    fn title(&self) -> String {
        "Subcontractor dashboard".to_string()
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Quotes", "Accepted", "Active orders", "Completed", "Rating"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.total_quotes.to_string(),
            self.accepted_quotes.to_string(),
            self.active_orders.to_string(),
            self.completed_orders.to_string(),
            opt(self.average_rating),
        ]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dashboard() -> SubcontractorDashboard {
        SubcontractorDashboard {
            total_quotes: 4,
            accepted_quotes: 1,
            active_orders: 1,
            completed_orders: 0,
            average_rating: None,
        }
    }

    #[rstest]
    #[case(0, "¥0")]
    #[case(999, "¥999")]
    #[case(1_000, "¥1,000")]
    #[case(1_250_000, "¥1,250,000")]
    #[case(-42_000, "-¥42,000")]
    fn test_yen(#[case] amount: i64, #[case] expected: &str) {
        assert_eq!(yen(amount), expected);
    }

    #[test]
    fn test_pretty_skips_empty_cells() {
        let output = OutputManager::new(OutputFormat::Pretty, false)
            .render(&dashboard())
            .unwrap();

        assert!(output.starts_with("Subcontractor dashboard\n"));
        assert!(output.contains("  Quotes: 4\n"));
        assert!(!output.contains("Rating"));
    }

    #[test]
    fn test_json_is_the_payload() {
        let output = OutputManager::new(OutputFormat::JsonCompact, false)
            .render(&dashboard())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_quotes"], 4);
    }

    #[test]
    fn test_message_in_json_mode() {
        let output = OutputManager::new(OutputFormat::Json, false)
            .message("Signed out")
            .unwrap();
        assert_eq!(output, "{\"status\":\"ok\",\"message\":\"Signed out\"}\n");
    }

    #[test]
    fn test_empty_list() {
        let list = OrderListResponse {
            items: Vec::new(),
            total: 0,
        };
        let output = OutputManager::new(OutputFormat::Pretty, false)
            .render(&list)
            .unwrap();
        assert_eq!(output, "Orders (0 total)\n  (none)\n");
    }
}
