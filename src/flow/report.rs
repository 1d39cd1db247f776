//! Summary report over the written tables
//!
//! The reporter only reads. Any failure is logged and turned into a warning
//! on the run; it never fails the flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info};

use super::config::Flow;
use crate::warehouse::{Namespace, TableRef, Warehouse, WarehouseResult};

/// Format a number with thousand separators
pub fn format_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// `part / total` as a one-decimal percentage, `n/a` for an empty total
pub fn format_percent(part: i64, total: i64) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    format!("{:.1}%", part as f64 / total as f64 * 100.0)
}

fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Orders domain summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersSummary {
    pub orders: i64,
    pub order_lines: i64,
    pub orders_with_customer: i64,
    pub orders_with_date: i64,
    pub lines_with_stock_item: i64,
    pub lines_with_positive_quantity: i64,
}

/// Unit price statistics over items priced above zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub stddev: Option<f64>,
}

/// Stock holding statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_quantity: Option<i64>,
    pub average_quantity: Option<f64>,
    pub out_of_stock: i64,
    pub below_reorder: i64,
}

/// Distinct items assigned to a stock group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub name: Option<String>,
    pub items: i64,
}

/// Stock item attribute completeness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    pub with_name: i64,
    pub with_price: i64,
    pub with_brand: i64,
    pub with_size: i64,
}

/// Stock domain summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub stock_items: i64,
    pub stock_holdings: i64,
    pub stock_groups: i64,
    pub stock_item_groups: i64,
    pub price: PriceStats,
    pub inventory: InventoryStats,
    pub top_groups: Vec<GroupCount>,
    pub completeness: Completeness,
}

/// Domain-specific report body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "lowercase")]
pub enum SummaryBody {
    Orders(OrdersSummary),
    Stock(StockSummary),
}

/// Summary report for one flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub catalog: String,
    pub schema: String,
    pub body: SummaryBody,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.body {
            SummaryBody::Orders(_) => "=== DATA EXTRACTION SUMMARY ===",
            SummaryBody::Stock(_) => "=== STOCK DATA EXTRACTION SUMMARY ===",
        };
        writeln!(f, "{}", title)?;
        writeln!(
            f,
            "Extraction completed at: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "Target catalog: {}", self.catalog)?;
        writeln!(f, "Target schema: {}", self.schema)?;
        writeln!(f)?;

        match &self.body {
            SummaryBody::Orders(s) => {
                writeln!(f, "📊 RECORD COUNTS:")?;
                writeln!(f, "  - Orders: {}", format_number(s.orders))?;
                writeln!(f, "  - Order Lines: {}", format_number(s.order_lines))?;
                writeln!(f)?;
                writeln!(f, "🔍 DATA QUALITY METRICS:")?;
                let lines = [
                    ("Orders with CustomerID", s.orders_with_customer, s.orders),
                    ("Orders with OrderDate", s.orders_with_date, s.orders),
                    ("Order lines with StockItemID", s.lines_with_stock_item, s.order_lines),
                    (
                        "Order lines with positive quantity",
                        s.lines_with_positive_quantity,
                        s.order_lines,
                    ),
                ];
                for (label, part, total) in lines {
                    writeln!(
                        f,
                        "  - {}: {} ({})",
                        label,
                        format_number(part),
                        format_percent(part, total)
                    )?;
                }
                writeln!(f)?;
                write!(f, "✅ Orders extraction completed successfully!")
            }
            SummaryBody::Stock(s) => {
                writeln!(f, "📊 RECORD COUNTS:")?;
                writeln!(f, "  - Stock Items: {}", format_number(s.stock_items))?;
                writeln!(f, "  - Stock Holdings: {}", format_number(s.stock_holdings))?;
                writeln!(f, "  - Stock Groups: {}", format_number(s.stock_groups))?;
                writeln!(
                    f,
                    "  - Stock Item-Group Relationships: {}",
                    format_number(s.stock_item_groups)
                )?;
                writeln!(f)?;

                writeln!(f, "📈 BUSINESS INSIGHTS:")?;
                writeln!(f, "  - Average unit price: {}", format_currency(s.price.average))?;
                writeln!(
                    f,
                    "  - Price range: {} - {}",
                    format_currency(s.price.min),
                    format_currency(s.price.max)
                )?;
                writeln!(
                    f,
                    "  - Price standard deviation: {}",
                    format_currency(s.price.stddev)
                )?;
                writeln!(
                    f,
                    "  - Total inventory quantity: {}",
                    s.inventory
                        .total_quantity
                        .map(format_number)
                        .unwrap_or_else(|| "n/a".to_string())
                )?;
                writeln!(
                    f,
                    "  - Average quantity per item: {}",
                    s.inventory
                        .average_quantity
                        .map(|q| format!("{:.1}", q))
                        .unwrap_or_else(|| "n/a".to_string())
                )?;
                writeln!(f, "  - Items out of stock: {}", format_number(s.inventory.out_of_stock))?;
                writeln!(
                    f,
                    "  - Items below reorder level: {}",
                    format_number(s.inventory.below_reorder)
                )?;
                writeln!(f, "  - Top 5 stock group categories:")?;
                for group in &s.top_groups {
                    writeln!(
                        f,
                        "    * {}: {} items",
                        group.name.as_deref().unwrap_or("NULL"),
                        group.items
                    )?;
                }
                writeln!(f)?;

                writeln!(f, "🔍 DATA QUALITY METRICS:")?;
                let total = s.stock_items;
                let lines = [
                    ("Items with name", s.completeness.with_name),
                    ("Items with price", s.completeness.with_price),
                    ("Items with brand", s.completeness.with_brand),
                    ("Items with size", s.completeness.with_size),
                ];
                for (label, part) in lines {
                    writeln!(
                        f,
                        "  - {}: {} ({})",
                        label,
                        format_number(part),
                        format_percent(part, total)
                    )?;
                }
                writeln!(f)?;
                write!(f, "✅ Stock data extraction completed successfully!")
            }
        }
    }
}

/// Result of the best-effort reporter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub report: Option<SummaryReport>,
    pub warnings: Vec<String>,
}

fn count(warehouse: &Warehouse, table: &TableRef, condition: Option<&str>) -> WarehouseResult<i64> {
    let sql = match condition {
        Some(condition) => format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            table.qualified(),
            condition
        ),
        None => format!("SELECT COUNT(*) FROM {}", table.qualified()),
    };
    Ok(warehouse
        .connection()
        .query_row(&sql, [], |row| row.get::<_, i64>(0))?)
}

fn summarize_orders(warehouse: &Warehouse, namespace: &Namespace) -> WarehouseResult<OrdersSummary> {
    let orders = namespace.table("orders")?;
    let lines = namespace.table("order_lines")?;

    Ok(OrdersSummary {
        orders: count(warehouse, &orders, None)?,
        order_lines: count(warehouse, &lines, None)?,
        orders_with_customer: count(warehouse, &orders, Some("CustomerID IS NOT NULL"))?,
        orders_with_date: count(warehouse, &orders, Some("OrderDate IS NOT NULL"))?,
        lines_with_stock_item: count(warehouse, &lines, Some("StockItemID IS NOT NULL"))?,
        lines_with_positive_quantity: count(warehouse, &lines, Some("Quantity > 0"))?,
    })
}

fn summarize_stock(warehouse: &Warehouse, namespace: &Namespace) -> WarehouseResult<StockSummary> {
    let items = namespace.table("stock_items")?;
    let holdings = namespace.table("stock_item_holdings")?;
    let groups = namespace.table("stock_groups")?;
    let item_groups = namespace.table("stock_item_stock_groups")?;
    let conn = warehouse.connection();

    let price = conn.query_row(
        &format!(
            "SELECT CAST(AVG(UnitPrice) AS DOUBLE), CAST(MIN(UnitPrice) AS DOUBLE), \
             CAST(MAX(UnitPrice) AS DOUBLE), CAST(STDDEV_SAMP(UnitPrice) AS DOUBLE) \
             FROM {} WHERE UnitPrice > 0",
            items.qualified()
        ),
        [],
        |row| {
            Ok(PriceStats {
                average: row.get(0)?,
                min: row.get(1)?,
                max: row.get(2)?,
                stddev: row.get(3)?,
            })
        },
    )?;

    let inventory = conn.query_row(
        &format!(
            "SELECT CAST(SUM(QuantityOnHand) AS BIGINT), CAST(AVG(QuantityOnHand) AS DOUBLE), \
             COUNT(CASE WHEN QuantityOnHand = 0 THEN 1 END), \
             COUNT(CASE WHEN QuantityOnHand < ReorderLevel THEN 1 END) \
             FROM {}",
            holdings.qualified()
        ),
        [],
        |row| {
            Ok(InventoryStats {
                total_quantity: row.get(0)?,
                average_quantity: row.get(1)?,
                out_of_stock: row.get(2)?,
                below_reorder: row.get(3)?,
            })
        },
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT sg.StockGroupName, COUNT(DISTINCT sisg.StockItemID) AS item_count \
         FROM {} sg JOIN {} sisg ON sg.StockGroupID = sisg.StockGroupID \
         GROUP BY sg.StockGroupName \
         ORDER BY item_count DESC, sg.StockGroupName \
         LIMIT 5",
        groups.qualified(),
        item_groups.qualified()
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(GroupCount {
            name: row.get(0)?,
            items: row.get(1)?,
        })
    })?;
    let mut top_groups = Vec::new();
    for row in rows {
        top_groups.push(row?);
    }

    let completeness = conn.query_row(
        &format!(
            "SELECT COUNT(CASE WHEN StockItemName IS NOT NULL THEN 1 END), \
             COUNT(CASE WHEN UnitPrice > 0 THEN 1 END), \
             COUNT(CASE WHEN Brand IS NOT NULL THEN 1 END), \
             COUNT(CASE WHEN Size IS NOT NULL THEN 1 END) \
             FROM {}",
            items.qualified()
        ),
        [],
        |row| {
            Ok(Completeness {
                with_name: row.get(0)?,
                with_price: row.get(1)?,
                with_brand: row.get(2)?,
                with_size: row.get(3)?,
            })
        },
    )?;

    Ok(StockSummary {
        stock_items: count(warehouse, &items, None)?,
        stock_holdings: count(warehouse, &holdings, None)?,
        stock_groups: count(warehouse, &groups, None)?,
        stock_item_groups: count(warehouse, &item_groups, None)?,
        price,
        inventory,
        top_groups,
        completeness,
    })
}

/// Build the summary report for a flow
pub fn summarize(
    flow: Flow,
    warehouse: &Warehouse,
    namespace: &Namespace,
) -> WarehouseResult<SummaryReport> {
    let body = match flow {
        Flow::Orders => SummaryBody::Orders(summarize_orders(warehouse, namespace)?),
        Flow::Stock => SummaryBody::Stock(summarize_stock(warehouse, namespace)?),
    };
    Ok(SummaryReport {
        generated_at: Utc::now(),
        catalog: namespace.catalog().to_string(),
        schema: namespace.schema().to_string(),
        body,
    })
}

/// Run the reporter, turning any failure into a warning
pub fn run_reporter(flow: Flow, warehouse: &Warehouse, namespace: &Namespace) -> ReportOutcome {
    match summarize(flow, warehouse, namespace) {
        Ok(report) => {
            info!(flow = %flow, "Summary report generated");
            ReportOutcome {
                report: Some(report),
                warnings: Vec::new(),
            }
        }
        Err(e) => {
            error!("❌ Error generating summary report: {}", e);
            ReportOutcome {
                report: None,
                warnings: vec![format!("Error generating summary report: {}", e)],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(-12345), "-12,345");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(98, 100), "98.0%");
        assert_eq!(format_percent(1, 3), "33.3%");
        assert_eq!(format_percent(0, 0), "n/a");
    }

    #[test]
    fn test_orders_report_text() {
        let report = SummaryReport {
            generated_at: Utc::now(),
            catalog: "don_datalab_catalog".to_string(),
            schema: "bronze".to_string(),
            body: SummaryBody::Orders(OrdersSummary {
                orders: 1200,
                order_lines: 0,
                orders_with_customer: 1188,
                orders_with_date: 1200,
                lines_with_stock_item: 0,
                lines_with_positive_quantity: 0,
            }),
        };
        let text = report.to_string();
        assert!(text.starts_with("=== DATA EXTRACTION SUMMARY ==="));
        assert!(text.contains("Target catalog: don_datalab_catalog"));
        assert!(text.contains("  - Orders: 1,200"));
        assert!(text.contains("  - Orders with CustomerID: 1,188 (99.0%)"));
        assert!(text.contains("  - Order lines with StockItemID: 0 (n/a)"));
        assert!(text.ends_with("✅ Orders extraction completed successfully!"));
    }

    #[test]
    fn test_report_on_missing_tables_is_warning() {
        let warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = Namespace::new("empty_catalog", "bronze").unwrap();
        warehouse.ensure_namespace(&ns).unwrap();

        let outcome = run_reporter(Flow::Stock, &warehouse, &ns);
        assert!(outcome.report.is_none());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("Error generating summary report"));
    }
}
