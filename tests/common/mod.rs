//! Fixture builders shared by the integration tests
#![allow(dead_code)]

use bronze_ingest::config::{ExtractParams, Secret};
use bronze_ingest::flow::{Flow, FlowConfig, FlowExecutor, FlowReport, FlowResult};
use bronze_ingest::source::{
    Column, ColumnType, ConnectionDescriptor, Decimal, MemorySource, RecordSet, Value,
};
use bronze_ingest::warehouse::Warehouse;
use chrono::{NaiveDate, NaiveDateTime};

pub const CATALOG: &str = "test_catalog";
pub const SCHEMA: &str = "bronze";

pub fn params() -> ExtractParams {
    ExtractParams::default()
        .with_catalog(CATALOG)
        .with_schema(SCHEMA)
        .with_host("sql.test.internal")
        .with_credentials("loader", Secret::new("hunter2"))
}

pub fn config() -> FlowConfig {
    FlowConfig::new(params())
}

/// Run a flow against an in-memory source
pub async fn run_with(
    flow: Flow,
    config: FlowConfig,
    source: MemorySource,
    warehouse: &mut Warehouse,
) -> FlowResult<FlowReport> {
    let descriptor = ConnectionDescriptor::from_params(&config.params);
    let mut executor = FlowExecutor::new(flow, config, descriptor, source, warehouse)?;
    executor.run().await
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn timestamp(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(11, 30, 0).expect("valid time")
}

fn money(cents: i128) -> Value {
    Value::Decimal(Decimal::new(cents, 2))
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn records(columns: &[(&str, ColumnType)], rows: Vec<Vec<Value>>) -> RecordSet {
    let mut records = RecordSet::new(
        columns
            .iter()
            .map(|(name, column_type)| Column::new(*name, *column_type))
            .collect(),
    );
    for row in rows {
        records.push_row(row);
    }
    records
}

/// `count` orders; the first `null_customers` have no CustomerID
pub fn orders(count: i64, null_customers: i64) -> RecordSet {
    let columns = [
        ("OrderID", ColumnType::Integer),
        ("CustomerID", ColumnType::Integer),
        ("SalespersonPersonID", ColumnType::Integer),
        ("PickedByPersonID", ColumnType::Integer),
        ("ContactPersonID", ColumnType::Integer),
        ("BackorderOrderID", ColumnType::Integer),
        ("OrderDate", ColumnType::Date),
        ("ExpectedDeliveryDate", ColumnType::Date),
        ("CustomerPurchaseOrderNumber", ColumnType::Text),
        ("IsUndersupplyBackordered", ColumnType::Boolean),
        ("Comments", ColumnType::Text),
        ("DeliveryInstructions", ColumnType::Text),
        ("InternalComments", ColumnType::Text),
        ("PickingCompletedWhen", ColumnType::Timestamp),
        ("LastEditedBy", ColumnType::Integer),
        ("LastEditedWhen", ColumnType::Timestamp),
    ];
    let rows = (1..=count)
        .map(|id| {
            let day = (id % 28 + 1) as u32;
            vec![
                Value::Int(id),
                if id <= null_customers {
                    Value::Null
                } else {
                    Value::Int(800 + id % 60)
                },
                Value::Int(2 + id % 10),
                Value::Null,
                Value::Int(1000 + id),
                Value::Null,
                // Dates deliberately out of id order
                Value::Date(date(2013, (id % 12 + 1) as u32, day)),
                Value::Date(date(2014, 1, day)),
                text(&format!("PO{:05}", id)),
                Value::Bool(id % 3 == 0),
                Value::Null,
                Value::Null,
                Value::Null,
                Value::Timestamp(timestamp(2013, 6, day)),
                Value::Int(7),
                Value::Timestamp(timestamp(2013, 6, day)),
            ]
        })
        .collect();
    records(&columns, rows)
}

/// Three lines per order
pub fn order_lines(orders: i64) -> RecordSet {
    let columns = [
        ("OrderLineID", ColumnType::Integer),
        ("OrderID", ColumnType::Integer),
        ("StockItemID", ColumnType::Integer),
        ("Description", ColumnType::Text),
        ("PackageTypeID", ColumnType::Integer),
        ("Quantity", ColumnType::Integer),
        ("UnitPrice", ColumnType::Decimal { scale: 2 }),
        ("TaxRate", ColumnType::Decimal { scale: 3 }),
        ("PickedQuantity", ColumnType::Integer),
        ("PickingCompletedWhen", ColumnType::Timestamp),
        ("LastEditedBy", ColumnType::Integer),
        ("LastEditedWhen", ColumnType::Timestamp),
    ];
    let mut rows = Vec::new();
    for order in 1..=orders {
        for line in 0..3 {
            let id = order * 3 + line;
            rows.push(vec![
                Value::Int(id),
                Value::Int(order),
                Value::Int(1 + id % 20),
                text(&format!("Item {}", id % 20)),
                Value::Int(7),
                Value::Int(1 + line),
                money(1300 + (id % 7) as i128 * 100),
                Value::Decimal(Decimal::new(15000, 3)),
                Value::Int(1 + line),
                Value::Null,
                Value::Int(4),
                Value::Timestamp(timestamp(2013, 1, 2)),
            ]);
        }
    }
    records(&columns, rows)
}

/// Stock items with ids `1..=count`
pub fn stock_items(count: i64) -> RecordSet {
    let columns = [
        ("StockItemID", ColumnType::Integer),
        ("StockItemName", ColumnType::Text),
        ("SupplierID", ColumnType::Integer),
        ("ColorID", ColumnType::Integer),
        ("UnitPackageID", ColumnType::Integer),
        ("OuterPackageID", ColumnType::Integer),
        ("Brand", ColumnType::Text),
        ("Size", ColumnType::Text),
        ("LeadTimeDays", ColumnType::Integer),
        ("QuantityPerOuter", ColumnType::Integer),
        ("IsChillerStock", ColumnType::Boolean),
        ("Barcode", ColumnType::Text),
        ("TaxRate", ColumnType::Decimal { scale: 3 }),
        ("UnitPrice", ColumnType::Decimal { scale: 2 }),
        ("RecommendedRetailPrice", ColumnType::Decimal { scale: 2 }),
        ("TypicalWeightPerUnit", ColumnType::Decimal { scale: 3 }),
        ("MarketingComments", ColumnType::Text),
        ("InternalComments", ColumnType::Text),
        ("Photo", ColumnType::Binary),
        ("CustomFields", ColumnType::Text),
        ("Tags", ColumnType::Text),
        ("SearchDetails", ColumnType::Text),
        ("LastEditedBy", ColumnType::Integer),
        ("ValidFrom", ColumnType::Timestamp),
        ("ValidTo", ColumnType::Timestamp),
    ];
    let rows = (1..=count)
        .map(|id| {
            vec![
                Value::Int(id),
                text(&format!("Stock item {}", id)),
                Value::Int(1 + id % 4),
                Value::Null,
                Value::Int(7),
                Value::Int(7),
                if id % 2 == 0 { text("Northwind") } else { Value::Null },
                if id % 3 == 0 { text("L") } else { Value::Null },
                Value::Int(14),
                Value::Int(10),
                Value::Bool(id % 5 == 0),
                Value::Null,
                Value::Decimal(Decimal::new(15000, 3)),
                money(1000 * id as i128),
                money(1500 * id as i128),
                Value::Decimal(Decimal::new(250, 3)),
                Value::Null,
                Value::Null,
                Value::Null,
                text("{ \"CountryOfManufacture\": \"China\" }"),
                text("[]"),
                text(&format!("Stock item {}", id)),
                Value::Int(1),
                Value::Timestamp(timestamp(2016, 5, 31)),
                Value::Timestamp(timestamp(9999, 12, 31)),
            ]
        })
        .collect();
    records(&columns, rows)
}

/// Holdings from `(quantity_on_hand, last_cost_price_cents, reorder_level)`
pub fn stock_item_holdings(holdings: &[(i64, i128, i64)]) -> RecordSet {
    let columns = [
        ("StockItemID", ColumnType::Integer),
        ("QuantityOnHand", ColumnType::Integer),
        ("BinLocation", ColumnType::Text),
        ("LastStocktakeQuantity", ColumnType::Integer),
        ("LastCostPrice", ColumnType::Decimal { scale: 2 }),
        ("ReorderLevel", ColumnType::Integer),
        ("TargetStockLevel", ColumnType::Integer),
        ("LastEditedBy", ColumnType::Integer),
        ("LastEditedWhen", ColumnType::Timestamp),
    ];
    let rows = holdings
        .iter()
        .enumerate()
        .map(|(i, &(quantity, cost, reorder))| {
            vec![
                Value::Int(i as i64 + 1),
                Value::Int(quantity),
                text(&format!("L-{}", i)),
                Value::Int(quantity),
                money(cost),
                Value::Int(reorder),
                Value::Int(reorder * 2),
                Value::Int(1),
                Value::Timestamp(timestamp(2016, 5, 31)),
            ]
        })
        .collect();
    records(&columns, rows)
}

pub fn stock_groups() -> RecordSet {
    let columns = [
        ("StockGroupID", ColumnType::Integer),
        ("StockGroupName", ColumnType::Text),
        ("LastEditedBy", ColumnType::Integer),
        ("ValidFrom", ColumnType::Timestamp),
        ("ValidTo", ColumnType::Timestamp),
    ];
    let rows = ["Novelty Items", "Clothing", "Mugs", "T-Shirts"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            vec![
                Value::Int(i as i64 + 1),
                text(name),
                Value::Int(1),
                Value::Timestamp(timestamp(2013, 1, 1)),
                Value::Timestamp(timestamp(9999, 12, 31)),
            ]
        })
        .collect();
    records(&columns, rows)
}

/// Assignments from `(stock_item_id, stock_group_id)`
pub fn stock_item_stock_groups(assignments: &[(i64, i64)]) -> RecordSet {
    let columns = [
        ("StockItemStockGroupID", ColumnType::Integer),
        ("StockItemID", ColumnType::Integer),
        ("StockGroupID", ColumnType::Integer),
        ("LastEditedBy", ColumnType::Integer),
        ("LastEditedWhen", ColumnType::Timestamp),
    ];
    let rows = assignments
        .iter()
        .enumerate()
        .map(|(i, &(item, group))| {
            vec![
                Value::Int(i as i64 + 1),
                Value::Int(item),
                Value::Int(group),
                Value::Int(1),
                Value::Timestamp(timestamp(2013, 1, 1)),
            ]
        })
        .collect();
    records(&columns, rows)
}

/// Holdings used by the inventory tests
pub const HOLDINGS: [(i64, i128, i64); 5] = [
    (10, 150, 20),
    (0, 200, 5),
    (25, 1025, 10),
    (-3, 400, 0),
    (7, 99, 7),
];

/// Orders domain source
pub fn orders_source(count: i64, null_customers: i64) -> MemorySource {
    MemorySource::new()
        .with_table("Sales.Orders", orders(count, null_customers))
        .with_table("Sales.OrderLines", order_lines(count))
}

/// Stock domain source with `items` stock items
pub fn stock_source(items: i64) -> MemorySource {
    MemorySource::new()
        .with_table("Warehouse.StockItems", stock_items(items))
        .with_table("Warehouse.StockItemHoldings", stock_item_holdings(&HOLDINGS))
        .with_table("Warehouse.StockGroups", stock_groups())
        .with_table(
            "Warehouse.StockItemStockGroups",
            stock_item_stock_groups(&[(1, 1), (2, 1), (3, 1), (2, 2), (3, 2), (4, 3)]),
        )
}
