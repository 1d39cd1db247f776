//! The six WideWorldImporters tables and what is checked on each

use super::quality::{Predicate, QualityCheck, Severity};
use super::stats::{Aggregate, Rendering, Statistic};

/// Everything needed to extract one source table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Label used in log lines (e.g. `OrderLines`)
    pub entity: &'static str,
    /// Schema-qualified source table
    pub source_table: &'static str,
    /// Projected columns, in order
    pub columns: &'static [&'static str],
    /// Destination table name
    pub table_name: &'static str,
    /// Column rows are ordered by on insert
    pub cluster_by: Option<&'static str>,
    pub checks: &'static [QualityCheck],
    pub statistics: &'static [Statistic],
}

impl TableSpec {
    /// Fixed projection query run against the source
    pub fn query(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            self.columns.join(", "),
            self.source_table
        )
    }
}

pub const ORDERS: TableSpec = TableSpec {
    entity: "Orders",
    source_table: "Sales.Orders",
    columns: &[
        "OrderID",
        "CustomerID",
        "SalespersonPersonID",
        "PickedByPersonID",
        "ContactPersonID",
        "BackorderOrderID",
        "OrderDate",
        "ExpectedDeliveryDate",
        "CustomerPurchaseOrderNumber",
        "IsUndersupplyBackordered",
        "Comments",
        "DeliveryInstructions",
        "InternalComments",
        "PickingCompletedWhen",
        "LastEditedBy",
        "LastEditedWhen",
    ],
    table_name: "orders",
    cluster_by: Some("OrderDate"),
    // Only the key is checked here; CustomerID completeness shows up in
    // the summary report instead.
    checks: &[QualityCheck {
        label: "null OrderID",
        predicate: Predicate::IsNull("OrderID"),
        severity: Severity::Warning,
    }],
    statistics: &[],
};

pub const ORDER_LINES: TableSpec = TableSpec {
    entity: "OrderLines",
    source_table: "Sales.OrderLines",
    columns: &[
        "OrderLineID",
        "OrderID",
        "StockItemID",
        "Description",
        "PackageTypeID",
        "Quantity",
        "UnitPrice",
        "TaxRate",
        "PickedQuantity",
        "PickingCompletedWhen",
        "LastEditedBy",
        "LastEditedWhen",
    ],
    table_name: "order_lines",
    cluster_by: None,
    checks: &[
        QualityCheck {
            label: "null OrderLineID",
            predicate: Predicate::IsNull("OrderLineID"),
            severity: Severity::Warning,
        },
        QualityCheck {
            label: "null OrderID",
            predicate: Predicate::IsNull("OrderID"),
            severity: Severity::Warning,
        },
    ],
    statistics: &[
        Statistic {
            label: "Total quantity across all order lines",
            aggregate: Aggregate::Sum("Quantity"),
            rendering: Rendering::Integer,
        },
        Statistic {
            label: "Average unit price",
            aggregate: Aggregate::Average("UnitPrice"),
            rendering: Rendering::Currency,
        },
    ],
};

pub const STOCK_ITEMS: TableSpec = TableSpec {
    entity: "StockItems",
    source_table: "Warehouse.StockItems",
    columns: &[
        "StockItemID",
        "StockItemName",
        "SupplierID",
        "ColorID",
        "UnitPackageID",
        "OuterPackageID",
        "Brand",
        "Size",
        "LeadTimeDays",
        "QuantityPerOuter",
        "IsChillerStock",
        "Barcode",
        "TaxRate",
        "UnitPrice",
        "RecommendedRetailPrice",
        "TypicalWeightPerUnit",
        "MarketingComments",
        "InternalComments",
        "Photo",
        "CustomFields",
        "Tags",
        "SearchDetails",
        "LastEditedBy",
        "ValidFrom",
        "ValidTo",
    ],
    table_name: "stock_items",
    cluster_by: None,
    checks: &[
        QualityCheck {
            label: "null StockItemID",
            predicate: Predicate::IsNull("StockItemID"),
            severity: Severity::Warning,
        },
        QualityCheck {
            label: "null StockItemName",
            predicate: Predicate::IsNull("StockItemName"),
            severity: Severity::Warning,
        },
        QualityCheck {
            label: "zero or negative UnitPrice",
            predicate: Predicate::AtMostZero("UnitPrice"),
            severity: Severity::Notice,
        },
    ],
    statistics: &[
        Statistic {
            label: "Average unit price",
            aggregate: Aggregate::Average("UnitPrice"),
            rendering: Rendering::Currency,
        },
        Statistic {
            label: "Maximum unit price",
            aggregate: Aggregate::Max("UnitPrice"),
            rendering: Rendering::Currency,
        },
        Statistic {
            label: "Chiller stock items",
            aggregate: Aggregate::CountTrue("IsChillerStock"),
            rendering: Rendering::Count,
        },
    ],
};

pub const STOCK_ITEM_HOLDINGS: TableSpec = TableSpec {
    entity: "StockItemHoldings",
    source_table: "Warehouse.StockItemHoldings",
    columns: &[
        "StockItemID",
        "QuantityOnHand",
        "BinLocation",
        "LastStocktakeQuantity",
        "LastCostPrice",
        "ReorderLevel",
        "TargetStockLevel",
        "LastEditedBy",
        "LastEditedWhen",
    ],
    table_name: "stock_item_holdings",
    cluster_by: None,
    checks: &[
        QualityCheck {
            label: "Items with negative stock",
            predicate: Predicate::BelowZero("QuantityOnHand"),
            severity: Severity::Metric,
        },
        QualityCheck {
            label: "Items with zero stock",
            predicate: Predicate::EqualsZero("QuantityOnHand"),
            severity: Severity::Metric,
        },
        QualityCheck {
            label: "Items below reorder level",
            predicate: Predicate::BelowColumn("QuantityOnHand", "ReorderLevel"),
            severity: Severity::Metric,
        },
    ],
    statistics: &[Statistic {
        label: "Total inventory value",
        aggregate: Aggregate::SumOfProducts("QuantityOnHand", "LastCostPrice"),
        rendering: Rendering::Currency,
    }],
};

pub const STOCK_GROUPS: TableSpec = TableSpec {
    entity: "StockGroups",
    source_table: "Warehouse.StockGroups",
    columns: &[
        "StockGroupID",
        "StockGroupName",
        "LastEditedBy",
        "ValidFrom",
        "ValidTo",
    ],
    table_name: "stock_groups",
    cluster_by: None,
    checks: &[],
    statistics: &[Statistic {
        label: "Stock Groups found",
        aggregate: Aggregate::DistinctValues("StockGroupName"),
        rendering: Rendering::List,
    }],
};

pub const STOCK_ITEM_STOCK_GROUPS: TableSpec = TableSpec {
    entity: "StockItemStockGroups",
    source_table: "Warehouse.StockItemStockGroups",
    columns: &[
        "StockItemStockGroupID",
        "StockItemID",
        "StockGroupID",
        "LastEditedBy",
        "LastEditedWhen",
    ],
    table_name: "stock_item_stock_groups",
    cluster_by: None,
    checks: &[],
    statistics: &[
        Statistic {
            label: "Stock items with group assignments",
            aggregate: Aggregate::DistinctCount("StockItemID"),
            rendering: Rendering::Count,
        },
        Statistic {
            label: "Stock groups with item assignments",
            aggregate: Aggregate::DistinctCount("StockGroupID"),
            rendering: Rendering::Count,
        },
    ],
};

/// Every table, orders domain first
pub const ALL_TABLES: [&TableSpec; 6] = [
    &ORDERS,
    &ORDER_LINES,
    &STOCK_ITEMS,
    &STOCK_ITEM_HOLDINGS,
    &STOCK_GROUPS,
    &STOCK_ITEM_STOCK_GROUPS,
];

/// Look up a table by destination name
pub fn table_spec(table_name: &str) -> Option<&'static TableSpec> {
    ALL_TABLES
        .iter()
        .copied()
        .find(|spec| spec.table_name.eq_ignore_ascii_case(table_name))
}
