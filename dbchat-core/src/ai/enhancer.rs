//! Schema narrative for the enhanced prompt.
//!
//! Restates the introspected schema in prose, adds foreign-key guesses from
//! naming conventions and appends dialect advice. Relationship lines are a
//! textual heuristic; they are not checked against real constraints.

use crate::models::{DatabaseSchema, TableSchema};
use inflector::Inflector;
use std::collections::BTreeSet;

const MYSQL_ADVICE: &[&str] = &[
    "Consider index efficiency when writing JOINs",
    "Use LIMIT and pagination for large result sets",
    "Use temporary tables or subqueries for complex queries",
];

const POSTGRES_ADVICE: &[&str] = &[
    "Use WITH clauses (CTEs) to simplify complex queries",
    "Consider JSONB operators for semi-structured data",
    "Window functions are available for advanced analysis",
];

const SQL_SERVER_ADVICE: &[&str] = &[
    "Use TOP instead of LIMIT",
    "Use CTEs to keep complex queries readable",
    "Pick the JOIN type that fits the data to keep plans efficient",
];

const BEST_PRACTICES: &[&str] = &[
    "Qualify columns with their table name (table.column) to avoid ambiguity",
    "Add WHERE conditions that narrow the result set",
    "Use the appropriate join type (INNER JOIN, LEFT JOIN, ...)",
    "Consider ordering and grouping of the results",
    "Avoid SELECT *; name the columns you need",
];

/// Advisory bullets for a dialect name; unknown dialects get none.
pub fn dialect_advice(dialect: &str) -> &'static [&'static str] {
    match dialect {
        "MySQL" => MYSQL_ADVICE,
        "PostgreSQL" => POSTGRES_ADVICE,
        "SQL Server" => SQL_SERVER_ADVICE,
        _ => &[],
    }
}

/// Renders the schema narrative used by the enhanced prompt.
///
/// Sections, in order: table count, per-table structure, probable
/// relationships, dialect advice (omitted for unknown dialects) and general
/// SQL best practices.
///
/// # Example
/// ```rust
/// use dbchat_core::adapters::helpers::assemble_schema;
/// use dbchat_core::ai::enhancer::enhance_schema;
/// use dbchat_core::models::{ColumnDescriptor, TableSchema};
///
/// let schema = assemble_schema(
///     "shop",
///     vec![
///         TableSchema::new("customers", vec![ColumnDescriptor::new("id", "int").primary_key()]),
///         TableSchema::new(
///             "orders",
///             vec![
///                 ColumnDescriptor::new("id", "int").primary_key(),
///                 ColumnDescriptor::new("customer_id", "int"),
///             ],
///         ),
///     ],
/// );
/// let narrative = enhance_schema(&schema, "MySQL");
/// assert!(narrative.starts_with("Database 'shop' contains 2 tables."));
/// assert!(narrative.contains("orders.customer_id probably references customers"));
/// ```
pub fn enhance_schema(schema: &DatabaseSchema, dialect: &str) -> String {
    let mut lines = vec![format!(
        "Database '{}' contains {} tables.",
        schema.name,
        schema.table_count()
    )];

    lines.push("\n## Table structure:".to_string());
    for table in &schema.tables {
        describe_table(table, &mut lines);
    }

    lines.push("\n## Possible table relationships:".to_string());
    let relationships = detect_relationships(&schema.tables);
    if relationships.is_empty() {
        lines.push("- No obvious relationships detected".to_string());
    } else {
        lines.extend(relationships.into_iter().map(|r| format!("- {}", r)));
    }

    let advice = dialect_advice(dialect);
    if !advice.is_empty() {
        lines.push(format!("\n## {}-specific advice:", dialect));
        lines.extend(advice.iter().map(|a| format!("- {}", a)));
    }

    lines.push("\n## SQL best practices:".to_string());
    lines.extend(BEST_PRACTICES.iter().map(|p| format!("- {}", p)));

    let narrative = lines.join("\n");
    tracing::debug!(
        "Enhanced schema '{}' into {} characters",
        schema.name,
        narrative.len()
    );
    narrative
}

fn describe_table(table: &TableSchema, lines: &mut Vec<String>) {
    lines.push(format!("\n### Table: {}", table.name));

    let primary_keys: Vec<&str> = table
        .primary_key_columns()
        .map(|c| c.name.as_str())
        .collect();
    if !primary_keys.is_empty() {
        lines.push(format!("Primary key: {}", primary_keys.join(", ")));
    }

    lines.push("Columns:".to_string());
    for column in &table.columns {
        let nullability = if column.nullable { "NULL" } else { "NOT NULL" };
        let key = if column.is_primary_key {
            ", PRIMARY KEY"
        } else {
            ""
        };
        lines.push(format!(
            "- {}: {}, {}{}",
            column.name, column.data_type, nullability, key
        ));
    }
}

/// Guesses foreign-key style relationships from names alone.
///
/// For every column of one table against every other table, a column is
/// reported when it is named `<table>_id` (plural or singular table name),
/// when it matches a primary-key column name of the other table, or when it
/// contains the other table's name without ending in `_id`. Results are
/// de-duplicated and sorted.
pub fn detect_relationships(tables: &[TableSchema]) -> BTreeSet<String> {
    let mut relationships = BTreeSet::new();

    for source in tables {
        for target in tables {
            if source.name == target.name {
                continue;
            }

            let target_lower = target.name.to_lowercase();
            let foreign_key_names = [
                format!("{}_id", target_lower),
                format!("{}_id", target_lower.to_singular()),
            ];

            for column in &source.columns {
                let column_lower = column.name.to_lowercase();

                if foreign_key_names.contains(&column_lower) {
                    relationships.insert(format!(
                        "{}.{} probably references {} via its primary key",
                        source.name, column.name, target.name
                    ));
                }

                for key in target.primary_key_columns() {
                    if column_lower == key.name.to_lowercase() {
                        relationships.insert(format!(
                            "{}.{} probably references {}.{}",
                            source.name, column.name, target.name, key.name
                        ));
                    }
                }

                if column_lower.contains(&target_lower) && !column_lower.ends_with("_id") {
                    relationships.insert(format!(
                        "{}.{} may be associated with {}",
                        source.name, column.name, target.name
                    ));
                }
            }
        }
    }

    relationships
}
