//! System prompt templates for SQL generation.

use super::enhancer::enhance_schema;
use crate::models::DatabaseSchema;

/// The single-line JSON contract shared by both templates.
const OUTPUT_CONTRACT: &str = r#"Include column name headers in the query results.
Always provide your answer in the following JSON format:
{ "summary": "your-summary", "query": "your-query" }

Output the JSON on a single line only. Do not use line breaks.
In the JSON response above, replace "your-query" with the database query that retrieves the requested data.
In the JSON response above, replace "your-summary" with a detailed paragraph explaining each step taken to build this query."#;

/// Builds the schema-enhanced prompt: DDL, narrative, numbered guidelines,
/// row limit and output contract.
pub fn build_enhanced_prompt(schema: &DatabaseSchema, dialect: &str, max_rows: u32) -> String {
    format!(
        r#"
You are an expert {dialect} database engineer and SQL specialist. Generate a precise, efficient SQL query from the user's natural-language request. Do not reply with anything unrelated to the database or the query.

## Database schema definition:
```sql
{ddl}
```

## Enhanced database understanding:
{narrative}

## Query generation guidelines:
1. Analyse the request carefully and make sure you understand which data is wanted
2. Choose the right tables and columns, taking the relationships described above into account
3. Use the correct JOIN type (INNER, LEFT, RIGHT) to connect related tables
4. Add WHERE clauses that match exactly the data requested
5. Handle NULL values and edge cases correctly
6. Sort the results with an appropriate ORDER BY clause
7. Limit results to {max_rows} rows with the {dialect} row-limiting clause
8. Use only {dialect} SQL syntax

{contract}
"#,
        dialect = dialect,
        ddl = schema.ddl_block(),
        narrative = enhance_schema(schema, dialect),
        max_rows = max_rows,
        contract = OUTPUT_CONTRACT,
    )
}

/// Builds the basic prompt: DDL, terse instructions, row limit and output
/// contract.
pub fn build_basic_prompt(schema: &DatabaseSchema, dialect: &str, max_rows: u32) -> String {
    format!(
        r#"
You are a helpful, friendly database assistant. Do not reply with anything unrelated to the database or the query. Use the following database schema to create your answer:

```sql
{ddl}
```

{contract}
Use only {dialect} syntax for database queries.
Limit results to {max_rows} rows.
Always include all table columns and details.
"#,
        ddl = schema.ddl_block(),
        contract = OUTPUT_CONTRACT,
        dialect = dialect,
        max_rows = max_rows,
    )
}

/// Selects the template by `enhanced`.
pub fn build_system_prompt(
    schema: &DatabaseSchema,
    dialect: &str,
    max_rows: u32,
    enhanced: bool,
) -> String {
    if enhanced {
        build_enhanced_prompt(schema, dialect, max_rows)
    } else {
        build_basic_prompt(schema, dialect, max_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::helpers::assemble_schema;
    use crate::models::{ColumnDescriptor, TableSchema};

    fn schema() -> DatabaseSchema {
        assemble_schema(
            "crm",
            vec![TableSchema::new(
                "contacts",
                vec![
                    ColumnDescriptor::new("id", "integer").primary_key(),
                    ColumnDescriptor::new("email", "varchar(255)"),
                ],
            )],
        )
    }

    #[test]
    fn test_both_templates_share_contract() {
        let schema = schema();
        for enhanced in [true, false] {
            let prompt = build_system_prompt(&schema, "PostgreSQL", 42, enhanced);
            assert!(prompt.contains(&format!("```sql\n{}\n```", schema.ddl_block())));
            assert!(prompt.contains("Limit results to 42 rows"));
            assert!(prompt.contains(r#"{ "summary": "your-summary", "query": "your-query" }"#));
            assert!(prompt.contains("single line"));
            assert!(prompt.contains("Use only PostgreSQL"));
            assert!(prompt.contains("unrelated to the database"));
        }
    }

    #[test]
    fn test_only_enhanced_embeds_narrative() {
        let schema = schema();
        let enhanced = build_enhanced_prompt(&schema, "MySQL", 100);
        let basic = build_basic_prompt(&schema, "MySQL", 100);

        assert!(enhanced.contains("Database 'crm' contains 1 tables."));
        assert!(enhanced.contains("## MySQL-specific advice:"));
        assert!(enhanced.contains("8. Use only MySQL SQL syntax"));
        assert!(!basic.contains("Enhanced database understanding"));
        assert!(!basic.contains("Database 'crm' contains"));
    }

    #[test]
    fn test_row_limit_wording_fits_every_dialect() {
        let schema = schema();
        for enhanced in [true, false] {
            let prompt = build_system_prompt(&schema, "SQL Server", 25, enhanced);
            assert!(prompt.contains("Limit results to 25 rows"));
            assert!(!prompt.contains("LIMIT 25"));
            assert!(!prompt.contains("Use LIMIT"));
        }
    }

    #[test]
    fn test_templates_are_deterministic() {
        let schema = schema();
        assert_eq!(
            build_enhanced_prompt(&schema, "SQL Server", 10),
            build_enhanced_prompt(&schema, "SQL Server", 10)
        );
    }
}
