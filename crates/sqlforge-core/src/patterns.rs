//! Reusable query templates and maintenance patterns.
//!
//! Templates are static SQL bodies with `{name}` placeholders. The pattern
//! generators build the usual chores directly: paging, table backups, data
//! moves, duplicate and completeness checks, and trend rollups. Generators
//! that emit a main statement plus a verification query separate the two
//! with a blank line.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::advanced::{required, required_list};
use crate::assemble::assemble;
use crate::error::RowIssue;
use crate::ident::Identifier;
use crate::security::is_safe_table_name;

type Result<T> = std::result::Result<T, RowIssue>;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Replaces each `{name}` in `template` with the value paired with `name`.
///
/// Substitution is a single pass, so a value that itself contains `{other}`
/// is inserted literally. Placeholders without a value are left in place.
/// When a name appears twice in `params`, the first value wins.
#[must_use]
pub fn render_template<K, V>(template: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            params
                .iter()
                .find(|(key, _)| key.as_ref() == &caps[1])
                .map_or_else(|| String::from(&caps[0]), |(_, value)| String::from(value.as_ref()))
        })
        .into_owned()
}

/// Groups templates the way they are browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    /// Plain `SELECT` shapes.
    BasicQuery,
    /// `INSERT`, `UPDATE`, and upserts.
    DataOperation,
    /// Ready-made `CREATE TABLE` layouts.
    TableStructure,
    /// Plans, index usage, and slow queries.
    Performance,
    /// Profiling and time series.
    DataAnalysis,
}

impl TemplateCategory {
    /// Every category, in browsing order.
    pub const ALL: [Self; 5] = [
        Self::BasicQuery,
        Self::DataOperation,
        Self::TableStructure,
        Self::Performance,
        Self::DataAnalysis,
    ];

    /// Returns the snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasicQuery => "basic_query",
            Self::DataOperation => "data_operation",
            Self::TableStructure => "table_structure",
            Self::Performance => "performance",
            Self::DataAnalysis => "data_analysis",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named SQL body with the placeholders it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTemplate {
    /// Lookup key, e.g. `join_query`.
    pub id: &'static str,
    /// Where the template is listed.
    pub category: TemplateCategory,
    /// One-line summary.
    pub description: &'static str,
    /// SQL text with `{name}` placeholders.
    pub body: &'static str,
    /// Every placeholder the body uses.
    pub parameters: &'static [&'static str],
}

impl SqlTemplate {
    /// Renders the body after checking that every declared parameter has a
    /// non-blank value.
    ///
    /// # Errors
    ///
    /// Returns [`RowIssue::MissingField`] naming the first parameter that is
    /// absent or blank.
    pub fn render<K, V>(&self, params: &[(K, V)]) -> Result<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for &name in self.parameters {
            let given = params
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .is_some_and(|(_, value)| !value.as_ref().trim().is_empty());
            if !given {
                return Err(RowIssue::MissingField(name));
            }
        }
        Ok(render_template(self.body, params))
    }
}

/// The built-in template catalog.
pub const TEMPLATES: &[SqlTemplate] = &[
    SqlTemplate {
        id: "simple_select",
        category: TemplateCategory::BasicQuery,
        description: "Filtered select from one table",
        body: "SELECT {columns}\nFROM {table}\nWHERE {condition};",
        parameters: &["columns", "table", "condition"],
    },
    SqlTemplate {
        id: "join_query",
        category: TemplateCategory::BasicQuery,
        description: "Two-table join on one key pair",
        body: "SELECT {select_columns}\n\
               FROM {main_table} a\n\
               {join_type} JOIN {join_table} b ON a.{join_key1} = b.{join_key2}\n\
               WHERE {condition};",
        parameters: &[
            "select_columns",
            "main_table",
            "join_type",
            "join_table",
            "join_key1",
            "join_key2",
            "condition",
        ],
    },
    SqlTemplate {
        id: "aggregate_query",
        category: TemplateCategory::BasicQuery,
        description: "Grouped aggregates with a HAVING filter",
        body: "SELECT {group_columns}, {aggregate_functions}\n\
               FROM {table}\n\
               WHERE {condition}\n\
               GROUP BY {group_columns}\n\
               HAVING {having_condition}\n\
               ORDER BY {order_columns};",
        parameters: &[
            "group_columns",
            "aggregate_functions",
            "table",
            "condition",
            "having_condition",
            "order_columns",
        ],
    },
    SqlTemplate {
        id: "batch_insert",
        category: TemplateCategory::DataOperation,
        description: "Multi-row insert",
        body: "INSERT INTO {table} ({columns})\nVALUES\n{values};",
        parameters: &["table", "columns", "values"],
    },
    SqlTemplate {
        id: "conditional_update",
        category: TemplateCategory::DataOperation,
        description: "Update rows matching a condition",
        body: "UPDATE {table}\nSET {set_clause}\nWHERE {condition};",
        parameters: &["table", "set_clause", "condition"],
    },
    SqlTemplate {
        id: "upsert",
        category: TemplateCategory::DataOperation,
        description: "Insert, or update on a duplicate key (MySQL)",
        body: "INSERT INTO {table} ({columns})\n\
               VALUES ({values})\n\
               ON DUPLICATE KEY UPDATE\n\
               {update_clause};",
        parameters: &["table", "columns", "values", "update_clause"],
    },
    SqlTemplate {
        id: "user_table",
        category: TemplateCategory::TableStructure,
        description: "User accounts with login and status columns",
        body: "CREATE TABLE {table_name} (\n    \
               id BIGINT PRIMARY KEY AUTO_INCREMENT,\n    \
               username VARCHAR(50) UNIQUE NOT NULL,\n    \
               email VARCHAR(100) UNIQUE NOT NULL,\n    \
               password_hash VARCHAR(255) NOT NULL,\n    \
               first_name VARCHAR(50),\n    \
               last_name VARCHAR(50),\n    \
               status VARCHAR(20) DEFAULT 'active',\n    \
               created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n    \
               updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
               );",
        parameters: &["table_name"],
    },
    SqlTemplate {
        id: "audit_table",
        category: TemplateCategory::TableStructure,
        description: "Change log with before and after images",
        body: "CREATE TABLE {table_name} (\n    \
               id BIGINT PRIMARY KEY AUTO_INCREMENT,\n    \
               table_name VARCHAR(100) NOT NULL,\n    \
               record_id BIGINT NOT NULL,\n    \
               operation VARCHAR(10) NOT NULL,\n    \
               old_values JSON,\n    \
               new_values JSON,\n    \
               user_id BIGINT,\n    \
               ip_address VARCHAR(45),\n    \
               created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
               );",
        parameters: &["table_name"],
    },
    SqlTemplate {
        id: "explain_query",
        category: TemplateCategory::Performance,
        description: "Execution plan as JSON (MySQL)",
        body: "EXPLAIN FORMAT=JSON\n{query};",
        parameters: &["query"],
    },
    SqlTemplate {
        id: "index_analysis",
        category: TemplateCategory::Performance,
        description: "Index definitions and statistics for one table (MySQL)",
        body: "SHOW INDEX FROM {table_name};\n\n\
               SELECT *\n\
               FROM INFORMATION_SCHEMA.STATISTICS\n\
               WHERE TABLE_SCHEMA = '{database_name}' AND TABLE_NAME = '{table_name}';",
        parameters: &["table_name", "database_name"],
    },
    SqlTemplate {
        id: "slow_query_analysis",
        category: TemplateCategory::Performance,
        description: "Enable the slow query log and list the slowest recent statements (MySQL)",
        body: "SET GLOBAL slow_query_log = 'ON';\n\
               SET GLOBAL long_query_time = {threshold_seconds};\n\n\
               SELECT\n    \
               query_time,\n    \
               lock_time,\n    \
               rows_sent,\n    \
               rows_examined,\n    \
               sql_text\n\
               FROM performance_schema.events_statements_history_long\n\
               WHERE start_time >= DATE_SUB(NOW(), INTERVAL 1 DAY)\n\
               ORDER BY query_time DESC\n\
               LIMIT 10;",
        parameters: &["threshold_seconds"],
    },
    SqlTemplate {
        id: "data_profiling",
        category: TemplateCategory::DataAnalysis,
        description: "Row, key, and null counts with the value range of one column",
        body: "SELECT\n    \
               COUNT(*) AS total_records,\n    \
               COUNT(DISTINCT {key_column}) AS unique_keys,\n    \
               COUNT({column}) AS non_null_count,\n    \
               COUNT(*) - COUNT({column}) AS null_count,\n    \
               MIN({column}) AS min_value,\n    \
               MAX({column}) AS max_value,\n    \
               AVG({column}) AS avg_value\n\
               FROM {table};",
        parameters: &["table", "key_column", "column"],
    },
    SqlTemplate {
        id: "time_series_analysis",
        category: TemplateCategory::DataAnalysis,
        description: "Daily count, sum, and average over a trailing window (MySQL)",
        body: "SELECT\n    \
               DATE({date_column}) AS day,\n    \
               COUNT(*) AS daily_count,\n    \
               SUM({value_column}) AS daily_sum,\n    \
               AVG({value_column}) AS daily_avg\n\
               FROM {table}\n\
               WHERE {date_column} >= DATE_SUB(NOW(), INTERVAL {days} DAY)\n\
               GROUP BY DATE({date_column})\n\
               ORDER BY day;",
        parameters: &["table", "date_column", "value_column", "days"],
    },
];

/// Looks a template up by id.
#[must_use]
pub fn find_template(id: &str) -> Option<&'static SqlTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Lists the templates of one category, in catalog order.
pub fn templates_in(category: TemplateCategory) -> impl Iterator<Item = &'static SqlTemplate> {
    TEMPLATES.iter().filter(move |t| t.category == category)
}

fn safe_table<'a>(table: &'a str, field: &'static str) -> Result<&'a str> {
    let table = required(table, field)?;
    if !is_safe_table_name(table) {
        return Err(RowIssue::UnsafeIdentifier(String::from(table)));
    }
    Ok(table)
}

/// Columns that end up inside string literals as well as in code must be
/// plain words.
fn plain_column(column: &str) -> Result<&str> {
    let plain = column
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Ok(column)
    } else {
        Err(RowIssue::UnsafeIdentifier(String::from(column)))
    }
}

fn plain_columns<'a, S: AsRef<str>>(columns: &'a [S], field: &'static str) -> Result<Vec<&'a str>> {
    required_list(columns, field)?
        .into_iter()
        .map(plain_column)
        .collect()
}

fn where_line(condition: Option<&str>) -> Option<String> {
    condition
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("WHERE {c}"))
}

/// One page of `table` ordered by `order_column`, followed by a total count
/// under the same filter. Pages are numbered from 1.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe, the order column is
/// blank, or the page size or number is zero.
pub fn pagination_query(
    table: &str,
    page_size: u32,
    page_number: u32,
    order_column: &str,
    where_clause: Option<&str>,
) -> Result<String> {
    let table = safe_table(table, "table")?;
    let order_column = required(order_column, "order_column")?;
    if page_size == 0 {
        return Err(RowIssue::InvalidValue {
            field: "page_size",
            message: String::from("must be at least 1"),
        });
    }
    if page_number == 0 {
        return Err(RowIssue::InvalidValue {
            field: "page_number",
            message: String::from("pages are numbered from 1"),
        });
    }
    let offset = u64::from(page_number - 1) * u64::from(page_size);
    let filter = where_line(where_clause);

    let page = assemble([
        Some(String::from("SELECT *")),
        Some(format!("FROM {table}")),
        filter.clone(),
        Some(format!("ORDER BY {order_column}")),
        Some(format!("LIMIT {page_size} OFFSET {offset};")),
    ]
    .into_iter()
    .flatten());
    let total = assemble([
        Some(String::from("SELECT COUNT(*) AS total_count")),
        Some(format!("FROM {table}")),
        filter,
    ]
    .into_iter()
    .flatten());
    Ok(format!("{page}\n\n{total};"))
}

/// Copies `source_table` into `{name}_backup_{suffix}` in the same schema and
/// compares the row counts.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe, or the suffix is blank
/// or contains anything but letters, digits, and underscores.
pub fn backup_table_query(source_table: &str, suffix: &str) -> Result<String> {
    let source_table = safe_table(source_table, "source_table")?;
    let suffix = required(suffix, "backup_suffix")?;
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RowIssue::InvalidValue {
            field: "backup_suffix",
            message: format!("`{suffix}` may only contain letters, digits, and underscores"),
        });
    }
    let source = Identifier::parse(source_table);
    let backup = Identifier::qualified(
        source.schema(),
        &format!("{}_backup_{suffix}", source.name()),
    );
    Ok(format!(
        "CREATE TABLE {backup} AS\n\
         SELECT * FROM {source};\n\n\
         SELECT\n    \
         (SELECT COUNT(*) FROM {source}) AS original_count,\n    \
         (SELECT COUNT(*) FROM {backup}) AS backup_count;"
    ))
}

/// `INSERT INTO target (...) SELECT ... FROM source`, then a count of both
/// sides. Each mapping pair is `(source column, target column)`; an empty
/// mapping copies every column positionally.
///
/// # Errors
///
/// Returns an error if either table is blank or unsafe, or a mapping pair
/// has a blank side.
pub fn data_migration_query<S, T>(
    source_table: &str,
    target_table: &str,
    column_mapping: &[(S, T)],
    where_clause: Option<&str>,
) -> Result<String>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let source = safe_table(source_table, "source_table")?;
    let target = safe_table(target_table, "target_table")?;

    let mut source_columns = vec![];
    let mut target_columns = vec![];
    for (from, to) in column_mapping {
        source_columns.push(required(from.as_ref(), "column_mapping")?);
        target_columns.push(required(to.as_ref(), "column_mapping")?);
    }
    let (insert, select) = if target_columns.is_empty() {
        (format!("INSERT INTO {target}"), String::from("SELECT *"))
    } else {
        (
            format!("INSERT INTO {target} ({})", target_columns.join(", ")),
            format!("SELECT {}", source_columns.join(", ")),
        )
    };
    let filter = where_line(where_clause);
    let source_filter = filter.as_deref().map(|w| format!(" {w}")).unwrap_or_default();

    let migrate = assemble(
        [Some(insert), Some(select), Some(format!("FROM {source}")), filter]
            .into_iter()
            .flatten(),
    );
    Ok(format!(
        "{migrate};\n\n\
         SELECT\n    \
         (SELECT COUNT(*) FROM {source}{source_filter}) AS source_count,\n    \
         (SELECT COUNT(*) FROM {target}) AS target_count;"
    ))
}

/// Counts duplicate value combinations of `columns`, then lists every row
/// that belongs to one.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe, there are no columns,
/// or a column is not a plain name.
pub fn duplicate_detection_query<S: AsRef<str>>(table: &str, columns: &[S]) -> Result<String> {
    let table = safe_table(table, "table")?;
    let columns = plain_columns(columns, "columns")?;
    let list = columns.join(", ");
    let join = columns
        .iter()
        .map(|c| format!("t1.{c} = t2.{c}"))
        .collect::<Vec<_>>()
        .join(" AND ");
    let order = columns
        .iter()
        .map(|c| format!("t1.{c}"))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "SELECT {list}, COUNT(*) AS duplicate_count\n\
         FROM {table}\n\
         GROUP BY {list}\n\
         HAVING COUNT(*) > 1\n\
         ORDER BY duplicate_count DESC;\n\n\
         SELECT t1.*\n\
         FROM {table} t1\n\
         INNER JOIN (\n    \
         SELECT {list}\n    \
         FROM {table}\n    \
         GROUP BY {list}\n    \
         HAVING COUNT(*) > 1\n\
         ) t2 ON {join}\n\
         ORDER BY {order};"
    ))
}

/// Completeness of each column: total, non-null, and null counts plus the
/// non-null share as a percentage, one `UNION ALL` branch per column.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe, there are no columns,
/// or a column is not a plain name.
pub fn data_quality_check<S: AsRef<str>>(table: &str, columns: &[S]) -> Result<String> {
    let table = safe_table(table, "table")?;
    let branches: Vec<String> = plain_columns(columns, "columns")?
        .into_iter()
        .map(|column| {
            format!(
                "SELECT\n    \
                 '{column}' AS column_name,\n    \
                 COUNT(*) AS total_count,\n    \
                 COUNT({column}) AS non_null_count,\n    \
                 COUNT(*) - COUNT({column}) AS null_count,\n    \
                 ROUND(COUNT({column}) * 100.0 / NULLIF(COUNT(*), 0), 2) AS completeness_percentage\n\
                 FROM {table}"
            )
        })
        .collect();
    Ok(format!("{};", branches.join("\nUNION ALL\n")))
}

/// Bucket width for [`trend_analysis_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendInterval {
    /// `TRUNC(col, 'DD')`
    Day,
    /// ISO week, `TRUNC(col, 'IW')`
    Week,
    /// `TRUNC(col, 'MM')`
    #[default]
    Month,
    /// `TRUNC(col, 'Q')`
    Quarter,
    /// `TRUNC(col, 'YYYY')`
    Year,
}

impl TrendInterval {
    /// Parses `day`, `week`, `month`, `quarter`, or `year`
    /// (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// The `TRUNC` format model for this bucket.
    #[must_use]
    pub const fn truncation_unit(self) -> &'static str {
        match self {
            Self::Day => "DD",
            Self::Week => "IW",
            Self::Month => "MM",
            Self::Quarter => "Q",
            Self::Year => "YYYY",
        }
    }
}

impl fmt::Display for TrendInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        })
    }
}

/// Count, average, extremes, and total of `metric_column` per time bucket,
/// optionally split by one more column.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe, or a column is blank
/// or not a plain name.
pub fn trend_analysis_query(
    table: &str,
    time_column: &str,
    metric_column: &str,
    group_by: Option<&str>,
    interval: TrendInterval,
) -> Result<String> {
    let table = safe_table(table, "table")?;
    let time_column = plain_column(required(time_column, "time_column")?)?;
    let metric = plain_column(required(metric_column, "metric_column")?)?;
    let group = group_by
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(plain_column)
        .transpose()?;

    let bucket = format!("TRUNC({time_column}, '{}')", interval.truncation_unit());
    let (select_group, group_tail) = match group {
        Some(g) => (format!("\n    {g},"), format!(", {g}")),
        None => (String::new(), String::new()),
    };
    Ok(format!(
        "SELECT\n    \
         {bucket} AS time_period,{select_group}\n    \
         COUNT(*) AS record_count,\n    \
         AVG({metric}) AS avg_value,\n    \
         MAX({metric}) AS max_value,\n    \
         MIN({metric}) AS min_value,\n    \
         SUM({metric}) AS total_value\n\
         FROM {table}\n\
         GROUP BY {bucket}{group_tail}\n\
         ORDER BY time_period{group_tail};"
    ))
}

/// Row count, column count, and on-disk size of a table, then the columns
/// covered by each of its indexes. Uses PostgreSQL catalogs.
///
/// # Errors
///
/// Returns an error if the table is blank or unsafe.
pub fn schema_analysis_query(table: &str) -> Result<String> {
    let table = Identifier::parse(safe_table(table, "table")?);
    let name = table.name();
    let schema_filter = table
        .schema()
        .map(|s| format!(" AND table_schema = '{s}'"))
        .unwrap_or_default();

    Ok(format!(
        "SELECT\n    \
         '{name}' AS table_name,\n    \
         COUNT(*) AS total_rows,\n    \
         (SELECT COUNT(*) FROM information_schema.columns \
         WHERE table_name = '{name}'{schema_filter}) AS column_count,\n    \
         pg_size_pretty(pg_total_relation_size('{table}'::regclass)) AS total_size\n\
         FROM {table};\n\n\
         SELECT\n    \
         i.relname AS index_name,\n    \
         a.attname AS column_name\n\
         FROM pg_class t\n\
         INNER JOIN pg_index ix ON t.oid = ix.indrelid\n\
         INNER JOIN pg_class i ON i.oid = ix.indexrelid\n\
         INNER JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)\n\
         WHERE t.relkind = 'r'\n    \
         AND t.relname = '{name}'\n\
         ORDER BY i.relname, a.attnum;"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_sql;

    #[test]
    fn test_render_template_single_pass() {
        let rendered = render_template(
            "SELECT {columns} FROM {table} WHERE {condition}",
            &[("table", "users"), ("columns", "{table}"), ("table", "ignored")],
        );
        assert_eq!(rendered, "SELECT {table} FROM users WHERE {condition}");
    }

    #[test]
    fn test_template_catalog() {
        let template = find_template("simple_select").unwrap();
        assert_eq!(template.category, TemplateCategory::BasicQuery);
        assert_eq!(
            template
                .render(&[("columns", "id, name"), ("table", "users"), ("condition", "id = 1")])
                .unwrap(),
            "SELECT id, name\nFROM users\nWHERE id = 1;"
        );
        assert_eq!(
            template.render(&[("columns", "id"), ("table", " ")]),
            Err(RowIssue::MissingField("table"))
        );
        assert!(find_template("missing").is_none());

        for template in TEMPLATES {
            for name in template.parameters {
                assert!(template.body.contains(&format!("{{{name}}}")), "{}: {name}", template.id);
            }
        }
        let ids: Vec<&str> = templates_in(TemplateCategory::DataOperation)
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["batch_insert", "conditional_update", "upsert"]);
    }

    #[test]
    fn test_pagination_query() {
        let sql = pagination_query("app.orders", 20, 3, "id", Some("status = 'open'")).unwrap();
        assert_eq!(
            sql,
            "SELECT *\nFROM app.orders\nWHERE status = 'open'\nORDER BY id\nLIMIT 20 OFFSET 40;\n\n\
             SELECT COUNT(*) AS total_count\nFROM app.orders\nWHERE status = 'open';"
        );
        assert!(validate_sql(&sql).is_valid);

        let unfiltered = pagination_query("t", 10, 1, "id", Some(" ")).unwrap();
        assert!(unfiltered.starts_with("SELECT *\nFROM t\nORDER BY id\nLIMIT 10 OFFSET 0;"));
        assert!(matches!(
            pagination_query("t", 0, 1, "id", None),
            Err(RowIssue::InvalidValue { field: "page_size", .. })
        ));
        assert!(matches!(
            pagination_query("t", 10, 0, "id", None),
            Err(RowIssue::InvalidValue { field: "page_number", .. })
        ));
    }

    #[test]
    fn test_backup_table_query() {
        assert_eq!(
            backup_table_query("sales.orders", "20240131").unwrap(),
            "CREATE TABLE sales.orders_backup_20240131 AS\n\
             SELECT * FROM sales.orders;\n\n\
             SELECT\n    \
             (SELECT COUNT(*) FROM sales.orders) AS original_count,\n    \
             (SELECT COUNT(*) FROM sales.orders_backup_20240131) AS backup_count;"
        );
        assert_eq!(
            backup_table_query("orders", ""),
            Err(RowIssue::MissingField("backup_suffix"))
        );
        assert!(matches!(
            backup_table_query("orders", "x; DROP"),
            Err(RowIssue::InvalidValue { field: "backup_suffix", .. })
        ));
    }

    #[test]
    fn test_data_migration_query() {
        let sql = data_migration_query(
            "stage.customers",
            "dw.customers",
            &[("cust_id", "id"), ("cust_name", "name")],
            Some("loaded = 1"),
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO dw.customers (id, name)\n\
             SELECT cust_id, cust_name\n\
             FROM stage.customers\n\
             WHERE loaded = 1;\n\n\
             SELECT\n    \
             (SELECT COUNT(*) FROM stage.customers WHERE loaded = 1) AS source_count,\n    \
             (SELECT COUNT(*) FROM dw.customers) AS target_count;"
        );

        let copy_all = data_migration_query::<&str, &str>("a", "b", &[], None).unwrap();
        assert!(copy_all.starts_with("INSERT INTO b\nSELECT *\nFROM a;"));
        assert_eq!(
            data_migration_query("a", "b", &[("x", " ")], None),
            Err(RowIssue::MissingField("column_mapping"))
        );
    }

    #[test]
    fn test_duplicate_detection_query() {
        let sql = duplicate_detection_query("users", &["email", "phone"]).unwrap();
        assert!(sql.starts_with(
            "SELECT email, phone, COUNT(*) AS duplicate_count\nFROM users\nGROUP BY email, phone\n"
        ));
        assert!(sql.contains(") t2 ON t1.email = t2.email AND t1.phone = t2.phone\n"));
        assert!(sql.ends_with("ORDER BY t1.email, t1.phone;"));
        assert!(validate_sql(&sql).is_valid);
        assert_eq!(
            duplicate_detection_query::<&str>("users", &[]),
            Err(RowIssue::MissingField("columns"))
        );
    }

    #[test]
    fn test_data_quality_check() {
        let sql = data_quality_check("users", &["email", "created_at"]).unwrap();
        assert_eq!(sql.matches("\nUNION ALL\n").count(), 1);
        assert!(sql.contains("'created_at' AS column_name"));
        assert!(sql.contains(
            "ROUND(COUNT(email) * 100.0 / NULLIF(COUNT(*), 0), 2) AS completeness_percentage"
        ));
        assert!(sql.ends_with("FROM users;"));
        assert_eq!(
            data_quality_check("users", &["it's"]),
            Err(RowIssue::UnsafeIdentifier(String::from("it's")))
        );
    }

    #[test]
    fn test_trend_analysis_query() {
        assert_eq!(
            trend_analysis_query("sales", "sold_at", "amount", Some("region"), TrendInterval::Week)
                .unwrap(),
            "SELECT\n    \
             TRUNC(sold_at, 'IW') AS time_period,\n    \
             region,\n    \
             COUNT(*) AS record_count,\n    \
             AVG(amount) AS avg_value,\n    \
             MAX(amount) AS max_value,\n    \
             MIN(amount) AS min_value,\n    \
             SUM(amount) AS total_value\n\
             FROM sales\n\
             GROUP BY TRUNC(sold_at, 'IW'), region\n\
             ORDER BY time_period, region;"
        );
        let monthly =
            trend_analysis_query("sales", "sold_at", "amount", None, TrendInterval::default())
                .unwrap();
        assert!(monthly.contains("GROUP BY TRUNC(sold_at, 'MM')\nORDER BY time_period;"));
        assert_eq!(TrendInterval::from_name("Quarter"), Some(TrendInterval::Quarter));
        assert_eq!(TrendInterval::from_name("hour"), None);
    }

    #[test]
    fn test_schema_analysis_query() {
        let sql = schema_analysis_query("sales.orders").unwrap();
        assert!(sql.contains("'orders' AS table_name"));
        assert!(sql.contains("WHERE table_name = 'orders' AND table_schema = 'sales') AS column_count"));
        assert!(sql.contains("pg_total_relation_size('sales.orders'::regclass)"));
        assert!(sql.contains("AND t.relname = 'orders'\n"));
        assert!(matches!(
            schema_analysis_query("orders; DROP TABLE x"),
            Err(RowIssue::UnsafeIdentifier(_))
        ));
    }
}
