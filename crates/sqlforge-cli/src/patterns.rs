//! `sqlforge template` and `sqlforge pattern`: the template catalog and the
//! maintenance query generators.

use anyhow::{anyhow, Context};
use clap::Subcommand;

use sqlforge_core::patterns::{
    backup_table_query, data_migration_query, data_quality_check, duplicate_detection_query,
    find_template, pagination_query, schema_analysis_query, templates_in, trend_analysis_query,
    TemplateCategory, TrendInterval, TEMPLATES,
};

/// Browse or render the template catalog.
#[derive(Debug, Clone, Subcommand)]
pub enum TemplateCommand {
    /// List templates with their parameters.
    List {
        /// Only this category.
        #[arg(long, value_parser = parse_category)]
        category: Option<TemplateCategory>,
    },

    /// Fill in a template.
    Render {
        /// Template id, as shown by `template list`.
        id: String,

        /// `name=value`; repeat for each parameter.
        #[arg(short, long = "param", value_parser = parse_assignment)]
        params: Vec<(String, String)>,
    },
}

/// One maintenance query to generate.
#[derive(Debug, Clone, Subcommand)]
pub enum PatternCommand {
    /// One page of rows plus the total count.
    Paginate {
        /// Table to page through.
        table: String,

        /// Rows per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,

        /// Page number, from 1.
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Ordering column.
        #[arg(long, default_value = "id")]
        order_by: String,

        /// Filter condition.
        #[arg(long = "where")]
        where_clause: Option<String>,
    },

    /// Copy a table to `{table}_backup_{suffix}` and compare counts.
    Backup {
        /// Table to copy.
        table: String,

        /// Backup name suffix, e.g. a date stamp.
        #[arg(long)]
        suffix: String,
    },

    /// INSERT ... SELECT between two tables, then compare counts.
    Migrate {
        /// Table rows come from.
        source: String,

        /// Table rows go to.
        target: String,

        /// `source_column=target_column`; repeat for each column. Without
        /// any, all columns are copied positionally.
        #[arg(short, long = "map", value_parser = parse_assignment)]
        mapping: Vec<(String, String)>,

        /// Filter applied to the source.
        #[arg(long = "where")]
        where_clause: Option<String>,
    },

    /// Duplicate value combinations and the rows behind them.
    Duplicates {
        /// Table to check.
        table: String,

        /// Comma-separated columns that should be unique together.
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Null counts and completeness per column.
    Quality {
        /// Table to check.
        table: String,

        /// Comma-separated columns to profile.
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Aggregates of a metric per time bucket.
    Trend {
        /// Table to aggregate.
        table: String,

        /// Timestamp column to bucket by.
        #[arg(long)]
        time_column: String,

        /// Column to aggregate.
        #[arg(long)]
        metric: String,

        /// Extra grouping column.
        #[arg(long)]
        group_by: Option<String>,

        /// day, week, month, quarter, or year.
        #[arg(long, value_parser = parse_interval, default_value = "month")]
        interval: TrendInterval,
    },

    /// Row count, size, and index layout of a table (PostgreSQL).
    Schema {
        /// Table to describe.
        table: String,
    },
}

/// Parses a category label such as `data_analysis` or `data-analysis`.
///
/// # Errors
///
/// Returns the list of known categories when the label is not one of them.
pub fn parse_category(name: &str) -> Result<TemplateCategory, String> {
    let wanted = name.trim().replace('-', "_");
    TemplateCategory::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            let known: Vec<&str> = TemplateCategory::ALL.iter().map(|c| c.as_str()).collect();
            format!("unknown category `{name}`; expected one of {}", known.join(", "))
        })
}

/// Parses `day`, `week`, `month`, `quarter`, or `year`.
///
/// # Errors
///
/// Returns a message naming the accepted values.
pub fn parse_interval(name: &str) -> Result<TrendInterval, String> {
    TrendInterval::from_name(name).ok_or_else(|| {
        format!("unknown interval `{name}`; expected day, week, month, quarter, or year")
    })
}

/// Splits `name=value` on the first `=`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the name is blank.
pub fn parse_assignment(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((String::from(name.trim()), String::from(value.trim())))
        }
        _ => Err(format!("expected `name=value`, got `{text}`")),
    }
}

/// Runs one `template` subcommand.
///
/// # Errors
///
/// Returns an error if the template does not exist or a parameter is
/// missing.
pub fn run_template(command: TemplateCommand) -> anyhow::Result<String> {
    match command {
        TemplateCommand::List { category } => {
            let lines: Vec<String> = match category {
                Some(category) => templates_in(category).collect::<Vec<_>>(),
                None => TEMPLATES.iter().collect(),
            }
            .into_iter()
            .map(|t| {
                format!(
                    "{:<22} {:<16} {} [{}]",
                    t.id,
                    t.category.as_str(),
                    t.description,
                    t.parameters.join(", ")
                )
            })
            .collect();
            Ok(lines.join("\n"))
        }
        TemplateCommand::Render { id, params } => {
            let template =
                find_template(&id).ok_or_else(|| anyhow!("no template named `{id}`"))?;
            template
                .render(&params)
                .with_context(|| format!("cannot render template `{id}`"))
        }
    }
}

/// Runs one `pattern` subcommand.
///
/// # Errors
///
/// Returns an error if a table is unsafe or a required input is blank or
/// out of range.
pub fn run_pattern(command: PatternCommand) -> anyhow::Result<String> {
    let sql = match command {
        PatternCommand::Paginate {
            table,
            page_size,
            page,
            order_by,
            where_clause,
        } => pagination_query(&table, page_size, page, &order_by, where_clause.as_deref())
            .with_context(|| format!("cannot page through `{table}`"))?,
        PatternCommand::Backup { table, suffix } => backup_table_query(&table, &suffix)
            .with_context(|| format!("cannot back up `{table}`"))?,
        PatternCommand::Migrate {
            source,
            target,
            mapping,
            where_clause,
        } => data_migration_query(&source, &target, &mapping, where_clause.as_deref())
            .with_context(|| format!("cannot migrate `{source}` to `{target}`"))?,
        PatternCommand::Duplicates { table, columns } => {
            duplicate_detection_query(&table, &columns)
                .with_context(|| format!("cannot check `{table}` for duplicates"))?
        }
        PatternCommand::Quality { table, columns } => data_quality_check(&table, &columns)
            .with_context(|| format!("cannot profile `{table}`"))?,
        PatternCommand::Trend {
            table,
            time_column,
            metric,
            group_by,
            interval,
        } => trend_analysis_query(&table, &time_column, &metric, group_by.as_deref(), interval)
            .with_context(|| format!("cannot build a trend over `{table}`"))?,
        PatternCommand::Schema { table } => schema_analysis_query(&table)
            .with_context(|| format!("cannot describe `{table}`"))?,
    };
    Ok(sql)
}
