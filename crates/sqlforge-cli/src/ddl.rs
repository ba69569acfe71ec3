//! `sqlforge ddl`: one-off views, indexes, constraints, triggers, and
//! routines.

use anyhow::Context;
use clap::Subcommand;

use sqlforge_core::advanced::{
    add_constraint, create_function, create_index, create_procedure, create_trigger, create_view,
    Constraint, ParamDirection, RoutineParam, TriggerEvent, TriggerTiming,
};

/// One DDL statement to generate.
#[derive(Debug, Clone, Subcommand)]
pub enum DdlCommand {
    /// CREATE OR REPLACE VIEW.
    View {
        /// View name.
        name: String,

        /// Query the view selects.
        #[arg(short, long)]
        query: String,

        /// Schema qualifier.
        #[arg(long)]
        schema: Option<String>,
    },

    /// CREATE INDEX.
    Index {
        /// Indexed table.
        table: String,

        /// Comma-separated indexed columns.
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Index name; derived from the table and columns when omitted.
        #[arg(long)]
        name: Option<String>,

        /// Create a UNIQUE index.
        #[arg(long)]
        unique: bool,

        /// Index method, e.g. BTREE or HASH.
        #[arg(long = "using")]
        index_type: Option<String>,
    },

    /// ALTER TABLE ... ADD CONSTRAINT.
    Constraint {
        /// Constrained table.
        table: String,

        /// Constraint name.
        name: String,

        #[command(subcommand)]
        kind: ConstraintKind,
    },

    /// Row-level trigger.
    Trigger {
        /// Trigger name.
        name: String,

        /// Table the trigger watches.
        table: String,

        /// before or after.
        #[arg(long, value_parser = parse_timing)]
        timing: TriggerTiming,

        /// insert, update, or delete.
        #[arg(long, value_parser = parse_event)]
        event: TriggerEvent,

        /// Statements between BEGIN and END.
        #[arg(long)]
        body: String,
    },

    /// Stored procedure.
    Procedure {
        /// Procedure name.
        name: String,

        /// `[IN|OUT|INOUT] name TYPE`; repeat for each parameter.
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<RoutineParam>,

        /// Statements between BEGIN and END.
        #[arg(long)]
        body: String,

        /// Schema qualifier.
        #[arg(long)]
        schema: Option<String>,
    },

    /// Scalar function.
    Function {
        /// Function name.
        name: String,

        /// `name TYPE`; repeat for each parameter.
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<RoutineParam>,

        /// Return type.
        #[arg(long)]
        returns: String,

        /// Statements between BEGIN and END.
        #[arg(long)]
        body: String,

        /// Mark the function DETERMINISTIC.
        #[arg(long)]
        deterministic: bool,

        /// Schema qualifier.
        #[arg(long)]
        schema: Option<String>,
    },
}

/// The constraint added by `ddl constraint`.
#[derive(Debug, Clone, Subcommand)]
pub enum ConstraintKind {
    /// PRIMARY KEY (columns).
    PrimaryKey {
        /// Comma-separated key columns.
        #[arg(value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// UNIQUE (columns).
    Unique {
        /// Comma-separated columns.
        #[arg(value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// FOREIGN KEY (columns) REFERENCES table (columns).
    ForeignKey {
        /// Comma-separated referencing columns.
        #[arg(value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Referenced table.
        #[arg(long)]
        references: String,

        /// Comma-separated referenced columns.
        #[arg(long, value_delimiter = ',', required = true)]
        ref_columns: Vec<String>,
    },

    /// CHECK (condition).
    Check {
        /// Boolean condition.
        condition: String,
    },
}

impl From<ConstraintKind> for Constraint {
    fn from(kind: ConstraintKind) -> Self {
        match kind {
            ConstraintKind::PrimaryKey { columns } => Self::PrimaryKey(columns),
            ConstraintKind::Unique { columns } => Self::Unique(columns),
            ConstraintKind::ForeignKey {
                columns,
                references,
                ref_columns,
            } => Self::ForeignKey {
                columns,
                ref_table: references,
                ref_columns,
            },
            ConstraintKind::Check { condition } => Self::Check(condition),
        }
    }
}

/// Parses `before` or `after`.
///
/// # Errors
///
/// Returns a message naming the accepted values.
pub fn parse_timing(name: &str) -> Result<TriggerTiming, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "before" => Ok(TriggerTiming::Before),
        "after" => Ok(TriggerTiming::After),
        _ => Err(format!("unknown timing `{name}`; expected before or after")),
    }
}

/// Parses `insert`, `update`, or `delete`.
///
/// # Errors
///
/// Returns a message naming the accepted values.
pub fn parse_event(name: &str) -> Result<TriggerEvent, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "insert" => Ok(TriggerEvent::Insert),
        "update" => Ok(TriggerEvent::Update),
        "delete" => Ok(TriggerEvent::Delete),
        _ => Err(format!(
            "unknown event `{name}`; expected insert, update, or delete"
        )),
    }
}

/// Parses `[IN|OUT|INOUT] name TYPE`. The type is everything after the
/// name, so `total DECIMAL(10, 2)` keeps its spaces.
///
/// # Errors
///
/// Returns an error if the name or type is missing.
pub fn parse_param(text: &str) -> Result<RoutineParam, String> {
    let text = text.trim();
    let (direction, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => match head.to_ascii_uppercase().as_str() {
            "IN" => (ParamDirection::In, rest),
            "OUT" => (ParamDirection::Out, rest),
            "INOUT" => (ParamDirection::InOut, rest),
            _ => (ParamDirection::In, text),
        },
        None => (ParamDirection::In, text),
    };
    let Some((name, data_type)) = rest.trim().split_once(char::is_whitespace) else {
        return Err(format!("parameter `{text}` needs a name and a type"));
    };
    Ok(RoutineParam::new(name, data_type.trim()).direction(direction))
}

/// Builds the statement for one `ddl` subcommand.
///
/// # Errors
///
/// Returns an error naming the object when a required part is blank or
/// unsafe.
pub fn run(command: DdlCommand) -> anyhow::Result<String> {
    let sql = match command {
        DdlCommand::View {
            name,
            query,
            schema,
        } => create_view(&name, &query, schema.as_deref())
            .with_context(|| format!("cannot create view `{name}`"))?,
        DdlCommand::Index {
            table,
            columns,
            name,
            unique,
            index_type,
        } => create_index(
            &table,
            &columns,
            name.as_deref(),
            unique,
            index_type.as_deref(),
        )
        .with_context(|| format!("cannot create index on `{table}`"))?,
        DdlCommand::Constraint { table, name, kind } => {
            add_constraint(&table, &name, &kind.into())
                .with_context(|| format!("cannot add constraint `{name}` to `{table}`"))?
        }
        DdlCommand::Trigger {
            name,
            table,
            timing,
            event,
            body,
        } => create_trigger(&name, &table, timing, event, &body)
            .with_context(|| format!("cannot create trigger `{name}`"))?,
        DdlCommand::Procedure {
            name,
            params,
            body,
            schema,
        } => create_procedure(&name, &params, &body, schema.as_deref())
            .with_context(|| format!("cannot create procedure `{name}`"))?,
        DdlCommand::Function {
            name,
            params,
            returns,
            body,
            deterministic,
            schema,
        } => create_function(
            &name,
            &params,
            &returns,
            &body,
            deterministic,
            schema.as_deref(),
        )
        .with_context(|| format!("cannot create function `{name}`"))?,
    };
    Ok(sql)
}
