//! sqlforge CLI
//!
//! Generates SQL from row configuration and checks hand-written SQL.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlforge_cli::ddl::{self, DdlCommand};
use sqlforge_cli::patterns::{run_pattern, run_template, PatternCommand, TemplateCommand};
use sqlforge_cli::{generate, parse_operation, read_sql, render, write_output, TargetArgs};
use sqlforge_core::format::{beautify_sql, formatting_suggestions, IdentifierCase};
use sqlforge_core::{
    analyze_complexity, format_sql, scan_inputs, validate_sql, FormatOptions, GenerateOptions,
    Operation,
};

/// SQL statement generation and validation.
#[derive(Parser)]
#[command(name = "sqlforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip rows whose table or column names fail the identifier checks.
    #[arg(long, global = true, env = "SQLFORGE_STRICT")]
    strict: bool,

    /// Do not emit `--------- table ---------` banner lines.
    #[arg(long, global = true, env = "SQLFORGE_NO_BANNERS")]
    no_banners: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate statements for one operation.
    Generate {
        /// create, select, insert, delete, merge, or truncate.
        #[arg(value_parser = parse_operation)]
        operation: Operation,

        /// JSON row source; when given, the target flags are ignored.
        #[arg(short, long, env = "SQLFORGE_SOURCE")]
        source: Option<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,

        /// Reindent the generated statements.
        #[arg(long)]
        format: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check SQL for structural errors and risky patterns.
    Validate {
        /// SQL file (stdin if not specified).
        file: Option<PathBuf>,
    },

    /// Score how hard a statement is to review.
    Analyze {
        /// SQL file (stdin if not specified).
        file: Option<PathBuf>,
    },

    /// Reindent SQL.
    Format {
        /// SQL file (stdin if not specified).
        file: Option<PathBuf>,

        /// Spaces per indentation level.
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Lower-case unquoted identifiers.
        #[arg(long)]
        lowercase_identifiers: bool,

        /// Lower-case identifiers and add a blank line after each clause.
        #[arg(long, conflicts_with_all = ["indent", "lowercase_identifiers", "suggest"])]
        beautify: bool,

        /// Print layout hints instead of reformatting.
        #[arg(long)]
        suggest: bool,
    },

    /// Generate one-off DDL: views, indexes, constraints, triggers, routines.
    Ddl {
        #[command(subcommand)]
        command: DdlCommand,
    },

    /// Browse or render the SQL template catalog.
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Generate maintenance queries: paging, backups, migrations, checks.
    Pattern {
        #[command(subcommand)]
        command: PatternCommand,
    },

    /// Check form inputs for unsafe identifiers and injection patterns.
    Scan {
        /// Table name.
        #[arg(long)]
        table: Option<String>,

        /// Comma-separated column list.
        #[arg(long)]
        columns: Option<String>,

        /// WHERE clause fragment.
        #[arg(long = "where")]
        where_clause: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = GenerateOptions {
        banners: !cli.no_banners,
        strict_identifiers: cli.strict,
    };

    match cli.command {
        Commands::Generate {
            operation,
            source,
            target,
            format,
            output,
        } => {
            let batch = generate(operation, source.as_deref(), &target, options)?;
            if batch.is_empty() {
                info!(%operation, "nothing was generated");
            }
            write_output(output.as_deref(), &render(&batch, format))?;
        }

        Commands::Validate { file } => {
            let result = validate_sql(&read_sql(file.as_deref())?);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Analyze { file } => {
            let report = analyze_complexity(&read_sql(file.as_deref())?);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Format {
            file,
            indent,
            lowercase_identifiers,
            beautify,
            suggest,
        } => {
            let sql = read_sql(file.as_deref())?;
            if suggest {
                println!("{}", serde_json::to_string_pretty(&formatting_suggestions(&sql))?);
            } else if beautify {
                println!("{}", beautify_sql(&sql));
            } else {
                let options = FormatOptions {
                    indent_width: indent,
                    identifier_case: lowercase_identifiers.then_some(IdentifierCase::Lower),
                    ..FormatOptions::default()
                };
                println!("{}", format_sql(&sql, &options));
            }
        }

        Commands::Ddl { command } => println!("{}", ddl::run(command)?),

        Commands::Template { command } => println!("{}", run_template(command)?),

        Commands::Pattern { command } => println!("{}", run_pattern(command)?),

        Commands::Scan {
            table,
            columns,
            where_clause,
        } => {
            let report = scan_inputs(
                table.as_deref(),
                columns.as_deref(),
                where_clause.as_deref(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_safe {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
