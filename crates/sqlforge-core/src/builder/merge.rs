//! `MERGE INTO ... USING ... AS SOURCE` upserts.

use super::{indented_list, non_empty, GenerateOptions, GeneratedStatement, StatementBuilder};
use crate::error::{Result, RowIssue};
use crate::ident::Identifier;
use crate::row::{split_list, MergeRow, Operation};

/// Builds `MERGE` statements.
///
/// The `ON` clause refers to the target by its last dot-separated segment.
/// For a three-part name such as `db.sales.orders` that alias is `orders`,
/// which only resolves if the engine accepts the bare table name; this is
/// logged as a warning and left as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeBuilder;

impl StatementBuilder for MergeBuilder {
    const OPERATION: Operation = Operation::Merge;
    type Row = MergeRow;
    type Params = MergeRow;

    fn single(params: &MergeRow, options: &GenerateOptions) -> Result<GeneratedStatement> {
        super::require(Self::OPERATION, "target_table", &params.target_table)?;
        super::require(Self::OPERATION, "target_column_list", &params.target_column_list)?;
        super::require(Self::OPERATION, "unique_id", &params.unique_id)?;
        super::require(Self::OPERATION, "source_table", &params.source_table)?;
        super::require(Self::OPERATION, "source_column_list", &params.source_column_list)?;
        Ok(Self::build_row(params, options)?)
    }

    fn build_row(
        row: &MergeRow,
        options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        let targets = split_list(&row.target_column_list);
        let sources = split_list(&row.source_column_list);
        if targets.len() != sources.len() {
            return Err(RowIssue::ShapeMismatch {
                left: "target_column_list",
                left_len: targets.len(),
                right: "source_column_list",
                right_len: sources.len(),
            });
        }
        let targets = non_empty("target_column_list", targets)?;

        let target = Identifier::parse(&row.target_table);
        let source = Identifier::parse(&row.source_table);
        if target.is_multi_level() {
            tracing::warn!(
                table = %target,
                alias = target.name(),
                "merge target has more than one qualifying dot; ON clause uses the last segment"
            );
        }
        let alias = target.name();
        let key = row.unique_id.trim();

        let assignments: Vec<String> = targets
            .iter()
            .zip(&sources)
            .map(|(t, s)| format!("{t} = SOURCE.{s}"))
            .collect();
        let source_values: Vec<String> = sources.iter().map(|s| format!("SOURCE.{s}")).collect();

        let sql = format!(
            "MERGE INTO {target}\n\
             USING {source} AS SOURCE\n\
             ON {alias}.{key} = SOURCE.{key}\n\
             WHEN MATCHED THEN\n    \
             UPDATE SET\n\
             {set}\n\
             WHEN NOT MATCHED THEN\n    \
             INSERT (\n\
             {insert}\n    \
             )\n    \
             VALUES (\n\
             {values}\n    \
             );",
            set = indented_list(&assignments, 2),
            insert = indented_list(&targets, 2),
            values = indented_list(&source_values, 2),
        );

        Ok(GeneratedStatement::single(sql).with_banner(&target.render(), options.banners))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(target: &str, targets: &str, sources: &str) -> MergeRow {
        MergeRow {
            target_table: String::from(target),
            target_column_list: String::from(targets),
            unique_id: String::from("id"),
            source_table: String::from("stage.orders"),
            source_column_list: String::from(sources),
        }
    }

    #[test]
    fn test_merge_layout() {
        let group =
            MergeBuilder::build_row(&row("dw.orders", "x, y", "p, q"), &GenerateOptions::default())
                .unwrap();
        assert_eq!(group.banner(), Some("--------- dw.orders ---------"));
        assert_eq!(
            group.statements()[0],
            "MERGE INTO dw.orders\n\
             USING stage.orders AS SOURCE\n\
             ON orders.id = SOURCE.id\n\
             WHEN MATCHED THEN\n\
             \x20   UPDATE SET\n\
             \x20       x = SOURCE.p,\n\
             \x20       y = SOURCE.q\n\
             WHEN NOT MATCHED THEN\n\
             \x20   INSERT (\n\
             \x20       x,\n\
             \x20       y\n\
             \x20   )\n\
             \x20   VALUES (\n\
             \x20       SOURCE.p,\n\
             \x20       SOURCE.q\n\
             \x20   );"
        );
    }

    #[test]
    fn test_set_clause_order_follows_lists() {
        let group = MergeBuilder::build_row(&row("t", "x,y", "p,q"), &GenerateOptions::default())
            .unwrap();
        let sql = &group.statements()[0];
        let x = sql.find("x = SOURCE.p").unwrap();
        let y = sql.find("y = SOURCE.q").unwrap();
        assert!(x < y);
        assert!(sql.contains("ON t.id = SOURCE.id"));
    }

    #[test]
    fn test_three_part_target_uses_last_segment() {
        let group = MergeBuilder::build_row(
            &row("db.sales.orders", "x", "p"),
            &GenerateOptions::default(),
        )
        .unwrap();
        assert!(group.statements()[0].contains("ON orders.id = SOURCE.id"));
    }

    #[test]
    fn test_misaligned_lists() {
        let err = MergeBuilder::build_row(&row("t", "x,y", "p"), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err, RowIssue::ShapeMismatch { left_len: 2, right_len: 1, .. }));
    }
}
