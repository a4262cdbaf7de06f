//! Work item projection and result aggregation

use crate::error::{PamError, Result};
use crate::types::{MetricResult, Table, Value, WorkItem};
use std::collections::BTreeSet;

/// Project work items from two named columns of a validated table
///
/// One column supplies the file locator, the other the identifier results
/// are keyed by.
pub fn work_items(table: &Table, path_column: &str, id_column: &str) -> Result<Vec<WorkItem>> {
    let path_idx = table.column_index(path_column).ok_or_else(|| {
        PamError::Config(format!(
            "work item projection requires column '{path_column}'"
        ))
    })?;
    let id_idx = table.column_index(id_column).ok_or_else(|| {
        PamError::Config(format!("work item projection requires column '{id_column}'"))
    })?;

    let mut items = Vec::with_capacity(table.len());
    for (row_idx, row) in table.rows().iter().enumerate() {
        let path = &row[path_idx];
        let id = &row[id_idx];
        if path.is_null() || id.is_null() {
            return Err(PamError::Config(format!(
                "row {row_idx} has a null '{path_column}' or '{id_column}' value"
            )));
        }
        items.push(WorkItem::new(path.render(), id.render()));
    }
    Ok(items)
}

/// Merge successful metric results into one identifier-keyed table
///
/// The identifier column comes first, then metric columns in stable name
/// order. Rows keep the completion order the results arrived in; failed
/// items are simply absent, never placeholder rows. A metric missing from
/// one surviving row (e.g. skipped as unknown) renders as null there.
pub fn aggregate_results(results: &[MetricResult], id_column: &str) -> Table {
    let metric_names: BTreeSet<&str> = results
        .iter()
        .flat_map(|r| r.values.keys().map(String::as_str))
        .collect();

    let mut columns = Vec::with_capacity(metric_names.len() + 1);
    columns.push(id_column.to_string());
    columns.extend(metric_names.iter().map(|n| n.to_string()));

    let mut table = Table::new(columns);
    for result in results {
        let mut row = Vec::with_capacity(metric_names.len() + 1);
        row.push(Value::Str(result.media_id.clone()));
        for name in &metric_names {
            row.push(
                result
                    .values
                    .get(*name)
                    .map_or(Value::Null, |v| v.to_cell()),
            );
        }
        table.push_row(row);
    }
    table
}
