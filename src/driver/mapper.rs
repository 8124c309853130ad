//! Row-to-field mapping — one send-text per cell, in source column order.

use super::interact::FormActions;
use crate::config::FieldTable;
use crate::data::Row;
use crate::{Error, Result};
use tracing::info;

/// Fill one row into the form.
///
/// Cells are visited in the row's own order. A header with no locator in
/// the table is an unrecoverable fault: processing halts mid-row, and cells
/// after it are never typed.
pub async fn fill_row<A: FormActions>(actions: &A, fields: &FieldTable, row: &Row) -> Result<()> {
    for (header, value) in row.iter() {
        let locator = fields
            .get(header)
            .ok_or_else(|| Error::UnknownColumn(header.to_string()))?;
        info!("filling {}: {}", header, value);
        actions.send_text(locator, value).await?;
    }
    Ok(())
}
