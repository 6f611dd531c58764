use anyhow::Result;
use chrono::NaiveDateTime;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::Transfer;

/// Exporter for writing ledger data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export transfers in `[from, to]` to CSV format
    pub async fn export_transfers_csv<W: Write>(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        writer: W,
    ) -> Result<usize> {
        let transfers = self.service.get_transfers_in_range(from, to).await?;
        write_transfers_csv(&transfers, writer)
    }

    /// Export transfers in `[from, to]` as a JSON array, same shape as the tool output
    pub async fn export_transfers_json<W: Write>(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        mut writer: W,
    ) -> Result<usize> {
        let transfers = self.service.get_transfers_in_range(from, to).await?;
        serde_json::to_writer_pretty(&mut writer, &transfers)?;
        writeln!(writer)?;
        Ok(transfers.len())
    }
}

fn write_transfers_csv<W: Write>(transfers: &[Transfer], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    // Write header
    csv_writer.write_record(["id", "date", "type", "value", "description"])?;

    for transfer in transfers {
        csv_writer.write_record([
            transfer.id.to_string(),
            transfer.occurred_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            transfer.kind.as_str().to_string(),
            transfer.amount.to_string(),
            transfer.note.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(transfers.len())
}
