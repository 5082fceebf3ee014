use std::io::Write;

use anyhow::Result;

use crate::application::LedgerService;
use crate::bridge::TransactionView;
use crate::domain::format_cents;

/// Exporter for writing the ledger out as CSV or JSON, in list order.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export transactions to CSV. Returns the number of rows written.
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.service.list_transactions().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "date", "type", "category", "amount", "description"])?;
        for tx in &transactions {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.date.to_string(),
                tx.transaction_type.to_string(),
                tx.category.clone(),
                format_cents(tx.amount_cents),
                tx.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export transactions as a pretty-printed JSON array, same shape as the bridge.
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let transactions = self.service.list_transactions().await?;
        let views: Vec<TransactionView> = transactions.iter().map(TransactionView::from).collect();

        serde_json::to_writer_pretty(&mut writer, &views)?;
        writeln!(writer)?;
        Ok(views.len())
    }
}
