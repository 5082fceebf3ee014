//! Request/response bridge between a front-end process and the ledger store.
//!
//! The wire format is newline-delimited JSON: one [`Envelope`] per input line,
//! one [`Reply`] per output line, in request order.

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::application::{AppError, LedgerService};

pub struct Bridge {
    service: LedgerService,
}

impl Bridge {
    pub fn new(service: LedgerService) -> Self {
        Self { service }
    }

    pub fn into_inner(self) -> LedgerService {
        self.service
    }

    /// Run one typed request against the store.
    pub async fn dispatch(&self, request: Request) -> Result<Payload, AppError> {
        match request {
            Request::ListTransactions => {
                let transactions = self.service.list_transactions().await?;
                Ok(Payload::Transactions(
                    transactions.iter().map(TransactionView::from).collect(),
                ))
            }
            Request::AddTransaction(params) => {
                let new = params.into_new_transaction()?;
                let transaction = self.service.create_transaction(new).await?;
                Ok(Payload::Transaction(TransactionView::from(&transaction)))
            }
            Request::DeleteTransaction { id } => {
                Ok(Payload::Deleted(self.service.delete_transaction(id).await?))
            }
            Request::GetStats => Ok(Payload::Stats(self.service.stats().await?.into())),
        }
    }

    /// Handle one raw request line and render the reply line (without newline).
    pub async fn handle_line(&self, line: &str) -> String {
        let reply = self.handle_envelope(line).await;
        serde_json::to_string(&reply).unwrap_or_else(|err| {
            format!(
                r#"{{"error":{{"kind":"internal","message":"failed to encode reply: {}"}}}}"#,
                err
            )
        })
    }

    async fn handle_envelope(&self, line: &str) -> Reply {
        let envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                let err = BridgeError::InvalidRequest(err.to_string());
                warn!(error = %err, "malformed bridge request");
                return Reply::error(None, &err);
            }
        };

        let id = envelope.id;
        let request = match Request::decode(&envelope.method, envelope.params) {
            Ok(request) => request,
            Err(err) => {
                warn!(method = %envelope.method, error = %err, "rejected bridge request");
                return Reply::error(id, &err);
            }
        };

        let method = request.method();
        debug!(method, "bridge request");
        match self.dispatch(request).await {
            Ok(payload) => Reply::ok(id, payload),
            Err(err) => {
                warn!(method, kind = err.kind(), error = %err, "bridge request failed");
                Reply::error(id, &BridgeError::App(err))
            }
        }
    }

    /// Serve requests from `reader` until EOF, writing one reply per request.
    /// Blank lines are skipped. Returns the number of requests handled.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read bridge request")?
        {
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle_line(&line).await;
            writer
                .write_all(reply.as_bytes())
                .await
                .context("Failed to write bridge reply")?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            handled += 1;
        }

        debug!(handled, "bridge input closed");
        Ok(handled)
    }
}
