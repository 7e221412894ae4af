//! Newline-delimited JSON host over stdin/stdout.
//!
//! Each input line is a [`CommandEnvelope`]; each produces exactly one
//! [`ResponseEnvelope`] line. Commands are handled one at a time in arrival
//! order.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::error::{HostError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EVENT_VERSION, ResponseEnvelope};
use crate::service::{SearchInput, SearchService};

/// Serve stdin/stdout until stdin closes or `shutdown` fires.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub async fn run_stdio_bridge(
    service: Arc<SearchService>,
    shutdown: CancellationToken,
) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve_lines(service, reader, writer, shutdown).await
}

/// Serve envelopes read from `reader`, writing responses to `writer`.
///
/// # Errors
///
/// Returns an error if reading, encoding, or writing fails.
pub async fn serve_lines<R, W>(
    service: Arc<SearchService>,
    mut reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                tracing::info!("shutdown requested; stopping stdio host");
                break;
            }
            read = reader.read_line(&mut line) => read?,
        };

        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); stopping stdio host");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<CommandEnvelope>(trimmed) {
            Ok(envelope) => dispatch(&service, envelope, &shutdown).await,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let message = format!("failed to parse command envelope: {e}");
                ResponseEnvelope::error("parse-error", message)
            }
        };

        let json = serde_json::to_string(&response).map_err(|e| {
            HostError::Protocol(format!("failed to serialize response envelope: {e}"))
        })?;
        write_line(&mut writer, &json).await?;
    }

    Ok(())
}

/// Handle one command and build its response.
pub async fn dispatch(
    service: &SearchService,
    envelope: CommandEnvelope,
    cancel: &CancellationToken,
) -> ResponseEnvelope {
    if let Err(e) = envelope.validate() {
        return ResponseEnvelope::error(envelope.request_id, e.to_string());
    }
    let request_id = envelope.request_id;
    tracing::debug!(
        request_id = %request_id,
        command = envelope.command.as_str(),
        "command received"
    );

    match envelope.command {
        CommandName::HostPing => {
            ResponseEnvelope::ok(request_id, serde_json::json!({ "pong": true }))
        }
        CommandName::HostVersion => ResponseEnvelope::ok(
            request_id,
            serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "contract": EVENT_VERSION,
                "summaries": service.summaries_available(),
            }),
        ),
        CommandName::Search => {
            let input: SearchInput = match serde_json::from_value(envelope.payload) {
                Ok(input) => input,
                Err(e) => {
                    let message = format!("invalid search payload: {e}");
                    return ResponseEnvelope::error(request_id, message);
                }
            };
            match service.handle_until(input, cancel).await {
                Ok(results) => match serde_json::to_value(&results) {
                    Ok(payload) => ResponseEnvelope::ok(request_id, payload),
                    Err(e) => {
                        let message = format!("failed to encode results: {e}");
                        ResponseEnvelope::error(request_id, message)
                    }
                },
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "search command failed");
                    ResponseEnvelope::error(request_id, e.to_string())
                }
            }
        }
    }
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
