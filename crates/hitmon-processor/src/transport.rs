use crate::adapter::NodeAnalyzer;
use anyhow::{Context, Result};
use hitmon_common::types::MetricSample;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransportStats {
    pub batches: u64,
    /// Lines that were not a JSON array of samples.
    pub rejected: u64,
    pub samples_in: u64,
    pub samples_out: u64,
}

/// Line-delimited JSON loop: every non-blank input line is one batch, and
/// every batch gets exactly one output line. Undecodable lines are answered
/// with `[]` so the host stays in step. Returns at end of input.
pub async fn run<R, W>(analyzer: &mut NodeAnalyzer, reader: R, mut writer: W) -> Result<TransportStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = TransportStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read batch")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<Vec<MetricSample>>(line) {
            Ok(batch) => {
                stats.batches += 1;
                stats.samples_in += batch.len() as u64;
                let output = analyzer.process_batch(batch);
                stats.samples_out += output.len() as u64;
                output
            }
            Err(e) => {
                stats.rejected += 1;
                tracing::warn!(error = %e, "Rejected undecodable batch");
                Vec::new()
            }
        };

        let mut encoded = serde_json::to_vec(&output)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await.context("Failed to write batch")?;
        writer.flush().await?;
    }

    tracing::debug!(
        batches = stats.batches,
        rejected = stats.rejected,
        samples_in = stats.samples_in,
        samples_out = stats.samples_out,
        "Input closed"
    );
    Ok(stats)
}
