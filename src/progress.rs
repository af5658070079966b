//! Disk transfer progress
//!
//! The transfer tool prints one JSON object per line while it copies a disk.
//! [`track_progress`] reads those lines and publishes the byte count to a
//! [`ProgressSink`] under the ID of the resource being transferred.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One progress sample emitted by the transfer tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferProgress {
    pub transferred: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub elapsed: f64,
}

impl TransferProgress {
    /// Completion in percent, when the total size is known
    pub fn percent(&self) -> Option<f64> {
        match self.size {
            Some(size) if size > 0 => Some(self.transferred as f64 * 100.0 / size as f64),
            _ => None,
        }
    }
}

/// Destination of progress samples
pub trait ProgressSink: Send + Sync {
    fn record(&self, resource_id: &str, progress: &TransferProgress);
}

/// Bytes transferred per resource ID, last value wins
#[derive(Debug, Default)]
pub struct ProgressGauge {
    values: Mutex<HashMap<String, u64>>,
}

impl ProgressGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource_id: &str) -> Option<u64> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(resource_id)
            .copied()
    }

    /// All current values, sorted by resource ID
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut snapshot: Vec<_> = values.iter().map(|(id, v)| (id.clone(), *v)).collect();
        snapshot.sort();
        snapshot
    }
}

impl ProgressSink for ProgressGauge {
    fn record(&self, resource_id: &str, progress: &TransferProgress) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(resource_id.to_string(), progress.transferred);
    }
}

/// Consume progress lines until EOF. Returns the last sample that parsed.
pub async fn track_progress<R, S>(reader: R, resource_id: &str, sink: &S) -> Result<Option<TransferProgress>>
where
    R: AsyncBufRead + Unpin,
    S: ProgressSink + ?Sized,
{
    let mut lines = reader.lines();
    let mut last = None;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tracing::debug!("{}: {}", resource_id, line);

        match serde_json::from_str::<TransferProgress>(line) {
            Ok(progress) => {
                sink.record(resource_id, &progress);
                last = Some(progress);
            },
            Err(e) => tracing::warn!("{}: skipping unparsable progress line: {}", resource_id, e),
        }
    }

    Ok(last)
}
