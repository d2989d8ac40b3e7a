//! Codec statistics hook.
//!
//! The engine pushes one [`CodecStats`] snapshot per registered video codec
//! into a [`StatsCollector`]. Collection is best-effort telemetry: the engine
//! logs and drops collector errors instead of failing its caller.

use std::collections::HashMap;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::codec::PayloadType;
use crate::error::Result;

/// Point-in-time description of one registered codec
/// (W3C `RTCCodecStats`).
#[derive(Debug, Clone, PartialEq)]
pub struct CodecStats {
    pub timestamp: SystemTime,
    /// Stable identifier assigned at registration.
    pub id: String,
    pub payload_type: PayloadType,
    pub mime_type: String,
    pub clock_rate: u32,
    pub channels: u8,
    pub sdp_fmtp_line: String,
}

/// Receiver of stats snapshots.
pub trait StatsCollector: Send + Sync {
    /// Accept one `(id, snapshot)` pair.
    fn collect(&self, id: &str, stats: CodecStats) -> Result<()>;
}

/// In-memory collector keyed by stats id. A later report for the same id
/// replaces the earlier one.
#[derive(Debug, Default)]
pub struct StatsReport {
    reports: Mutex<HashMap<String, CodecStats>>,
}

impl StatsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<CodecStats> {
        self.reports.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// All collected snapshots, ordered by payload type.
    pub fn snapshots(&self) -> Vec<CodecStats> {
        let mut all: Vec<CodecStats> = self.reports.lock().values().cloned().collect();
        all.sort_by_key(|s| s.payload_type);
        all
    }
}

impl StatsCollector for StatsReport {
    fn collect(&self, id: &str, stats: CodecStats) -> Result<()> {
        self.reports.lock().insert(id.to_string(), stats);
        Ok(())
    }
}
