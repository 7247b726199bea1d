//! Transfer progress reporting

use bytes::Bytes;

/// Kind of progress event
///
/// See the request state machine (§4.5 in the design notes): progress events are
/// emitted while a request is `executing`, and a `resumed` event marks the start
/// of a successful resume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Bytes are being sent to the server
    Upload,
    /// Bytes are being received from the server
    Download,
    /// The transfer failed; `partial_data` on the [`Progress`] value may carry
    /// resumable bytes for `largeData` transfers
    Failed,
    /// A resumed download has begun; subsequent events are `Download`
    Resumed,
}

/// A single progress observation for an in-flight request
///
/// `expected_bytes` is `-1` when the transport never reported a length (e.g. chunked
/// transfer-encoding) and `0` when a `Content-Length` of zero was advertised; in both
/// cases `percentage` is `0.0` rather than `NaN` (§9 Open Question: this crate chooses
/// the sentinel-zero behavior over `NaN` so progress readers never have to special-case
/// a non-comparable float).
#[derive(Debug, Clone)]
pub struct Progress {
    /// What kind of transfer this observation describes
    pub event: ProgressEvent,
    /// Bytes transferred so far in the current attempt
    pub current_bytes: u64,
    /// Expected total bytes, `-1` if unknown
    pub expected_bytes: i64,
    /// Completion fraction in `0.0..=1.0`, or `0.0` when `expected_bytes` is not known
    pub percentage: f64,
    /// Bytes salvaged from a failed `largeData` transfer, usable to resume
    pub partial_data: Option<Bytes>,
}

impl Progress {
    /// Construct a progress event, deriving `percentage` from `current_bytes` and
    /// `expected_bytes` per the boundary rule: unknown or zero expected length yields
    /// `0.0`, never a division by zero.
    pub fn new(event: ProgressEvent, current_bytes: u64, expected_bytes: i64) -> Self {
        let percentage = if expected_bytes > 0 {
            (current_bytes as f64 / expected_bytes as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            event,
            current_bytes,
            expected_bytes,
            percentage,
            partial_data: None,
        }
    }

    /// Attach resumable bytes to a `Failed` progress event
    pub fn with_partial_data(mut self, bytes: Bytes) -> Self {
        self.partial_data = Some(bytes);
        self
    }
}
