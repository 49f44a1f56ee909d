//! 💀 Errors — the four ways a batch of records can disappoint us before the network even gets a chance.
//!
//! 🧠 Knowledge graph:
//! - `CollapseError` is the typed vocabulary of the collapsing core. The scheduler upstream
//!   matches on it to decide "report and move on" vs "someone misconfigured the target".
//! - Everything around the core (config, input files, HTTP) stays on `anyhow`, like the rest of
//!   the crate. Only the core gets a real enum, because only the core has callers who care.
//! - Transport failures are NOT in here. They are opaque, belong to the transport, and ride
//!   back to the caller as a string inside an `Outcome`. 🦆

use thiserror::Error;

/// 🏷️ Every way collapsing can fail. All of them are permanent — retrying the same input
/// produces the same error, byte for byte. Determinism: it cuts both ways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollapseError {
    /// 📏 One record is bigger than the endpoint will ever accept, alone or in company.
    #[error("💀 record #{index} needs {size} bytes but the endpoint stops listening at {limit}")]
    RecordTooLarge {
        index: usize,
        size: usize,
        limit: usize,
    },

    /// 🧾 A record in `json-array` mode that is not JSON. Reported for the whole group.
    #[error("💀 record #{index} is not valid JSON text, so its group cannot be wrapped: {reason}")]
    InvalidRecordEncoding { index: usize, reason: String },

    /// 🎛️ Nobody told us about this collapse mode, and we don't guess.
    #[error(
        "💀 unsupported collapse mode '{0}' — expected one of: none, json-array, concat, concat-base64"
    )]
    UnsupportedCollapseMode(String),

    /// 🚪 Mode `none` means one record per call. The scheduler handed us a crowd.
    #[error("💀 collapse mode 'none' sends exactly one record per call, but {count} were supplied")]
    TooManyRecords { count: usize },
}

impl CollapseError {
    /// 🔁 Should the scheduler try again with the same input? Never. Not one of these heals itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RecordTooLarge { .. }
            | Self::InvalidRecordEncoding { .. }
            | Self::UnsupportedCollapseMode(_)
            | Self::TooManyRecords { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_nothing_is_worth_retrying() {
        let every_flavor_of_sad = [
            CollapseError::RecordTooLarge {
                index: 0,
                size: 262145,
                limit: 262144,
            },
            CollapseError::InvalidRecordEncoding {
                index: 3,
                reason: "expected value".into(),
            },
            CollapseError::UnsupportedCollapseMode("yolo".into()),
            CollapseError::TooManyRecords { count: 2 },
        ];
        assert!(every_flavor_of_sad.iter().all(|e| !e.is_retryable()));
    }

    #[test]
    fn the_one_where_the_message_names_the_culprit() {
        let err = CollapseError::UnsupportedCollapseMode("unknown".into());
        assert!(err.to_string().contains("'unknown'"));
    }
}
