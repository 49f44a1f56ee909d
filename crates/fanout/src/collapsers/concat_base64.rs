//! 🔤 **ConcatBase64** — mode `concat-base64`. Concatenate, then standard padded base64.
//!
//! For binary records headed to an endpoint that only speaks text. The capacity model
//! charges `4 × ⌈n / 3⌉` for this, which is exactly what `STANDARD` emits.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Collapser;
use super::concat::splice;
use crate::common::Record;
use crate::errors::CollapseError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ConcatBase64;

impl Collapser for ConcatBase64 {
    #[inline]
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError> {
        Ok(STANDARD.encode(splice(records, group)).into_bytes())
    }
}
