//! 📨 **SingleRecord** — mode `none`. One record in, the same bytes out.
//!
//! The laziest collapser that ever lived, and proud of it. 🦆

use super::Collapser;
use crate::common::Record;
use crate::errors::CollapseError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SingleRecord;

impl Collapser for SingleRecord {
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError> {
        match group {
            [index] => Ok(records[*index].data.clone()),
            // 🚪 anything but exactly one record is a scheduler bug wearing a trench coat
            _ => Err(CollapseError::TooManyRecords { count: group.len() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_the_bytes_go_out_untouched() -> anyhow::Result<()> {
        let records = vec![Record::with_key("k", vec![0xff, 0x00, b'h', b'i'])];
        assert_eq!(SingleRecord.materialize(&records, &[0])?, vec![0xff, 0x00, b'h', b'i']);
        Ok(())
    }

    #[test]
    fn the_one_where_two_is_a_crowd() {
        let records = vec![Record::new("a"), Record::new("b")];
        assert_eq!(
            SingleRecord.materialize(&records, &[0, 1]),
            Err(CollapseError::TooManyRecords { count: 2 })
        );
    }
}
