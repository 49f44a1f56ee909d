//! 🔗 **Concat** — mode `concat`. Raw bytes, back to back, no separators.
//!
//! Record boundaries are gone once this runs. Consumers that need them should use
//! `json-array`, or records that delimit themselves. 🦆

use super::Collapser;
use crate::common::Record;
use crate::errors::CollapseError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Concat;

/// 🧵 The shared splice, also used by `ConcatBase64` before it encodes.
pub(crate) fn splice(records: &[Record], group: &[usize]) -> Vec<u8> {
    // 🧮 exact capacity, no regrowth
    let total: usize = group.iter().map(|&index| records[index].len()).sum();
    let mut payload = Vec::with_capacity(total);
    for &index in group {
        payload.extend_from_slice(&records[index].data);
    }
    payload
}

impl Collapser for Concat {
    #[inline]
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError> {
        Ok(splice(records, group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_order_is_preserved_and_nothing_is_added() -> anyhow::Result<()> {
        let records = vec![Record::new("abc"), Record::new(""), Record::new("de"), Record::new("f")];
        assert_eq!(Concat.materialize(&records, &[0, 1, 2])?, b"abcde");
        Ok(())
    }

    #[test]
    fn the_one_where_only_the_group_is_spliced() -> anyhow::Result<()> {
        let records = vec![Record::new("skip"), Record::new("keep"), Record::new("me")];
        assert_eq!(Concat.materialize(&records, &[1, 2])?, b"keepme");
        Ok(())
    }
}
