use crate::{
    binaries::{cstring_at, ByteCursor},
    error::{JupexError, Result},
};

/// Points at one string in the blob and says who it belongs to.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StringTableEntry {
    pub offset: u32,
    pub owner: u32,
}

impl StringTableEntry {
    pub fn read_all(cursor: &mut ByteCursor<'_>, count: u32) -> Result<Vec<Self>> {
        let count = cursor.ensure_count("string table entry", count.into(), 8)?;
        (0..count).map(|_| cursor.read::<Self>()).collect()
    }
}

/// Strings grouped by owner, in the order their entries appear in the table.
///
/// Lookups downstream are positional, `names(i)[0]` is the canonical name of owner `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTable {
    owners: Vec<Vec<String>>,
}

impl StringTable {
    pub fn decode(blob: &[u8], entries: &[StringTableEntry], owner_count: usize) -> Result<Self> {
        let mut owners = vec![Vec::new(); owner_count];

        for (i, entry) in entries.iter().enumerate() {
            let (offset, owner) = (entry.offset, entry.owner);

            let Some(strings) = owners.get_mut(owner as usize) else {
                return Err(JupexError::InvalidStringOwner {
                    entry: i,
                    owner,
                    owners: owner_count,
                });
            };

            let offset = offset as usize;
            let terminated = blob.get(offset..).is_some_and(|tail| tail.contains(&0));
            if !terminated {
                return Err(JupexError::InvalidStringEntry {
                    entry: i,
                    offset,
                    available: blob.len(),
                });
            }

            strings.push(cstring_at(blob, offset, "string table")?);
        }

        Ok(Self { owners })
    }

    pub fn names(&self, owner: usize) -> &[String] {
        self.owners.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn into_owners(self) -> Vec<Vec<String>> {
        self.owners
    }
}

#[cfg(test)]
mod string_table_tests {
    use proptest::prelude::*;

    use super::*;

    fn entry(offset: u32, owner: u32) -> StringTableEntry {
        StringTableEntry { offset, owner }
    }

    #[test]
    fn groups_by_owner_in_table_order() {
        let blob = b"WorldModel0\0Door\0Door_Frame\0Lift\0";
        let entries = [entry(17, 1), entry(0, 0), entry(12, 1), entry(28, 2)];

        let table = StringTable::decode(blob, &entries, 3).unwrap();

        assert_eq!(table.names(0), ["WorldModel0"]);
        assert_eq!(table.names(1), ["Door_Frame", "Door"]);
        assert_eq!(table.names(2), ["Lift"]);
        assert!(table.names(3).is_empty());
    }

    #[test]
    fn owners_without_entries_stay_empty() {
        let table = StringTable::decode(b"", &[], 2).unwrap();
        assert_eq!(table.into_owners(), vec![Vec::<String>::new(); 2]);
    }

    #[test]
    fn rejects_offsets_past_the_blob() {
        let err = StringTable::decode(b"abc\0", &[entry(0, 0), entry(9, 0)], 1).unwrap_err();
        assert!(matches!(
            err,
            JupexError::InvalidStringEntry { entry: 1, offset: 9, available: 4 }
        ));
    }

    #[test]
    fn rejects_unterminated_strings() {
        let err = StringTable::decode(b"abc", &[entry(0, 0)], 1).unwrap_err();
        assert!(matches!(err, JupexError::InvalidStringEntry { entry: 0, offset: 0, .. }));

        // the terminator has to follow the entry's own offset
        let err = StringTable::decode(b"a\0bc", &[entry(0, 0), entry(2, 0)], 1).unwrap_err();
        assert!(matches!(err, JupexError::InvalidStringEntry { entry: 1, offset: 2, .. }));
    }

    #[test]
    fn rejects_unknown_owner() {
        let err = StringTable::decode(b"abc\0", &[entry(0, 4)], 1).unwrap_err();
        assert!(matches!(err, JupexError::InvalidStringOwner { owner: 4, .. }));
    }

    proptest! {
        #[test]
        fn decoded_strings_partition_the_blob(
            strings in prop::collection::vec(("[ -~]{0,12}", 0u32..4), 0..24)
        ) {
            let mut blob = Vec::new();
            let mut entries = Vec::new();
            for (s, owner) in &strings {
                entries.push(entry(blob.len() as u32, *owner));
                blob.extend_from_slice(s.as_bytes());
                blob.push(0);
            }

            let table = StringTable::decode(&blob, &entries, 4).unwrap();

            let decoded: Vec<&String> = (0..4).flat_map(|o| table.names(o)).collect();
            let total: usize = decoded.iter().map(|s| s.len()).sum();
            prop_assert!(total <= blob.len());
            prop_assert!(decoded.iter().all(|s| !s.contains('\0')));

            for owner in 0..4u32 {
                let expected: Vec<&str> = strings
                    .iter()
                    .filter(|(_, o)| *o == owner)
                    .map(|(s, _)| s.as_str())
                    .collect();
                prop_assert_eq!(table.names(owner as usize), expected.as_slice());
            }
        }
    }
}
