use crate::err::Result;

use std::cmp;

/// Capacity of a table after its first growth.
pub const MIN_TABLE_CAPACITY: usize = 4;

/// A single `from -> to` remap rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    pub from: u16,
    pub to: u16,
}

/// What [`MappingTable::insert`] did with the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was placed at `index`.
    Inserted { index: usize },
    /// An entry for the same `from` existed and its target was replaced.
    Overwritten { index: usize, previous: u16 },
}

/// Remap rules of a single event type, kept sorted by `from`.
///
/// Entries are unique by `from`, so lookups are a binary search. Growth doubles the
/// capacity (starting at [`MIN_TABLE_CAPACITY`]) and is fallible: if the allocator refuses,
/// the table is left exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<Entry>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable::default()
    }

    /// Inserts `from -> to`, replacing the target of an existing `from`.
    pub fn insert(&mut self, from: u16, to: u16) -> Result<Insertion> {
        self.reserve_for_insert()?;

        match self.entries.binary_search_by_key(&from, |entry| entry.from) {
            Ok(index) => {
                let entry = &mut self.entries[index];
                let previous = entry.to;
                entry.to = to;

                Ok(Insertion::Overwritten { index, previous })
            }
            Err(index) => {
                // Capacity was reserved above, this only shifts the tail.
                self.entries.insert(index, Entry { from, to });

                Ok(Insertion::Inserted { index })
            }
        }
    }

    pub fn lookup(&self, from: u16) -> Option<u16> {
        if self.entries.is_empty() {
            return None;
        }

        self.entries
            .binary_search_by_key(&from, |entry| entry.from)
            .ok()
            .map(|index| self.entries[index].to)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// All entries, ascending by `from`.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn reserve_for_insert(&mut self) -> Result<()> {
        let capacity = self.entries.capacity();

        if self.entries.len() < capacity {
            return Ok(());
        }

        let new_capacity = cmp::max(capacity * 2, MIN_TABLE_CAPACITY);
        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())?;

        Ok(())
    }
}
