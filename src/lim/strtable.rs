//! String Interning Table
//!
//! Maps strings to 32-bit keys of the form `(hash << 16) | ordinal`. The
//! 16-bit hash is a two-lane Pearson hash over the UTF-8 bytes; the
//! ordinal comes from a per-bucket counter, so equal strings always get
//! the same key within one table and keys never move once handed out.
//!
//! Each entry carries a [`StrType`] that decides whether it is persisted.
//!
//! @module lim/strtable

use std::collections::HashMap;
use std::io::{Read, Seek, Write};

use compact_str::CompactString;
use tracing::{debug, error};

use super::io::{BinaryReader, BinaryWriter};
use super::types::Key;
use crate::core::config::DEFAULT_STRING_BUCKETS;
use crate::core::error::{Error, Result};

/// Section tag preceding a saved table
pub const STRTABLE_TAG: &[u8; 6] = b"STRTBL";

/// Pearson permutation table
const RANDOM_NUMBERS: [u8; 256] = [
    1, 14, 110, 25, 97, 174, 132, 119, 138, 170, 125, 118, 27, 233, 140, 51, 87, 197, 177, 107,
    234, 169, 56, 68, 30, 7, 173, 73, 188, 40, 36, 65, 49, 213, 104, 190, 57, 211, 148, 223, 48,
    115, 15, 2, 67, 186, 210, 28, 12, 181, 103, 70, 22, 58, 75, 78, 183, 167, 238, 157, 124, 147,
    172, 144, 176, 161, 141, 86, 60, 66, 128, 83, 156, 241, 79, 46, 168, 198, 41, 254, 178, 85,
    253, 237, 250, 154, 133, 88, 35, 206, 95, 116, 252, 192, 54, 221, 102, 218, 255, 240, 82, 106,
    158, 201, 61, 3, 89, 9, 42, 155, 159, 93, 166, 80, 50, 34, 175, 195, 100, 99, 26, 150, 16,
    145, 4, 33, 8, 189, 121, 64, 77, 72, 208, 245, 130, 122, 143, 55, 105, 134, 29, 164, 185, 194,
    193, 239, 101, 242, 5, 171, 126, 11, 74, 59, 137, 228, 108, 191, 232, 139, 6, 24, 81, 20, 127,
    17, 91, 92, 251, 151, 225, 207, 21, 98, 113, 112, 84, 226, 18, 214, 199, 187, 13, 32, 94, 220,
    224, 212, 247, 204, 196, 43, 249, 236, 45, 244, 111, 182, 153, 136, 129, 90, 217, 202, 19, 165,
    231, 71, 230, 142, 96, 227, 62, 179, 246, 114, 162, 53, 160, 215, 205, 180, 47, 109, 44, 38,
    31, 149, 135, 0, 216, 52, 63, 23, 37, 69, 39, 117, 146, 184, 163, 200, 222, 235, 248, 243,
    219, 10, 152, 131, 123, 229, 203, 76, 120, 209,
];

/// Persistence class of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrType {
    /// Kept in memory, saved only once marked
    #[default]
    Default,
    /// Never saved
    Tmp,
    /// Saved with the next table save
    ToSave,
}

#[derive(Debug, Clone)]
struct Entry {
    text: CompactString,
    ty: StrType,
}

/// 16-bit Pearson hash of a string
pub fn hash(s: &str) -> u16 {
    let bytes = s.as_bytes();
    let Some((&first, rest)) = bytes.split_first() else {
        return 0;
    };

    let mut high: u8 = 0;
    for &b in bytes {
        high = RANDOM_NUMBERS[(high ^ b) as usize];
    }

    let mut low: u8 = RANDOM_NUMBERS[first.wrapping_add(1) as usize];
    for &b in rest {
        low = RANDOM_NUMBERS[(low ^ b) as usize];
    }

    ((high as u16) << 8) | low as u16
}

/// Interned string storage keyed by hash and ordinal
#[derive(Debug, Clone)]
pub struct StrTable {
    /// Next ordinal per bucket
    counters: Vec<u16>,
    /// Key -> entry
    entries: HashMap<Key, Entry>,
    /// String -> key, for O(1) interning
    lookup: HashMap<CompactString, Key>,
}

impl Default for StrTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StrTable {
    /// Create a table with the default bucket count
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_STRING_BUCKETS)
    }

    /// Create a table with `buckets` hash buckets (at least one)
    pub fn with_buckets(buckets: u32) -> Self {
        Self {
            counters: vec![1; buckets.max(1) as usize],
            entries: HashMap::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn bucket_count(&self) -> u32 {
        self.counters.len() as u32
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Intern `s` with [`StrType::Default`]
    pub fn set(&mut self, s: &str) -> Key {
        self.set_with_type(s, StrType::Default)
    }

    /// Intern `s`; an existing entry keeps its key and adopts `ty`
    /// unless it is already marked for saving
    pub fn set_with_type(&mut self, s: &str, ty: StrType) -> Key {
        if s.is_empty() {
            return 0;
        }
        if let Some(&key) = self.lookup.get(s) {
            if let Some(entry) = self.entries.get_mut(&key) {
                if entry.ty != StrType::ToSave {
                    entry.ty = ty;
                }
            }
            return key;
        }

        let key = self.next_key(hash(s));
        let text = CompactString::new(s);
        self.lookup.insert(text.clone(), key);
        self.entries.insert(key, Entry { text, ty });
        key
    }

    fn next_key(&mut self, hash: u16) -> Key {
        let bucket = hash as usize % self.counters.len();
        let high = (hash as Key) << 16;

        for _ in 0..=u16::MAX as u32 {
            let ordinal = self.counters[bucket];
            if ordinal == u16::MAX {
                error!("Bucket ({}) is full!", bucket);
            }
            self.counters[bucket] = match ordinal.wrapping_add(1) {
                0 => 1,
                next => next,
            };
            if ordinal == 0 {
                continue;
            }
            let key = high | ordinal as Key;
            if !self.entries.contains_key(&key) {
                return key;
            }
        }

        // Every ordinal of this hash is taken; the newest string shadows key 1
        error!("Bucket ({}) is full!", bucket);
        high | 1
    }

    /// String for `key`, or `""` when unknown
    pub fn get(&self, key: Key) -> &str {
        self.entries
            .get(&key)
            .map(|entry| entry.text.as_str())
            .unwrap_or("")
    }

    /// Key of an already interned string
    pub fn find(&self, s: &str) -> Option<Key> {
        if s.is_empty() {
            return Some(0);
        }
        self.lookup.get(s).copied()
    }

    pub fn contains_key(&self, key: Key) -> bool {
        key == 0 || self.entries.contains_key(&key)
    }

    pub fn str_type(&self, key: Key) -> Option<StrType> {
        self.entries.get(&key).map(|entry| entry.ty)
    }

    /// Change the persistence class of an existing key
    pub fn set_type(&mut self, key: Key, ty: StrType) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.ty = ty;
        }
    }

    /// Change the persistence class of an existing string
    pub fn set_type_of(&mut self, s: &str, ty: StrType) {
        if let Some(key) = self.find(s) {
            self.set_type(key, ty);
        }
    }

    /// Reset every `ToSave` mark back to `Default`
    pub fn clear_save_marks(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.ty == StrType::ToSave {
                entry.ty = StrType::Default;
            }
        }
    }

    /// Drop every temporary entry
    pub fn remove_tmp(&mut self) {
        let tmp: Vec<Key> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.ty == StrType::Tmp)
            .map(|(&key, _)| key)
            .collect();
        for key in tmp {
            if let Some(entry) = self.entries.remove(&key) {
                self.lookup.remove(&entry.text);
            }
        }
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Write the `ToSave` entries
    pub fn save<W: Write + Seek>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_tag(STRTABLE_TAG)?;
        w.write_u32(self.bucket_count())?;
        for &counter in &self.counters {
            w.write_u16(counter)?;
        }

        let mut keys: Vec<Key> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.ty == StrType::ToSave)
            .map(|(&key, _)| key)
            .collect();
        keys.sort_unstable();

        for &key in &keys {
            let text = self.get(key);
            w.write_u32(key)?;
            w.write_u32(text.len() as u32)?;
            w.write_tag(text.as_bytes())?;
        }
        w.write_u32(0)?;

        debug!(strings = keys.len(), "Saved string table");
        Ok(())
    }

    /// Replace the table contents with a saved table
    pub fn load<R: Read + Seek>(&mut self, r: &mut BinaryReader<R>) -> Result<()> {
        r.expect_tag(STRTABLE_TAG)?;
        let buckets = r.read_u32()?;
        if buckets == 0 || buckets > u16::MAX as u32 {
            return Err(Error::format(format!(
                "Invalid string table bucket count {}",
                buckets
            )));
        }

        let mut counters = Vec::with_capacity(buckets as usize);
        for _ in 0..buckets {
            counters.push(r.read_u16()?);
        }

        let mut entries = HashMap::new();
        let mut lookup = HashMap::new();
        loop {
            let key = r.read_u32()?;
            if key == 0 {
                break;
            }
            let len = r.read_u32()? as usize;
            let bytes = r.read_bytes(len)?;
            let text = String::from_utf8(bytes).map_err(|e| {
                Error::format(format!("Invalid UTF-8 in string {:#x}: {}", key, e))
            })?;
            let text = CompactString::from(text);
            lookup.insert(text.clone(), key);
            entries.insert(
                key,
                Entry {
                    text,
                    ty: StrType::Default,
                },
            );
        }

        debug!(strings = entries.len(), buckets, "Loaded string table");
        self.counters = counters;
        self.entries = entries;
        self.lookup = lookup;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_set_is_stable() {
        let mut table = StrTable::new();
        let a = table.set("System.Collections.Generic");
        let b = table.set("System.Collections.Generic");
        assert_eq!(a, b);
        assert_eq!(table.get(a), "System.Collections.Generic");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_string_is_key_zero() {
        let mut table = StrTable::new();
        assert_eq!(table.set(""), 0);
        assert_eq!(table.get(0), "");
        assert!(table.is_empty());
    }

    #[test]
    fn test_key_layout() {
        let mut table = StrTable::new();
        let key = table.set("Foo");
        assert_eq!(key >> 16, hash("Foo") as u32);
        assert_eq!(key & 0xFFFF, 1);
    }

    #[test]
    fn test_hash_depends_on_all_bytes() {
        assert_ne!(hash("ab"), hash("ba"));
        assert_ne!(hash("a"), hash("b"));
        assert_eq!(hash(""), 0);
    }

    #[test]
    fn test_shared_bucket_gets_distinct_ordinals() {
        let mut table = StrTable::with_buckets(1);
        let a = table.set("alpha");
        let b = table.set("beta");
        assert_ne!(a, b);
        assert_eq!(a & 0xFFFF, 1);
        assert_eq!(b & 0xFFFF, 2);
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let table = StrTable::new();
        assert_eq!(table.get(0xDEAD_0001), "");
    }

    #[test]
    fn test_save_only_marked_entries() {
        let mut table = StrTable::new();
        let kept = table.set("kept");
        let dropped = table.set("dropped");
        let tmp = table.set_with_type("scratch", StrType::Tmp);
        table.set_type(kept, StrType::ToSave);

        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        table.save(&mut w).unwrap();

        let mut loaded = StrTable::new();
        let mut r = BinaryReader::new(Cursor::new(w.into_inner().into_inner()));
        loaded.load(&mut r).unwrap();

        assert_eq!(loaded.get(kept), "kept");
        assert_eq!(loaded.get(dropped), "");
        assert_eq!(loaded.get(tmp), "");
        // counters survive, so new strings never reuse a saved key
        let fresh = loaded.set("dropped");
        assert_ne!(fresh, kept);
    }

    #[test]
    fn test_remove_tmp() {
        let mut table = StrTable::new();
        let key = table.set_with_type("temp", StrType::Tmp);
        table.remove_tmp();
        assert_eq!(table.get(key), "");
        assert_eq!(table.find("temp"), None);
    }
}
