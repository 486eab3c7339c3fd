//! Graph File Header
//!
//! A counted list of typed, size-prefixed records written between the
//! string table and the nodes. Readers skip record kinds they do not know.
//!
//! @module lim/header

use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};

use tracing::debug;

use super::io::{BinaryReader, BinaryWriter};
use super::types::{LanguageKind, NodeId};
use crate::core::error::{Error, Result};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Value of the `Type` property
pub const GRAPH_TYPE: &str = "LanguageIndependentModel";

/// Version of the node API the graph was written against
pub const API_VERSION: &str = "1.0";

/// Version of the binary layout
pub const BINARY_VERSION: &str = "1.0";

pub const PROP_TYPE: &str = "Type";
pub const PROP_API_VERSION: &str = "APIVersion";
pub const PROP_BINARY_VERSION: &str = "BinaryVersion";
pub const PROP_LANGUAGE: &str = "Language";
pub const PROP_CONFIGURATION: &str = "Configuration";
pub const PROP_PLATFORM: &str = "Platform";
pub const PROP_FILTERED: &str = "Filtered";

/// Record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum HeaderKind {
    PropertyData = 0,
    LimOrigin = 1,
    OverrideRelations = 2,
}

impl HeaderKind {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(HeaderKind::PropertyData),
            1 => Some(HeaderKind::LimOrigin),
            2 => Some(HeaderKind::OverrideRelations),
            _ => None,
        }
    }
}

// =============================================================================
// PROPERTY DATA
// =============================================================================

/// String to string property bag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyData {
    values: BTreeMap<String, String>,
}

impl PropertyData {
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn add_bool(&mut self, key: &str, value: bool) {
        self.add(key, if value { "1" } else { "0" });
    }

    pub fn add_int(&mut self, key: &str, value: i64) {
        self.add(key, value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check that `key` is present and equal to `expected`
    fn require(&self, key: &str, expected: &str) -> Result<()> {
        match self.get(key) {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(Error::format(format!(
                "Wrong {} property: found '{}', expected '{}'",
                key, found, expected
            ))),
            None => Err(Error::format(format!("Missing {} property", key))),
        }
    }

    fn save<W: Write + Seek>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_u32(self.values.len() as u32)?;
        for (key, value) in &self.values {
            w.write_short_str(key)?;
            w.write_long_str(value)?;
        }
        Ok(())
    }

    fn load<R: Read + Seek>(r: &mut BinaryReader<R>) -> Result<Self> {
        let count = r.read_u32()?;
        let mut values = BTreeMap::new();
        for _ in 0..count {
            let key = r.read_short_str()?;
            let value = r.read_long_str()?;
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

// =============================================================================
// ORIGIN AND OVERRIDE TABLES
// =============================================================================

/// Per component: front-end symbol handle to the node built for it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimOrigin {
    components: BTreeMap<NodeId, BTreeMap<u32, NodeId>>,
}

impl LimOrigin {
    pub fn add(&mut self, component: NodeId, symbol: u32, node: NodeId) {
        self.components
            .entry(component)
            .or_default()
            .insert(symbol, node);
    }

    pub fn get(&self, component: NodeId, symbol: u32) -> Option<NodeId> {
        self.components.get(&component)?.get(&symbol).copied()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn len(&self) -> usize {
        self.components.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save<W: Write + Seek>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_u32(self.components.len() as u32)?;
        for (&component, entries) in &self.components {
            w.write_u32(component)?;
            w.write_u32(entries.len() as u32)?;
            for (&symbol, &node) in entries {
                w.write_u32(symbol)?;
                w.write_u32(node)?;
            }
        }
        Ok(())
    }

    fn load<R: Read + Seek>(r: &mut BinaryReader<R>) -> Result<Self> {
        let mut origin = Self::default();
        let components = r.read_u32()?;
        for _ in 0..components {
            let component = r.read_u32()?;
            let count = r.read_u32()?;
            let entries = origin.components.entry(component).or_default();
            for _ in 0..count {
                let symbol = r.read_u32()?;
                let node = r.read_u32()?;
                entries.insert(symbol, node);
            }
        }
        Ok(origin)
    }
}

/// `(method, overridden method)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideRelations {
    pairs: Vec<(NodeId, NodeId)>,
}

impl OverrideRelations {
    pub fn add(&mut self, method: NodeId, overridden: NodeId) {
        if !self.pairs.contains(&(method, overridden)) {
            self.pairs.push((method, overridden));
        }
    }

    pub fn pairs(&self) -> &[(NodeId, NodeId)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn save<W: Write + Seek>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_u32(self.pairs.len() as u32)?;
        for &(method, overridden) in &self.pairs {
            w.write_u32(method)?;
            w.write_u32(overridden)?;
        }
        Ok(())
    }

    fn load<R: Read + Seek>(r: &mut BinaryReader<R>) -> Result<Self> {
        let count = r.read_u32()?;
        let mut pairs = Vec::with_capacity(count.min(1 << 16) as usize);
        for _ in 0..count {
            pairs.push((r.read_u32()?, r.read_u32()?));
        }
        Ok(Self { pairs })
    }
}

// =============================================================================
// HEADER
// =============================================================================

/// All header records of a graph file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub properties: PropertyData,
    pub origin: LimOrigin,
    pub overrides: OverrideRelations,
}

impl Header {
    /// Header with the mandatory properties for `language`
    pub fn new(language: LanguageKind) -> Self {
        let mut properties = PropertyData::default();
        properties.add(PROP_TYPE, GRAPH_TYPE);
        properties.add(PROP_API_VERSION, API_VERSION);
        properties.add(PROP_BINARY_VERSION, BINARY_VERSION);
        properties.add(PROP_LANGUAGE, language.as_str());
        Self {
            properties,
            ..Default::default()
        }
    }

    /// Fail unless the mandatory properties match this build
    pub fn validate(&self) -> Result<()> {
        self.properties.require(PROP_TYPE, GRAPH_TYPE)?;
        self.properties.require(PROP_API_VERSION, API_VERSION)?;
        self.properties.require(PROP_BINARY_VERSION, BINARY_VERSION)?;
        if self.properties.get(PROP_LANGUAGE).is_none() {
            return Err(Error::format(format!("Missing {} property", PROP_LANGUAGE)));
        }
        Ok(())
    }

    pub fn save<W: Write + Seek>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_u32(3)?;

        w.write_u16(HeaderKind::PropertyData as u16)?;
        let start = w.start_block()?;
        self.properties.save(w)?;
        w.end_block(start)?;

        w.write_u16(HeaderKind::LimOrigin as u16)?;
        let start = w.start_block()?;
        self.origin.save(w)?;
        w.end_block(start)?;

        w.write_u16(HeaderKind::OverrideRelations as u16)?;
        let start = w.start_block()?;
        self.overrides.save(w)?;
        w.end_block(start)?;
        Ok(())
    }

    /// Read and validate the header records
    pub fn load<R: Read + Seek>(r: &mut BinaryReader<R>) -> Result<Self> {
        let mut header = Header::default();
        let count = r.read_u32()?;
        for _ in 0..count {
            let raw_kind = r.read_u16()?;
            let Some(kind) = HeaderKind::from_u16(raw_kind) else {
                debug!(kind = raw_kind, "Skipping unknown header record");
                r.skip_block()?;
                continue;
            };

            let end = r.enter_block()?;
            match kind {
                HeaderKind::PropertyData => header.properties = PropertyData::load(r)?,
                HeaderKind::LimOrigin => header.origin = LimOrigin::load(r)?,
                HeaderKind::OverrideRelations => header.overrides = OverrideRelations::load(r)?,
            }
            if r.position()? > end {
                return Err(Error::format(format!(
                    "Header record {:?} overruns its block",
                    kind
                )));
            }
            r.seek_to(end)?;
        }

        header.validate()?;
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(header: &Header) -> Result<Header> {
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        header.save(&mut w)?;
        let bytes = w.into_inner().into_inner();
        Header::load(&mut BinaryReader::new(Cursor::new(bytes)))
    }

    #[test]
    fn test_property_accessors() {
        let mut props = PropertyData::default();
        props.add_bool("flag", true);
        props.add_int("count", -12);
        assert_eq!(props.get("flag"), Some("1"));
        assert_eq!(props.get_bool("flag"), Some(true));
        assert_eq!(props.get_int("count"), Some(-12));
        assert_eq!(props.get_bool("count"), None);
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_header_roundtrip() {
        let mut header = Header::new(LanguageKind::Csharp);
        header.properties.add(PROP_CONFIGURATION, "Debug");
        header.origin.add(102, 7, 150);
        header.origin.add(102, 8, 151);
        header.overrides.add(160, 140);
        header.overrides.add(160, 140);

        let loaded = roundtrip(&header).unwrap();
        assert_eq!(loaded, header);
        assert_eq!(loaded.origin.get(102, 8), Some(151));
        assert_eq!(loaded.overrides.len(), 1);
        assert_eq!(loaded.properties.get(PROP_LANGUAGE), Some("lnkCsharp"));
    }

    #[test]
    fn test_wrong_type_fails() {
        let mut header = Header::new(LanguageKind::Csharp);
        header.properties.add(PROP_TYPE, "SomethingElse");
        assert!(matches!(roundtrip(&header), Err(Error::Format { .. })));
    }

    #[test]
    fn test_wrong_binary_version_fails() {
        let mut header = Header::new(LanguageKind::Csharp);
        header.properties.add(PROP_BINARY_VERSION, "0.9");
        assert!(matches!(roundtrip(&header), Err(Error::Format { .. })));
    }

    #[test]
    fn test_unknown_record_is_skipped() {
        let header = Header::new(LanguageKind::Java);
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        w.write_u32(2).unwrap();
        w.write_u16(77).unwrap();
        let start = w.start_block().unwrap();
        w.write_long_str("opaque payload").unwrap();
        w.end_block(start).unwrap();
        w.write_u16(HeaderKind::PropertyData as u16).unwrap();
        let start = w.start_block().unwrap();
        header.properties.save(&mut w).unwrap();
        w.end_block(start).unwrap();
        w.write_u32(0xDEAD_BEEF).unwrap();

        let bytes = w.into_inner().into_inner();
        let mut r = BinaryReader::new(Cursor::new(bytes));
        let loaded = Header::load(&mut r).unwrap();
        assert_eq!(loaded.properties, header.properties);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
    }
}
