//! Graph File Storage
//!
//! Saves and loads a whole [`Factory`]. File layout:
//! - String table (`STRTBL`, bucket counters, saved entries, `0`)
//! - Header records (counted, each size-prefixed)
//! - Nodes in id order: `(id u32, kind u16, body)`
//! - Terminator `(0u32, 0u16)`
//!
//! The filter state lives in a separate `LIMFLT` file so the graph file
//! itself stays identical whether or not nodes are filtered.
//!
//! @module lim/storage

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info};

use super::edges;
use super::factory::Factory;
use super::header::{Header, PROP_FILTERED};
use super::io::{BinaryReader, BinaryWriter};
use super::persist::{NodeReader, NodeWriter};
use super::strtable::{StrTable, StrType};
use super::types::{NodeId, ELIDED_ID};
use crate::core::error::{Error, Result};

/// Tag of the filter state file
pub const FILTER_TAG: &[u8; 6] = b"LIMFLT";

// =============================================================================
// SAVE
// =============================================================================

/// Save every node of `factory` to `path`
pub fn save(factory: &mut Factory, header: &Header, path: impl AsRef<Path>) -> Result<()> {
    save_to_path(factory, header, path.as_ref(), false)
}

/// Save only unfiltered nodes; references to filtered nodes become `1`
pub fn save_filtered(factory: &mut Factory, header: &Header, path: impl AsRef<Path>) -> Result<()> {
    save_to_path(factory, header, path.as_ref(), true)
}

fn save_to_path(factory: &mut Factory, header: &Header, path: &Path, elide: bool) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::with_capacity(64 * 1024, file);
    let mut w = BinaryWriter::new(writer);
    let nodes = write_graph(factory, header, &mut w, elide)?;
    w.flush()?;
    info!(path = %path.display(), nodes, filtered = elide, "Saved graph");
    Ok(())
}

/// Encode the graph into any seekable sink, returning the node count
pub fn write_graph<W: Write + Seek>(
    factory: &mut Factory,
    header: &Header,
    w: &mut BinaryWriter<W>,
    elide: bool,
) -> Result<usize> {
    mark_strings(factory, elide);
    factory.strings().save(w)?;

    let mut header = header.clone();
    header.properties.add_bool(PROP_FILTERED, elide);
    header.save(w)?;

    let factory: &Factory = factory;
    let mut nodes = NodeWriter::new(w, factory, elide);
    let mut count = 0;
    for node in factory.iter() {
        if elide && factory.is_filtered(node.id()) {
            continue;
        }
        nodes.write_node(node)?;
        count += 1;
    }
    nodes.write_terminator()?;
    Ok(count)
}

/// Mark exactly the strings referenced by the nodes about to be written
fn mark_strings(factory: &mut Factory, elide: bool) {
    let keys: Vec<_> = factory
        .iter()
        .filter(|node| !(elide && factory.is_filtered(node.id())))
        .flat_map(|node| node.string_keys())
        .collect();

    let strings = factory.strings_mut();
    strings.clear_save_marks();
    for key in keys {
        strings.set_type(key, StrType::ToSave);
    }
}

// =============================================================================
// LOAD
// =============================================================================

/// Load a graph file through a memory map
pub fn load(path: impl AsRef<Path>) -> Result<(Factory, Header)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    // Safety: the map is read-only and dropped before this function returns
    let mmap = unsafe { Mmap::map(&file)? };
    let mut r = BinaryReader::new(Cursor::new(&mmap[..]));
    let loaded = read_graph(&mut r)?;
    info!(path = %path.display(), nodes = loaded.0.len(), "Loaded graph");
    Ok(loaded)
}

/// Load a graph file through a buffered reader (no mmap)
pub fn load_streaming(path: impl AsRef<Path>) -> Result<(Factory, Header)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(64 * 1024, file);
    let mut r = BinaryReader::new(reader);
    let loaded = read_graph(&mut r)?;
    info!(path = %path.display(), nodes = loaded.0.len(), "Loaded graph");
    Ok(loaded)
}

/// Decode a graph from any seekable source
pub fn read_graph<R: Read + Seek>(r: &mut BinaryReader<R>) -> Result<(Factory, Header)> {
    let mut strings = StrTable::new();
    strings.load(r)?;
    let header = Header::load(r)?;
    let elided = header.properties.get_bool(PROP_FILTERED).unwrap_or(false);

    let mut factory = Factory::empty(strings);
    let mut nodes = NodeReader::new(r);
    while let Some(node) = nodes.read_next()? {
        factory.insert_loaded(node)?;
    }

    validate_references(&factory, elided)?;
    factory.restore_parents();
    factory.rebuild_caches();
    debug!(nodes = factory.len(), elided, "Decoded graph");
    Ok((factory, header))
}

/// Every stored reference must name an existing node of the right kind
fn validate_references(factory: &Factory, allow_elided: bool) -> Result<()> {
    for node in factory.iter() {
        for (edge, target) in edges::outgoing(node) {
            if target == ELIDED_ID && allow_elided {
                continue;
            }
            let target_node = factory.get(target).map_err(|_| {
                Error::schema(
                    "storage::load",
                    node.id(),
                    target,
                    format!("Dangling {} reference", edge),
                )
            })?;
            if !target_node.is_a(edge.target_kind()) {
                return Err(Error::schema(
                    "storage::load",
                    node.id(),
                    target,
                    format!("{} points at a {}", edge, target_node.kind()),
                ));
            }
        }
    }
    Ok(())
}

// =============================================================================
// FILTER STATE
// =============================================================================

/// Write one byte per id (1 = filtered)
pub fn save_filter(factory: &Factory, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);

    let count = factory.next_id();
    writer.write_all(FILTER_TAG)?;
    writer.write_all(&count.to_le_bytes())?;
    let bits: Vec<u8> = (0..count).map(|id| factory.is_filtered(id) as u8).collect();
    writer.write_all(&bits)?;
    writer.flush()?;

    debug!(path = %path.display(), nodes = count, "Saved filter state");
    Ok(())
}

/// Restore filter bits written by [`save_filter`]
pub fn load_filter(factory: &mut Factory, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut r = BinaryReader::new(BufReader::with_capacity(64 * 1024, file));

    r.expect_tag(FILTER_TAG)?;
    let count: NodeId = r.read_u32()?;
    if count > factory.next_id() {
        return Err(Error::format(format!(
            "Filter state covers {} ids but the graph has {}",
            count,
            factory.next_id()
        )));
    }

    let bits = r.read_bytes(count as usize)?;
    let mut filtered = 0usize;
    for (id, &bit) in bits.iter().enumerate() {
        let id = id as NodeId;
        if !factory.exists(id) {
            continue;
        }
        factory.set_filter_bit(id, bit != 0)?;
        filtered += (bit != 0) as usize;
    }

    debug!(path = %path.display(), filtered, "Loaded filter state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lim::edges::Assoc;
    use crate::lim::header::PROP_BINARY_VERSION;
    use crate::lim::types::*;
    use tempfile::tempdir;

    fn sample() -> (Factory, NodeId, NodeId, NodeId) {
        let mut f = Factory::new();
        let class = f.create(NodeKind::Class).unwrap();
        f.set_name(class, "Widget").unwrap();
        let external = f.create(NodeKind::Class).unwrap();
        f.set_name(external, "System.Object").unwrap();
        let method = f.create(NodeKind::Method).unwrap();
        f.set_name(method, "Draw").unwrap();
        let param = f.create(NodeKind::Parameter).unwrap();
        f.set_name(param, "scale").unwrap();

        f.add_edge(ROOT_PACKAGE_ID, EdgeKind::Scope_HasMember, class).unwrap();
        f.add_edge(class, EdgeKind::Scope_HasMember, method).unwrap();
        f.add_edge(method, EdgeKind::Method_HasParameter, param).unwrap();

        let tf = f.create_type_former_type(external).unwrap();
        f.begin_type();
        f.add_type_former(tf).unwrap();
        let object_type = f.end_type().unwrap();
        f.add_edge(class, EdgeKind::Class_IsSubclass, object_type).unwrap();

        let int = f.create_simple_type(SimpleTypeKind::Integer).unwrap();
        let int_tf = f.create_type_former_type(int).unwrap();
        f.begin_type();
        f.add_type_former(int_tf).unwrap();
        let int_type = f.end_type().unwrap();
        f.add_edge(param, EdgeKind::Parameter_HasType, int_type).unwrap();

        let file = f.create_file("src/widget.cs").unwrap();
        f.add_assoc_edge(
            class,
            EdgeKind::Member_IsContainedIn,
            file,
            Assoc::Position(SourcePosition {
                line: 1,
                column: 1,
                end_line: 20,
                end_column: 2,
                realization_level: RealizationLevel::Defines,
            }),
        )
        .unwrap();
        f.set_filtered(external).unwrap();
        (f, class, external, param)
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.lim");
        let (mut f, class, external, param) = sample();
        let header = Header::new(LanguageKind::Csharp);

        save(&mut f, &header, &path).unwrap();
        let (loaded, loaded_header) = load(&path).unwrap();

        assert_eq!(loaded.len(), f.len());
        for node in f.iter() {
            assert_eq!(loaded.get(node.id()).unwrap(), node, "node {}", node.id());
        }
        assert_eq!(loaded.name(class), "Widget");
        assert_eq!(loaded.name(external), "System.Object");
        assert_eq!(loaded.get(param).unwrap().base().parent, f.get(param).unwrap().base().parent);
        assert_eq!(loaded_header.properties.get_bool(PROP_FILTERED), Some(false));
        // filter bits are not part of the graph file
        assert!(!loaded.is_filtered(external));
    }

    #[test]
    fn test_streaming_load_matches_mmap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.lim");
        let (mut f, _, _, _) = sample();
        save(&mut f, &Header::new(LanguageKind::Csharp), &path).unwrap();

        let (a, _) = load(&path).unwrap();
        let (b, _) = load_streaming(&path).unwrap();
        assert_eq!(a.len(), b.len());
        for node in a.iter() {
            assert_eq!(b.get(node.id()).unwrap(), node);
        }
    }

    #[test]
    fn test_loaded_caches_are_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.lim");
        let (mut f, _, _, _) = sample();
        let int = f.create_simple_type(SimpleTypeKind::Integer).unwrap();
        save(&mut f, &Header::new(LanguageKind::Csharp), &path).unwrap();

        let (mut loaded, _) = load(&path).unwrap();
        let before = loaded.next_id();
        assert_eq!(loaded.create_simple_type(SimpleTypeKind::Integer).unwrap(), int);
        assert_eq!(loaded.create_file("src/widget.cs").unwrap(), f.create_file("src/widget.cs").unwrap());
        assert_eq!(loaded.next_id(), before);
    }

    #[test]
    fn test_filter_state_restores_bits() {
        let dir = tempdir().unwrap();
        let graph = dir.path().join("graph.lim");
        let state = dir.path().join("graph.flim");
        let (mut f, class, external, _) = sample();

        save(&mut f, &Header::new(LanguageKind::Csharp), &graph).unwrap();
        save_filter(&f, &state).unwrap();

        let (mut loaded, _) = load(&graph).unwrap();
        load_filter(&mut loaded, &state).unwrap();
        assert!(loaded.is_filtered(external));
        assert!(!loaded.is_filtered(class));
    }

    #[test]
    fn test_filter_state_larger_than_graph_fails() {
        let dir = tempdir().unwrap();
        let state = dir.path().join("big.flim");
        let (f, _, _, _) = sample();
        save_filter(&f, &state).unwrap();

        let mut small = Factory::new();
        assert!(matches!(load_filter(&mut small, &state), Err(Error::Format { .. })));
    }

    #[test]
    fn test_filtered_companion_elides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph-filtered.lim");
        let (mut f, class, external, _) = sample();

        save_filtered(&mut f, &Header::new(LanguageKind::Csharp), &path).unwrap();
        let (loaded, header) = load(&path).unwrap();

        assert_eq!(header.properties.get_bool(PROP_FILTERED), Some(true));
        assert!(!loaded.exists(external));
        assert!(loaded.exists(class));
        assert_eq!(loaded.next_id(), f.next_id());
        assert!(loaded.strings().find("System.Object").is_none());

        let object_type = loaded.targets(class, EdgeKind::Class_IsSubclass).unwrap()[0];
        let tf = loaded.targets(object_type, EdgeKind::Type_HasTypeFormer).unwrap()[0];
        assert_eq!(loaded.target(tf, EdgeKind::TypeFormerType_RefersTo).unwrap(), ELIDED_ID);
    }

    #[test]
    fn test_wrong_binary_version_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.lim");
        let (mut f, _, _, _) = sample();
        let mut header = Header::new(LanguageKind::Csharp);
        header.properties.add(PROP_BINARY_VERSION, "99");
        save(&mut f, &header, &path).unwrap();

        assert!(matches!(load(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn test_truncated_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.lim");
        let (mut f, _, _, _) = sample();
        save(&mut f, &Header::new(LanguageKind::Csharp), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
        assert!(matches!(load(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let mut f = Factory::new();
        let class = f.create(NodeKind::Class).unwrap();
        f.add_edge(ROOT_PACKAGE_ID, EdgeKind::Scope_HasMember, class).unwrap();

        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        f.strings().save(&mut w).unwrap();
        Header::new(LanguageKind::Csharp).save(&mut w).unwrap();
        // root package only; its HasMember target is never written
        NodeWriter::new(&mut w, &f, false)
            .write_node(f.get(ROOT_PACKAGE_ID).unwrap())
            .unwrap();
        NodeWriter::new(&mut w, &f, false).write_terminator().unwrap();

        let bytes = w.into_inner().into_inner();
        let result = read_graph(&mut BinaryReader::new(Cursor::new(bytes)));
        assert!(matches!(result, Err(Error::SchemaViolation { target, .. }) if target == class));
    }
}
