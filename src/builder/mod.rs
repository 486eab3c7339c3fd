//! Graph Builder
//!
//! Turns front-end symbol information into LIM nodes:
//! - Converter: symbol to node identity, type expressions
//! - Generic cache: canonical class/method instantiations
//! - Filler: per-kind attributes and edges
//! - Collector: method body facts, component LOC
//!
//! Units are processed one after another into a single shared store.
//!
//! @module builder

pub mod collect;
pub mod context;
pub mod converter;
pub mod filler;
pub mod generics;

use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::filter::Filter;
use crate::frontend::{AnalysisUnit, SourceFile, SymbolData, SymbolRef, SymbolSource};
use crate::lim::{EdgeKind, Factory, Header, LanguageKind, NodeId, StrTable};

pub use context::{BuildContext, LocLedger};

/// Counters reported after a source has been processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub units: usize,
    pub files: usize,
    pub skipped_files: usize,
    pub declarations: usize,
    pub bodies: usize,
}

impl BuildStats {
    pub fn merge(&mut self, other: BuildStats) {
        self.units += other.units;
        self.files += other.files;
        self.skipped_files += other.skipped_files;
        self.declarations += other.declarations;
        self.bodies += other.bodies;
    }
}

// =============================================================================
// GRAPH BUILDER
// =============================================================================

/// Owns the graph while front-end sources are added to it
pub struct GraphBuilder {
    ctx: BuildContext,
}

impl GraphBuilder {
    pub fn new(language: LanguageKind, hard_filter: Filter, soft_filter: Filter) -> Self {
        Self {
            ctx: BuildContext::new(Factory::new(), language, hard_filter, soft_filter),
        }
    }

    /// Builder configured from the `[build]`, `[filter]` and `[strings]` sections
    pub fn from_config(config: &Config) -> Result<Self> {
        let language = config.build.language_kind()?;
        let hard = Filter::from_optional(config.filter.hard.as_deref())?;
        let soft = Filter::from_optional(config.filter.soft.as_deref())?;
        let factory = Factory::with_strings(StrTable::with_buckets(config.strings.buckets));

        let mut ctx = BuildContext::new(factory, language, hard, soft);
        if let Some(configuration) = &config.build.configuration {
            ctx.header
                .properties
                .add(crate::lim::header::PROP_CONFIGURATION, configuration.as_str());
        }
        if let Some(platform) = &config.build.platform {
            ctx.header
                .properties
                .add(crate::lim::header::PROP_PLATFORM, platform.as_str());
        }
        Ok(Self { ctx })
    }

    /// Build every unit of `source`
    pub fn add_source<S: SymbolSource + ?Sized>(&mut self, source: &S) -> Result<BuildStats> {
        self.ctx.reset_source();
        for unit in source.units() {
            for file in &unit.files {
                if let Some(lines) = file.line_count {
                    self.ctx.line_counts.insert(file.path.clone(), lines);
                }
            }
        }

        let mut stats = BuildStats::default();
        for unit in source.units() {
            let unit_stats = self.session(source).build_unit(unit)?;
            stats.merge(unit_stats);
        }
        info!(
            units = stats.units,
            files = stats.files,
            skipped = stats.skipped_files,
            declarations = stats.declarations,
            nodes = self.ctx.factory.len(),
            "Source added"
        );
        Ok(stats)
    }

    /// Direct access to the conversion operations for `source`
    pub fn session<'a, S: SymbolSource + ?Sized>(&'a mut self, source: &'a S) -> Session<'a, S> {
        Session {
            ctx: &mut self.ctx,
            source,
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn factory(&self) -> &Factory {
        &self.ctx.factory
    }

    pub fn header(&self) -> &Header {
        &self.ctx.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.ctx.header
    }

    pub fn finish(self) -> (Factory, Header) {
        self.ctx.into_parts()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// The build context paired with the front end being consumed
///
/// Conversion, generic caching, filling and collection are implemented
/// on this type across the submodules.
pub struct Session<'a, S: SymbolSource + ?Sized> {
    pub(crate) ctx: &'a mut BuildContext,
    pub(crate) source: &'a S,
}

impl<'a, S: SymbolSource + ?Sized> Session<'a, S> {
    /// Symbol data; an unknown ref is a front-end bug
    pub(crate) fn data(&self, symbol: SymbolRef) -> Result<&'a SymbolData> {
        let source: &'a S = self.source;
        source
            .symbol(symbol)
            .ok_or_else(|| Error::contract(format!("Unknown {}", symbol)))
    }

    pub fn context(&self) -> &BuildContext {
        self.ctx
    }

    fn build_unit(&mut self, unit: &AnalysisUnit) -> Result<BuildStats> {
        let component = self.ctx.begin_component(&unit.name)?;
        debug!(unit = %unit.name, component, files = unit.files.len(), "Building unit");

        let mut stats = BuildStats {
            units: 1,
            ..BuildStats::default()
        };
        for file in &unit.files {
            if self.ctx.hard_filter.is_excluded(&file.path) {
                debug!(path = %file.path, "File excluded by hard filter");
                stats.skipped_files += 1;
                continue;
            }
            self.build_file(file, &mut stats)?;
            stats.files += 1;
        }

        self.ctx.finish_component()?;
        Ok(stats)
    }

    fn build_file(&mut self, file: &SourceFile, stats: &mut BuildStats) -> Result<()> {
        self.ctx.file_soft_filtered = self.ctx.soft_filter.is_excluded(&file.path);
        if let Some(file_node) = self.create_file(&file.path)? {
            self.ctx
                .factory
                .safe_edge(self.ctx.component, EdgeKind::Component_HasFiles, file_node)?;
        }

        for declaration in &file.declarations {
            self.enter_declaration(declaration.symbol)?;
            if let Some(node) = self.build(declaration.symbol, true)? {
                let component = self.ctx.component;
                self.ctx
                    .header
                    .origin
                    .add(component, declaration.symbol.0, node);
            }
            stats.declarations += 1;
        }
        self.ctx.close_frames()?;

        for body in &file.bodies {
            self.apply_method_body(body)?;
            stats.bodies += 1;
        }
        self.ctx.file_soft_filtered = false;
        Ok(())
    }

    /// Close the frames that do not enclose `symbol`
    fn enter_declaration(&mut self, symbol: SymbolRef) -> Result<()> {
        let mut enclosing: Vec<NodeId> = Vec::new();
        let mut current = self.data(symbol)?.containing;
        let mut depth = 0;
        while let Some(ancestor) = current {
            depth += 1;
            if depth > MAX_NESTING {
                return Err(Error::contract(format!("Containment cycle at {}", symbol)));
            }
            if let Some(node) = self.ctx.node_of(ancestor) {
                enclosing.push(node);
            }
            current = self.data(ancestor)?.containing;
        }
        self.ctx.unwind_to(&enclosing)
    }
}

/// Deepest containment chain accepted from a front end
const MAX_NESTING: usize = 1024;
