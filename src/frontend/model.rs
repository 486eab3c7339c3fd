//! JSON Symbol Model
//!
//! An in-memory [`SymbolSource`] that front ends export to and the CLI
//! reads back. The helper constructors mirror what a C# front end reports
//! (qualified display names, keyword display for built-in types) and keep
//! test fixtures short.
//!
//! @module frontend/model

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AnalysisUnit, Declaration, MethodBody, SiteData, SiteRef, SourceFile, SourceSpan,
    SpecialType, SymbolData, SymbolKind, SymbolRef, SymbolSource, TypeKind,
};
use crate::core::error::Result;

const GLOBAL_NAMESPACE_DISPLAY: &str = "<global namespace>";

/// Keyword a C# front end displays for a built-in type
fn keyword(special: SpecialType) -> Option<&'static str> {
    let word = match special {
        SpecialType::None => return None,
        SpecialType::Object => "object",
        SpecialType::Void => "void",
        SpecialType::Boolean => "bool",
        SpecialType::Char => "char",
        SpecialType::SByte => "sbyte",
        SpecialType::Byte => "byte",
        SpecialType::Int16 => "short",
        SpecialType::UInt16 => "ushort",
        SpecialType::Int32 => "int",
        SpecialType::UInt32 => "uint",
        SpecialType::Int64 => "long",
        SpecialType::UInt64 => "ulong",
        SpecialType::Decimal => "decimal",
        SpecialType::Single => "float",
        SpecialType::Double => "double",
        SpecialType::String => "string",
    };
    Some(word)
}

/// Display text without its generic argument list
fn generic_base(display: &str) -> &str {
    display.split_once('<').map_or(display, |(base, _)| base)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolModel {
    pub symbols: BTreeMap<u32, SymbolData>,
    pub sites: BTreeMap<u32, SiteData>,
    pub units: Vec<AnalysisUnit>,
}

impl SymbolSource for SymbolModel {
    fn symbol(&self, id: SymbolRef) -> Option<&SymbolData> {
        self.symbols.get(&id.0)
    }

    fn site(&self, id: SiteRef) -> Option<&SiteData> {
        self.sites.get(&id.0)
    }

    fn units(&self) -> &[AnalysisUnit] {
        &self.units
    }
}

impl SymbolModel {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // JSON
    // =========================================================================

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a model exported by a front end
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    // =========================================================================
    // RAW ACCESS
    // =========================================================================

    pub fn add_symbol(&mut self, data: SymbolData) -> SymbolRef {
        let id = self.symbols.keys().next_back().map_or(1, |last| last + 1);
        self.symbols.insert(id, data);
        SymbolRef(id)
    }

    pub fn add_site(&mut self, data: SiteData) -> SiteRef {
        let id = self.sites.keys().next_back().map_or(1, |last| last + 1);
        self.sites.insert(id, data);
        SiteRef(id)
    }

    pub fn symbol_mut(&mut self, id: SymbolRef) -> Option<&mut SymbolData> {
        self.symbols.get_mut(&id.0)
    }

    fn display_of(&self, id: SymbolRef) -> &str {
        self.symbols.get(&id.0).map_or("", |s| s.display.as_str())
    }

    /// `parent.name`, or just `name` directly under the global namespace
    fn qualify(&self, parent: SymbolRef, name: &str) -> String {
        match self.symbols.get(&parent.0) {
            Some(p) if !p.is_global_namespace => format!("{}.{}", p.display, name),
            _ => name.to_string(),
        }
    }

    fn child(&self, kind: SymbolKind, parent: SymbolRef, name: &str) -> SymbolData {
        let display = self.qualify(parent, name);
        SymbolData {
            containing: Some(parent),
            display,
            ..SymbolData::new(kind, name)
        }
    }

    // =========================================================================
    // SYMBOL HELPERS
    // =========================================================================

    pub fn global_namespace(&mut self) -> SymbolRef {
        let existing = self
            .symbols
            .iter()
            .find(|(_, s)| s.is_global_namespace)
            .map(|(id, _)| SymbolRef(*id));
        if let Some(id) = existing {
            return id;
        }
        let mut data = SymbolData::new(SymbolKind::Namespace, "");
        data.display = GLOBAL_NAMESPACE_DISPLAY.to_string();
        data.minimal_display = GLOBAL_NAMESPACE_DISPLAY.to_string();
        data.is_global_namespace = true;
        self.add_symbol(data)
    }

    pub fn namespace(&mut self, parent: SymbolRef, name: &str) -> SymbolRef {
        let data = self.child(SymbolKind::Namespace, parent, name);
        self.add_symbol(data)
    }

    pub fn named_type(&mut self, parent: SymbolRef, name: &str, type_kind: TypeKind) -> SymbolRef {
        let mut data = self.child(SymbolKind::NamedType, parent, name);
        data.type_kind = type_kind;
        data.is_reference_type = matches!(
            type_kind,
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate
        );
        self.add_symbol(data)
    }

    pub fn type_parameter(&mut self, owner: SymbolRef, name: &str) -> SymbolRef {
        let mut data = SymbolData::new(SymbolKind::TypeParameter, name);
        data.containing = Some(owner);
        data.type_kind = TypeKind::TypeParameter;
        self.add_symbol(data)
    }

    fn add_type_parameters(&mut self, owner: SymbolRef, names: &[&str]) -> Vec<SymbolRef> {
        let params: Vec<SymbolRef> = names
            .iter()
            .map(|name| self.type_parameter(owner, name))
            .collect();
        let suffix = format!("<{}>", names.join(", "));
        if let Some(data) = self.symbol_mut(owner) {
            data.is_generic = true;
            data.type_parameters = params.clone();
            data.type_arguments = params.clone();
            data.display.push_str(&suffix);
            data.minimal_display.push_str(&suffix);
        }
        params
    }

    /// Generic type definition and its type parameters
    pub fn generic_type(
        &mut self,
        parent: SymbolRef,
        name: &str,
        params: &[&str],
    ) -> (SymbolRef, Vec<SymbolRef>) {
        let def = self.named_type(parent, name, TypeKind::Class);
        let params = self.add_type_parameters(def, params);
        (def, params)
    }

    /// Generic method definition and its type parameters
    pub fn generic_method(
        &mut self,
        owner: SymbolRef,
        name: &str,
        params: &[&str],
    ) -> (SymbolRef, Vec<SymbolRef>) {
        let def = self.method(owner, name, None);
        let params = self.add_type_parameters(def, params);
        (def, params)
    }

    /// Constructed form of a generic definition, e.g. `List<int>`
    pub fn construct(&mut self, def: SymbolRef, args: &[SymbolRef]) -> SymbolRef {
        let Some(definition) = self.symbols.get(&def.0).cloned() else {
            return self.add_symbol(SymbolData::default());
        };
        let arguments = args
            .iter()
            .map(|a| self.display_of(*a).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let data = SymbolData {
            display: format!("{}<{}>", generic_base(&definition.display), arguments),
            minimal_display: format!("{}<{}>", generic_base(&definition.minimal_display), arguments),
            is_generic: true,
            type_arguments: args.to_vec(),
            original_definition: Some(def),
            ..definition
        };
        self.add_symbol(data)
    }

    /// Built-in or library type known only from metadata
    pub fn metadata_type(&mut self, full_name: &str, special: SpecialType) -> SymbolRef {
        let short = full_name.rsplit('.').next().unwrap_or(full_name);
        let mut data = SymbolData::new(SymbolKind::NamedType, short);
        match keyword(special) {
            Some(word) => {
                data.display = word.to_string();
                data.minimal_display = word.to_string();
            }
            None => data.display = full_name.to_string(),
        }
        data.special_type = special;
        data.type_kind = TypeKind::Class;
        data.is_reference_type = matches!(
            special,
            SpecialType::None | SpecialType::Object | SpecialType::String
        );
        self.add_symbol(data)
    }

    pub fn array_of(&mut self, element: SymbolRef) -> SymbolRef {
        let display = format!("{}[]", self.display_of(element));
        let mut data = SymbolData::new(SymbolKind::ArrayType, display);
        data.type_kind = TypeKind::Array;
        data.element_type = Some(element);
        data.is_reference_type = true;
        self.add_symbol(data)
    }

    pub fn method(&mut self, owner: SymbolRef, name: &str, returns: Option<SymbolRef>) -> SymbolRef {
        let mut data = self.child(SymbolKind::Method, owner, name);
        data.return_type = returns;
        self.add_symbol(data)
    }

    pub fn parameter(&mut self, method: SymbolRef, name: &str, ty: SymbolRef) -> SymbolRef {
        let mut data = SymbolData::new(SymbolKind::Parameter, name);
        data.containing = Some(method);
        data.value_type = Some(ty);
        let id = self.add_symbol(data);
        if let Some(owner) = self.symbol_mut(method) {
            owner.parameters.push(id);
        }
        id
    }

    pub fn field(&mut self, owner: SymbolRef, name: &str, ty: SymbolRef) -> SymbolRef {
        let mut data = self.child(SymbolKind::Field, owner, name);
        data.value_type = Some(ty);
        self.add_symbol(data)
    }

    // =========================================================================
    // UNITS
    // =========================================================================

    fn file_mut(&mut self, unit: &str, path: &str) -> &mut SourceFile {
        let unit_index = match self.units.iter().position(|u| u.name == unit) {
            Some(index) => index,
            None => {
                self.units.push(AnalysisUnit {
                    name: unit.to_string(),
                    files: Vec::new(),
                });
                self.units.len() - 1
            }
        };
        let files = &mut self.units[unit_index].files;
        let file_index = match files.iter().position(|f| f.path == path) {
            Some(index) => index,
            None => {
                files.push(SourceFile {
                    path: path.to_string(),
                    ..SourceFile::default()
                });
                files.len() - 1
            }
        };
        &mut files[file_index]
    }

    /// Declare `symbol` at `span` of `path`, listing it in `unit`
    pub fn declare(&mut self, unit: &str, path: &str, symbol: SymbolRef, span: SourceSpan) -> SiteRef {
        let site = self.add_site(SiteData {
            path: path.to_string(),
            span,
            declares: Some(symbol),
            documentation: None,
        });
        if let Some(data) = self.symbol_mut(symbol) {
            data.declarations.push(site);
        }
        self.file_mut(unit, path)
            .declarations
            .push(Declaration { symbol, site });
        site
    }

    pub fn document(&mut self, site: SiteRef, text: &str) {
        if let Some(data) = self.sites.get_mut(&site.0) {
            data.documentation = Some(text.to_string());
        }
    }

    pub fn set_line_count(&mut self, unit: &str, path: &str, lines: u32) {
        self.file_mut(unit, path).line_count = Some(lines);
    }

    pub fn add_body(&mut self, unit: &str, path: &str, body: MethodBody) {
        self.file_mut(unit, path).bodies.push(body);
    }
}
