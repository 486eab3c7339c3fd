//! Info command implementation

use crate::cli::InfoArgs;
use crate::core::error::Result;
use crate::lim::{self, Factory, Header};
use serde::Serialize;
use std::collections::BTreeMap;

/// Run the info command
pub fn run(args: InfoArgs) -> Result<()> {
    let (factory, header) = lim::load(&args.lim)?;
    let summary = GraphSummary::new(&factory, &header);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Graph: {}", args.lim.display());
    for (key, value) in &summary.properties {
        println!("  {:<16} {}", key, value);
    }
    println!();
    println!(
        "Nodes: {} ({} filtered), origin entries: {}, overrides: {}",
        summary.nodes, summary.filtered, summary.origin_entries, summary.overrides
    );
    for (kind, count) in &summary.kinds {
        println!("  {:<32} {}", kind, count);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GraphSummary {
    properties: BTreeMap<String, String>,
    nodes: usize,
    filtered: usize,
    origin_entries: usize,
    overrides: usize,
    kinds: BTreeMap<String, usize>,
}

impl GraphSummary {
    fn new(factory: &Factory, header: &Header) -> Self {
        Self {
            properties: header
                .properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            nodes: factory.len(),
            filtered: factory.iter().filter(|n| factory.is_filtered(n.id())).count(),
            origin_entries: header.origin.len(),
            overrides: header.overrides.len(),
            kinds: factory
                .kind_counts()
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lim::{header::PROP_LANGUAGE, LanguageKind};

    #[test]
    fn test_summary_counts() {
        let mut factory = Factory::new();
        let file = factory.create_file("a.cs").unwrap();
        factory.set_filtered(file).unwrap();
        let header = Header::new(LanguageKind::Csharp);

        let summary = GraphSummary::new(&factory, &header);
        assert_eq!(summary.nodes, factory.len());
        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.kinds.get("File"), Some(&1));
        assert!(summary.properties.contains_key(PROP_LANGUAGE));
    }
}
