//! Build command implementation

use crate::builder::{BuildStats, GraphBuilder};
use crate::cli::BuildArgs;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::frontend::SymbolModel;
use crate::lim::{self, dump_limml, DumpOptions};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, &args);

    let inputs = collect_inputs(&args.input)?;
    if inputs.is_empty() {
        return Err(Error::ConfigError {
            message: format!("No front-end exports found at {}", args.input.display()),
        });
    }

    let start = Instant::now();
    let mut builder = GraphBuilder::from_config(&config)?;
    let mut stats = BuildStats::default();
    for path in &inputs {
        info!(path = %path.display(), "Reading front-end export");
        let model = SymbolModel::load(path)?;
        stats.merge(builder.add_source(&model)?);
    }
    let (mut factory, header) = builder.finish();

    fs::create_dir_all(&args.output)?;
    let name = config
        .build
        .lim_name
        .clone()
        .unwrap_or_else(|| default_name(&args.input));

    let lim_path = args.output.join(format!("{}.lim", name));
    lim::save(&mut factory, &header, &lim_path)?;

    if config.output.filter_state {
        lim::save_filter(&factory, args.output.join(format!("{}.flim", name)))?;
    }
    if config.output.filtered_graph {
        lim::save_filtered(
            &mut factory,
            &header,
            args.output.join(format!("{}-filtered.lim", name)),
        )?;
    }
    if config.output.dump_limml {
        let file = File::create(args.output.join(format!("{}.limml", name)))?;
        let writer = BufWriter::with_capacity(64 * 1024, file);
        dump_limml(&factory, writer, &name, DumpOptions::default())?;
    }

    println!(
        "Built {} nodes from {} units ({} files, {} skipped) in {:.2}s",
        factory.len(),
        stats.units,
        stats.files,
        stats.skipped_files,
        start.elapsed().as_secs_f64()
    );
    println!("Graph written to {}", lim_path.display());
    Ok(())
}

/// CLI flags win over the configuration file
fn apply_overrides(config: &mut Config, args: &BuildArgs) {
    if let Some(name) = &args.lim_name {
        config.build.lim_name = Some(name.clone());
    }
    if let Some(configuration) = &args.configuration {
        config.build.configuration = Some(configuration.clone());
    }
    if let Some(platform) = &args.platform {
        config.build.platform = Some(platform.clone());
    }
    if let Some(hard) = &args.external_hard_filter {
        config.filter.hard = Some(hard.clone());
    }
    if let Some(soft) = &args.external_soft_filter {
        config.filter.soft = Some(soft.clone());
    }
    if args.dump_limml {
        config.output.dump_limml = true;
    }
    if args.filtered_output {
        config.output.filtered_graph = true;
    }
}

/// The export itself, or every `*.json` below a directory in name order
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut inputs = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().map_or(false, |e| e == "json") {
            debug!(path = %path.display(), "Found front-end export");
            inputs.push(path.to_path_buf());
        }
    }
    Ok(inputs)
}

fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "lim".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{SourceSpan, TypeKind};
    use tempfile::tempdir;

    fn args(input: PathBuf, output: PathBuf) -> BuildArgs {
        BuildArgs {
            input,
            output,
            lim_name: Some("app".to_string()),
            configuration: Some("Debug".to_string()),
            platform: None,
            external_hard_filter: None,
            external_soft_filter: None,
            dump_limml: true,
            filtered_output: true,
            config: None,
        }
    }

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("nested/a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.iter().all(|p| p.extension().unwrap() == "json"));
        assert_eq!(default_name(Path::new("exports/app.json")), "app");
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        let mut a = args(dir.path().join("in.json"), dir.path().join("out"));
        a.external_soft_filter = Some(dir.path().join("soft.txt"));
        apply_overrides(&mut config, &a);
        assert_eq!(config.build.lim_name.as_deref(), Some("app"));
        assert_eq!(config.build.configuration.as_deref(), Some("Debug"));
        assert!(config.output.dump_limml);
        assert!(config.output.filtered_graph);
        assert_eq!(config.filter.soft, Some(dir.path().join("soft.txt")));
    }

    #[test]
    fn test_build_writes_outputs() {
        let dir = tempdir().unwrap();
        let mut model = SymbolModel::new();
        let global = model.global_namespace();
        let class = model.named_type(global, "Widget", TypeKind::Class);
        model.declare("app", "Widget.cs", class, SourceSpan::new(1, 1, 3, 2));
        let input = dir.path().join("app.json");
        model.save(&input).unwrap();

        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();
        let out = dir.path().join("out");
        let mut a = args(input, out.clone());
        a.config = Some(config_path);
        run(a).unwrap();

        for file in ["app.lim", "app.flim", "app-filtered.lim", "app.limml"] {
            assert!(out.join(file).exists(), "missing {}", file);
        }
        let (factory, header) = lim::load(out.join("app.lim")).unwrap();
        assert_eq!(header.properties.get(lim::header::PROP_CONFIGURATION), Some("Debug"));
        assert!(factory.len() > 3);
    }
}
