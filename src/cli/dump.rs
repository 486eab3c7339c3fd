//! Dump command implementation

use crate::cli::DumpArgs;
use crate::core::error::Result;
use crate::lim::{self, dump_limml, DumpOptions};
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::info;

/// Run the dump command
pub fn run(args: DumpArgs) -> Result<()> {
    let (mut factory, _header) = lim::load(&args.lim)?;
    if let Some(filter) = &args.filter {
        lim::load_filter(&mut factory, filter)?;
    }

    let project = args
        .lim
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let options = DumpOptions {
        include_filtered: args.include_filtered,
        ..Default::default()
    };

    match &args.output {
        Some(path) => {
            let writer = BufWriter::with_capacity(64 * 1024, File::create(path)?);
            dump_limml(&factory, writer, &project, options)?;
            info!(path = %path.display(), nodes = factory.len(), "LIMML written");
        }
        None => {
            let stdout = io::stdout();
            dump_limml(&factory, BufWriter::new(stdout.lock()), &project, options)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lim::{Factory, Header, LanguageKind};
    use tempfile::tempdir;

    #[test]
    fn test_dump_to_file() {
        let dir = tempdir().unwrap();
        let mut factory = Factory::new();
        let file = factory.create_file("src/Widget.cs").unwrap();
        factory.set_filtered(file).unwrap();
        let header = Header::new(LanguageKind::Csharp);
        let lim_path = dir.path().join("app.lim");
        lim::save(&mut factory, &header, &lim_path).unwrap();

        let out = dir.path().join("app.limml");
        run(DumpArgs {
            lim: lim_path.clone(),
            filter: None,
            output: Some(out.clone()),
            include_filtered: false,
        })
        .unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("<Project name='app'>"));
        assert!(!text.contains("Widget.cs"));

        run(DumpArgs {
            lim: lim_path,
            filter: None,
            output: Some(out.clone()),
            include_filtered: true,
        })
        .unwrap();
        assert!(std::fs::read_to_string(&out).unwrap().contains("Widget.cs"));
    }
}
