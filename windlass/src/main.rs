use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use anchorage::error::Result;

use crate::flags::{Windlass, WindlassCmd};
use crate::project::Project;

mod commands;
mod flags;
mod project;

fn init_logging(verbose: u32) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        _ => EnvFilter::new(fallback),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(flags: Windlass) -> Result<()> {
    let project = Project::open(flags.root, flags.config)?;
    let start = Instant::now();
    match flags.subcommand {
        WindlassCmd::Extract(_) => commands::extract(&project).map(|_| ())?,
        WindlassCmd::Reference(_) => commands::reference(&project)?,
        WindlassCmd::Render(_) => commands::render(&project)?,
        WindlassCmd::Sitemap(_) => commands::sitemap(&project)?,
        WindlassCmd::Build(_) => commands::build(&project)?,
        WindlassCmd::Convert(cmd) => {
            let markdown = commands::convert(&project, &cmd.file, cmd.offset)?;
            println!("{markdown}");
        }
        WindlassCmd::Search(cmd) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            let search = commands::search(&project, &cmd.terms, cmd.site.as_deref(), cmd.lang.as_deref());
            for id in runtime.block_on(search)? {
                println!("{id}");
            }
        }
    }

    tracing::debug!("done in {}ms", start.elapsed().as_millis());
    Ok(())
}

pub fn main() -> ExitCode {
    let flags = Windlass::from_env_or_exit();
    init_logging(flags.verbose);

    match run(flags) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use anchorage::catalog::ANCHORS_FILE;

    use super::*;

    fn extract_in(root: &Path) -> Result<()> {
        let args = vec!["--root".into(), root.as_os_str().into(), "extract".into()];
        run(Windlass::from_vec(args).unwrap())
    }

    #[test]
    fn extract_writes_nothing_when_an_anchor_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let anchors = dir.path().join("docs/anchors");
        let data = dir.path().join("website/public/data");
        fs::create_dir_all(&anchors).unwrap();
        fs::write(anchors.join("good.adoc"), "\
= Good Anchor
:categories: testing-quality
:roles: software-developer
:proponents: Kent Beck
").unwrap();
        fs::write(anchors.join("broken.adoc"), "= Broken\n:categories: testing-quality\n").unwrap();

        let error = extract_in(dir.path()).unwrap_err();
        assert!(error.to_string().contains("broken.adoc: Missing :roles: attribute"));
        assert!(!data.exists());

        fs::remove_file(anchors.join("broken.adoc")).unwrap();
        extract_in(dir.path()).unwrap();
        assert!(data.join(ANCHORS_FILE).is_file());
    }
}
