//! `update`: an incremental pass against the persisted index.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::config::Settings;
use crate::project::FsProject;

pub fn run(path: PathBuf, settings: &Settings) {
    let state_path = path.join(&settings.state_path);
    let project: Arc<FsProject> = Arc::new(
        FsProject::new(path.clone(), state_path.parent().unwrap_or(&path))
            .with_ignore_patterns(settings.indexing.ignore_patterns.clone()),
    );

    if !state_path.exists() {
        eprintln!("No index found at {}. Run 'symbolscope index' first.", state_path.display());
        std::process::exit(1);
    }

    let analyzer = match Analyzer::open(project, state_path.clone()) {
        Ok(analyzer) => analyzer,
        Err(err) => {
            eprintln!("Error: failed to load index: {err}");
            std::process::exit(1);
        }
    };

    match analyzer.update(None, &AtomicBool::new(false)) {
        Some(report) => println!(
            "{} added, {} modified, {} removed, {} unchanged",
            report.added, report.modified, report.removed, report.unchanged
        ),
        None => println!("update cancelled"),
    }

    if let Err(err) = analyzer.save(state_path) {
        eprintln!("Error: failed to persist index: {err}");
        std::process::exit(1);
    }
}
