//! `query`: read-only lookups against the persisted index.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::cli::args::QueryCommand;
use crate::config::Settings;
use crate::parsing::registry;
use crate::project::FsProject;

pub fn run(query: QueryCommand, path: PathBuf, settings: &Settings) {
    let state_path = path.join(&settings.state_path);
    let project: Arc<FsProject> = Arc::new(FsProject::new(path.clone(), state_path.parent().unwrap_or(&path)));

    if !state_path.exists() {
        eprintln!("No index found at {}. Run 'symbolscope index' first.", state_path.display());
        std::process::exit(1);
    }
    let analyzer = match Analyzer::open(project, state_path) {
        Ok(analyzer) => analyzer,
        Err(err) => {
            eprintln!("Error: failed to load index: {err}");
            std::process::exit(1);
        }
    };

    match query {
        QueryCommand::Skeleton { fqn } => match analyzer.get_skeleton(&fqn) {
            Some(skeleton) => println!("{skeleton}"),
            None => eprintln!("no declaration found for '{fqn}'"),
        },
        QueryCommand::Source { fqn } => match analyzer.get_class_source(&fqn, true) {
            Some(source) => println!("{source}"),
            None => eprintln!("no class found for '{fqn}'"),
        },
        QueryCommand::Definitions { fqn } => {
            let definitions = analyzer.get_definitions(&fqn);
            if definitions.is_empty() {
                eprintln!("no declarations found for '{fqn}'");
            }
            for unit in definitions {
                println!("{:?} {} {}", unit.kind, unit.fq_name(), unit.signature);
            }
        }
        QueryCommand::At { location } => {
            let Some((path_str, offset_str)) = location.rsplit_once(':') else {
                eprintln!("expected 'path:offset', got '{location}'");
                std::process::exit(1);
            };
            let Ok(offset) = offset_str.parse::<usize>() else {
                eprintln!("'{offset_str}' is not a valid byte offset");
                std::process::exit(1);
            };
            let Some(file) = analyzer.file_id_for(std::path::Path::new(path_str)) else {
                eprintln!("'{path_str}' is not in the index");
                std::process::exit(1);
            };

            match analyzer.get_identifier_at(file, offset) {
                Some(identifier) => println!("identifier: {identifier}"),
                None => println!("identifier: <none>"),
            }
            match analyzer.infer_type_at(file, offset) {
                Some(unit) => println!("inferred type: {}", unit.fq_name()),
                None => println!("inferred type: <unresolved>"),
            }
        }
        QueryCommand::Receiver { expression, language } => {
            let Some(language_id) = registry::registry().all().map(|p| p.id()).find(|id| id.as_str().eq_ignore_ascii_case(&language)) else {
                eprintln!("unknown language '{language}'");
                std::process::exit(1);
            };
            match analyzer.extract_call_receiver(language_id, &expression) {
                Some(receiver) => println!("{receiver}"),
                None => println!("<none>"),
            }
        }
    }
}
