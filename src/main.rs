use std::fs;
use std::path::Path;
use std::process::ExitCode;

use walkdir::WalkDir;

use deadjs::{report, ClassScopeMode, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Human,
    #[cfg(feature = "json-out")]
    Json,
}

fn main() -> ExitCode {
    let command = clap::Command::new("deadjs")
        .about("Find unused variable bindings in .js files")
        .arg(
            clap::Arg::new("EDIT")
                .short('e')
                .long("edit")
                .action(clap::ArgAction::SetTrue)
                .help("Remove unused declarations from the files"),
        )
        .arg(
            clap::Arg::new("FAIL_ON_REPORTS")
                .short('f')
                .long("fail-on-reports")
                .action(clap::ArgAction::SetTrue)
                .help("Exit with 1 if unused declarations were found"),
        )
        .arg(
            clap::Arg::new("CLASS_SCOPES")
                .long("class-scopes")
                .value_name("MODE")
                .default_value("aggregate")
                .help("How classes own their member locals: aggregate, exclude"),
        )
        .arg(
            clap::Arg::new("FILE_PATHS")
                .num_args(0..)
                .default_value(".")
                .help(".js files or directories to scan"),
        );
    #[cfg(feature = "json-out")]
    let command = command.arg(
        clap::Arg::new("OUTPUT_FORMAT")
            .short('o')
            .long("output-format")
            .value_name("FORMAT")
            .default_value("human")
            .help("Output format: human, json"),
    );
    let matches = command.get_matches();

    let class_scopes: ClassScopeMode = match matches
        .get_one::<String>("CLASS_SCOPES")
        .map(String::as_str)
        .unwrap_or("aggregate")
        .parse()
    {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let settings = Settings { class_scopes };

    #[cfg(feature = "json-out")]
    let format = match matches
        .get_one::<String>("OUTPUT_FORMAT")
        .map(String::as_str)
    {
        None | Some("human") => OutputFormat::Human,
        Some("json") => OutputFormat::Json,
        Some(other) => {
            eprintln!("invalid configuration: unknown output format: {other}");
            return ExitCode::from(2);
        }
    };
    #[cfg(not(feature = "json-out"))]
    let format = OutputFormat::Human;

    let edit = matches.get_flag("EDIT");
    let fail_on_reports = matches.get_flag("FAIL_ON_REPORTS");

    let mut reports = 0usize;
    for file_path in matches
        .get_many::<String>("FILE_PATHS")
        .expect("FILE_PATHS")
    {
        let path = Path::new(file_path);
        if path.is_file() {
            reports += process_file(path, &settings, edit, format);
            continue;
        }
        let entries = WalkDir::new(path)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!("Error walking {}: {}", path.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_javascript(entry.path()) {
                continue;
            }
            reports += process_file(entry.path(), &settings, edit, format);
        }
    }

    if fail_on_reports && reports > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Analyze one file; failures are reported and skipped, never fatal for
/// the remaining files.
fn process_file(path: &Path, settings: &Settings, edit: bool, format: OutputFormat) -> usize {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file {}: {}", path.display(), err);
            return 0;
        }
    };

    let tree = match deadjs::parse(&content) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("Error parsing file {}: {}", path.display(), err);
            return 0;
        }
    };
    if tree.root_node().has_error() {
        eprintln!("Error parsing file {}: syntax errors found", path.display());
        return 0;
    }

    let results = match settings.find_dead_code(&tree.root_node(), &content) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("Error analyzing file {}: {}", path.display(), err);
            return 0;
        }
    };
    if results.is_empty() {
        return 0;
    }

    if edit {
        match deadjs::edit_dead_code(&content, &tree, results.iter().cloned()) {
            Ok(edited) => {
                if let Err(err) = fs::write(path, edited) {
                    eprintln!("Error writing file {}: {}", path.display(), err);
                }
            }
            Err(err) => eprintln!("Error fixing file {}: {}", path.display(), err),
        }
    } else {
        match format {
            OutputFormat::Human => report::print(path.display().to_string(), &content, &results),
            #[cfg(feature = "json-out")]
            OutputFormat::Json => {
                report::print_json(&path.display().to_string(), &content, &results);
            }
        }
    }
    results.len()
}

fn is_javascript(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| matches!(ext, "js" | "jsx" | "mjs" | "cjs"))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}
