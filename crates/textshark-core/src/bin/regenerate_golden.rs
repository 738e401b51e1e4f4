use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use textshark_core::{ACCEPTED_EXTENSIONS, parse_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(input) = find_input(&path) else {
            continue;
        };
        let output = path.join("expected.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn find_input(dir: &Path) -> Option<PathBuf> {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("input.{ext}")))
        .find(|path| path.exists())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let result = parse_file(input)
        .map_err(|err| format!("parsing failed for {}: {}", input.display(), err))?;
    let mut json = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    json.push('\n');
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}
