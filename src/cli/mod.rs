pub mod check;
pub mod delta;
pub mod generate;

use std::path::Path;
use std::process;

/// Read a `.json` input, exiting with a message when that fails.
pub fn read_input(input: &Path) -> String {
    if !input.extension().is_some_and(|e| e == "json") {
        eprintln!("error: input must be a .json file");
        process::exit(1);
    }
    match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", input.display(), e);
            process::exit(1);
        }
    }
}

/// Write `text` to `output`, or print it when no path is given.
pub fn write_output(text: &str, output: Option<&Path>, what: &str) {
    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, text) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Generated {} -> {}", what, path.display());
        }
        None => print!("{}", text),
    }
}
