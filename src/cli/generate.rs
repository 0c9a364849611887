use std::path::PathBuf;
use std::process;

use trainscript::GenerateOptions;

use super::{read_input, write_output};

pub fn cmd_generate(input: PathBuf, output: Option<PathBuf>, debug_comments: bool) {
    let source = read_input(&input);
    let filename = input.to_string_lossy().to_string();

    let options = GenerateOptions { debug_comments };
    let script = match trainscript::generate_with_options(&source, &filename, options) {
        Ok(s) => s,
        Err(errors) => {
            eprintln!(
                "error: cannot generate '{}' ({} error{})",
                input.display(),
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            );
            process::exit(1);
        }
    };

    write_output(&script, output.as_deref(), "script");
}
