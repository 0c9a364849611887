use std::path::PathBuf;
use std::process;

use super::read_input;

pub fn cmd_check(input: PathBuf) {
    let source = read_input(&input);
    let filename = input.to_string_lossy().to_string();

    match trainscript::check(&source, &filename) {
        Ok(()) => {
            eprintln!("OK: {}", input.display());
        }
        Err(_) => {
            process::exit(1);
        }
    }
}
