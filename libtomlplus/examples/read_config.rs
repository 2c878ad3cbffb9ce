//! Print the flat key/value pairs of a TOML+ file.
//!
//! ```sh
//! cargo run --example read_config -- ../test/toml/symbols.toml
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use libtomlplus::{parse_with_filename, ConfigReader};

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: read_config <toml_file>");
        return ExitCode::FAILURE;
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    let filename = Path::new(&path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string());

    let mut reader = ConfigReader::new();
    if let Err(e) = parse_with_filename(BufReader::new(file), filename.as_deref(), &mut reader) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let pairs: Vec<String> = reader
        .configs()
        .iter()
        .map(|(key, value)| format!("{} = {}", key, value))
        .collect();
    println!("{{ {} }}", pairs.join(", "));
    ExitCode::SUCCESS
}
