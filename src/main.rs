/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use rvasm::assemble;
use rvasm::file_reader::AsmFileReader;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Assembly prepended before user code when assembling GCC output.
const PREAMBLE_PATH: &str = "asm/_preamble.s";

/// Setting this to 1 turns verbose mode on by default.
const VERBOSE_ENV: &str = "ASSEMBLER_VERBOSE";

#[derive(clap_parser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    /// Input file name of human readable assembly.
    input: PathBuf,
    /// Output file name of the memory image, one word per line. A name
    /// containing "memb" selects binary digits instead of hex.
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Prints mem files without any annotations.
    #[clap(long)]
    disable_annotations: bool,
    /// Don't emit a source map file next to the output.
    #[clap(long)]
    disable_sourcemaps: bool,
    /// Increases verbosity.
    #[clap(short, long)]
    verbose: bool,
    /// Add appropriate handling for assembly generated by GCC (preamble,
    /// etc.).
    #[clap(short = 'c', long = "gcc")]
    gcc: bool,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    let verbose = opts.verbose || env::var(VERBOSE_ENV).as_deref() == Ok("1");

    let reader = AsmFileReader;
    let mut files = vec![opts.input.clone()];
    if opts.gcc {
        files.insert(0, PathBuf::from(PREAMBLE_PATH));
    }

    let program = assemble(&files, &reader)?;

    if verbose {
        for (line_number, directive) in &program.skipped_directives {
            println!("Detected assembler directive on line {line_number}: {directive}, ignoring");
        }
        println!(
            "Parsed {} instructions. Label table:",
            program.parsed_lines.len()
        );
        for (label, address) in &program.labels {
            println!("  {label} -> {address}");
        }
    }

    if let Some(output) = &opts.output {
        let encoded = program.emit()?;
        let hex_not_bin = !output.to_string_lossy().contains("memb");
        fs::write(
            output,
            program.render_mem(&encoded, hex_not_bin, !opts.disable_annotations),
        )
        .with_context(|| format!("Failed to write {}", output.display()))?;

        if !opts.disable_sourcemaps {
            let map_path = PathBuf::from(format!("{}.map", output.display()));
            fs::write(&map_path, program.render_source_map(&encoded))
                .with_context(|| format!("Failed to write {}", map_path.display()))?;
        }

        println!(
            "Successfully assembled {} to {}",
            opts.input.display(),
            output.display()
        );
    }

    Ok(())
}
