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

//! Two-pass assembler and disassembler for the RV32I base instruction set.
//!
//! [`assemble`] parses one or more source files into an
//! [`AssemblyProgram`](assembler::AssemblyProgram); its `emit` and render
//! methods then produce the memory image (one 32-bit word per line) and the
//! PC-keyed source map. [`disassembler::disassemble`] is the inverse,
//! recovering text from a word and optionally resolving branch and jump
//! targets against a label table.

pub mod assembler;
pub mod ast;
pub mod bits;
pub mod disassembler;
pub mod errors;
pub mod file_reader;
pub mod immediate;
pub mod isa;
pub mod parser;
pub mod pseudo;

use std::path::Path;

use anyhow::{Context, Result};
use assembler::AssemblyProgram;
use file_reader::FileReader;

/// Parses every source file in order into one program, continuing the line
/// count across files, and appends the trailing halt word. Encoding happens
/// afterwards through [`AssemblyProgram::emit`].
pub fn assemble<F: FileReader, P: AsRef<Path>>(
    sources: &[P],
    reader: &F,
) -> Result<AssemblyProgram> {
    let mut program = AssemblyProgram::new();
    for source in sources {
        let path = source.as_ref();
        let text = reader
            .read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        program
            .parse_source(&text)
            .with_context(|| format!("Failed to assemble {}", path.display()))?;
    }
    program.finish();
    Ok(program)
}
