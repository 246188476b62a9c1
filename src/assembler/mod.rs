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

pub mod encoder;
pub mod label_table;

use crate::ast::{LineNo, ParsedLine};
use crate::bits::BitPack;
use crate::errors::AssemblyError;
use crate::parser;
use crate::pseudo::{self, Expansion};
use label_table::{LabelTable, nearest_label};
use std::fmt::Write;

/// One encoded instruction word together with the line it came from.
#[derive(Debug)]
pub struct EncodedLine<'a> {
    pub address: u32,
    pub bits: BitPack,
    pub line: &'a ParsedLine,
}

/// Two-pass assembly driver. The parse pass collects labels and expanded
/// lines; the emit pass encodes every line at its final address. Labels
/// always annotate the instruction that follows them, so the table is
/// complete before any encoding starts and forward references resolve.
#[derive(Debug, Default)]
pub struct AssemblyProgram {
    pub address: u32,
    pub labels: LabelTable,
    pub parsed_lines: Vec<ParsedLine>,
    /// Directives seen and skipped, kept for verbose reporting.
    pub skipped_directives: Vec<(LineNo, String)>,
    line_offset: i32,
}

impl AssemblyProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a complete source file, continuing the physical line count
    /// from any previously parsed file.
    pub fn parse_source(&mut self, source: &str) -> Result<(), AssemblyError> {
        let mut count = 0;
        for (index, text) in source.lines().enumerate() {
            let line_number = self.line_offset + index as i32 + 1;
            self.parse_line(text, line_number)?;
            count += 1;
        }
        self.line_offset += count;
        Ok(())
    }

    /// Parses one physical source line: strips the comment, records any
    /// label at the current address, expands pseudo-instructions and
    /// appends the resulting parsed lines. Lines with no recognizable
    /// instruction are skipped.
    pub fn parse_line(&mut self, text: &str, line_number: i32) -> Result<(), AssemblyError> {
        let original = text.trim().to_string();
        let stripped = original.split('#').next().unwrap_or("").trim();
        let Some(raw) = parser::parse_line(stripped) else {
            return Ok(());
        };

        if let Some(label) = &raw.label {
            if self.labels.contains_key(label) {
                return Err(AssemblyError::Line {
                    line: LineNo::new(line_number),
                    instruction: raw.instruction.clone().unwrap_or_default(),
                    original: original.clone(),
                    source: Box::new(AssemblyError::DuplicateLabel(label.clone())),
                });
            }
            self.labels.insert(label.clone(), self.address);
        }

        let Some(instruction) = raw.instruction else {
            return Ok(());
        };

        let parsed = ParsedLine {
            original: original.clone(),
            line_number: LineNo::new(line_number),
            label: raw.label,
            instruction,
            args: raw.args,
        };

        if parsed.is_directive() {
            self.skipped_directives
                .push((parsed.line_number, parsed.instruction));
            return Ok(());
        }

        if parsed.is_pseudo() {
            let expansion =
                pseudo::expand(&parsed.instruction, &parsed.args).map_err(|source| {
                    AssemblyError::Line {
                        line: parsed.line_number,
                        instruction: parsed.instruction.clone(),
                        original: parsed.original.clone(),
                        source: Box::new(source),
                    }
                })?;
            match expansion {
                Expansion::Single(mnemonic, args) => {
                    self.append(ParsedLine {
                        instruction: mnemonic.to_string(),
                        args,
                        ..parsed
                    });
                }
                Expansion::Multiple(products) => {
                    // The label sticks to the first expanded instruction.
                    let mut label = parsed.label.clone();
                    for (index, (mnemonic, args)) in products.into_iter().enumerate() {
                        self.append(ParsedLine {
                            original: parsed.original.clone(),
                            line_number: parsed.line_number.with_sub(index as u32 + 1),
                            label: label.take(),
                            instruction: mnemonic.to_string(),
                            args,
                        });
                    }
                }
            }
            return Ok(());
        }

        self.append(parsed);
        Ok(())
    }

    fn append(&mut self, line: ParsedLine) {
        self.parsed_lines.push(line);
        self.address += 4;
    }

    /// Appends the end-of-stream halt word. Called once after all sources
    /// have been parsed.
    pub fn finish(&mut self) {
        self.parsed_lines.push(ParsedLine {
            original: String::new(),
            line_number: LineNo::new(-1),
            label: None,
            instruction: "halt".to_string(),
            args: Vec::new(),
        });
    }

    /// Second pass: encodes every parsed line at addresses 0, 4, 8, ...
    /// Fails on the first bad line, before any output is rendered, so a
    /// partial memory image is never written.
    pub fn emit(&self) -> Result<Vec<EncodedLine<'_>>, AssemblyError> {
        let mut output = Vec::with_capacity(self.parsed_lines.len());
        let mut address = 0u32;
        for line in &self.parsed_lines {
            let bits = encoder::encode_line(line, &self.labels, address).map_err(|source| {
                AssemblyError::Line {
                    line: line.line_number,
                    instruction: line.instruction.clone(),
                    original: line.original.clone(),
                    source: Box::new(source),
                }
            })?;
            output.push(EncodedLine {
                address,
                bits,
                line,
            });
            address += 4;
        }
        Ok(output)
    }

    /// Renders the memory image, one word per line. Hex lines can carry a
    /// `// PC=.. line=..` annotation; binary lines never do.
    pub fn render_mem(
        &self,
        encoded: &[EncodedLine<'_>],
        hex_not_bin: bool,
        annotations: bool,
    ) -> String {
        let mut out = String::new();
        for entry in encoded {
            if hex_not_bin {
                out.push_str(&entry.bits.hex());
                if annotations {
                    let _ = write!(
                        out,
                        " // PC={:#x} line={}: {}",
                        entry.address, entry.line.line_number, entry.line.original
                    );
                }
            } else {
                out.push_str(&entry.bits.bin());
            }
            out.push('\n');
        }
        out
    }

    /// Renders the source map: one `ADDRESS LINE: NEAREST_LABEL` row per
    /// emitted word, `root` when no label precedes the address.
    pub fn render_source_map(&self, encoded: &[EncodedLine<'_>]) -> String {
        let mut out = String::new();
        for entry in encoded {
            let label = nearest_label(&self.labels, entry.address).unwrap_or("root");
            let _ = writeln!(
                out,
                "{:08X} {}: {}",
                entry.address, entry.line.line_number, label
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> AssemblyProgram {
        let mut program = AssemblyProgram::new();
        program.parse_source(source).unwrap();
        program.finish();
        program
    }

    #[test]
    fn test_label_annotates_following_instruction() {
        let program = parse("nop\nloop: addi x1, x1, 1\nbeq x1, x2, loop\n");
        assert_eq!(program.labels.get("loop"), Some(&4));
    }

    #[test]
    fn test_label_on_own_line() {
        let program = parse("nop\nloop:\naddi x1, x1, 1\n");
        assert_eq!(program.labels.get("loop"), Some(&4));
    }

    #[test]
    fn test_duplicate_label_is_an_error() {
        let mut program = AssemblyProgram::new();
        let result = program.parse_source("loop: nop\nloop: nop\n");
        assert!(matches!(result, Err(AssemblyError::Line { line, .. }) if line.line == 2));
    }

    #[test]
    fn test_directives_do_not_advance_address() {
        let program = parse(".text\nnop\n.align 2\naddi x1, x1, 1\n");
        assert_eq!(program.parsed_lines.len(), 3); // nop, addi, halt
        assert_eq!(program.skipped_directives.len(), 2);
        assert_eq!(program.skipped_directives[0].1, ".text");
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let program = parse("# a comment\n\naddi x1, x0, 5 # trailing\n");
        assert_eq!(program.parsed_lines.len(), 2); // addi, halt
        assert_eq!(program.parsed_lines[0].args, vec!["x1", "x0", "5"]);
    }

    #[test]
    fn test_pseudo_single_keeps_line_number() {
        let program = parse("nop\n");
        assert_eq!(program.parsed_lines[0].instruction, "addi");
        assert_eq!(program.parsed_lines[0].line_number, LineNo::new(1));
    }

    #[test]
    fn test_pseudo_multiple_gets_sub_numbers() {
        let program = parse("big: li x5, 0x12345\n");
        let lines = &program.parsed_lines;
        assert_eq!(lines.len(), 3); // lui, addi, halt
        assert_eq!(lines[0].instruction, "lui");
        assert_eq!(lines[0].line_number.to_string(), "1.1");
        assert_eq!(lines[0].label.as_deref(), Some("big"));
        assert_eq!(lines[1].instruction, "addi");
        assert_eq!(lines[1].line_number.to_string(), "1.2");
        assert_eq!(lines[1].label, None);
        assert_eq!(program.labels.get("big"), Some(&0));
    }

    #[test]
    fn test_pseudo_expansion_error_carries_line() {
        let mut program = AssemblyProgram::new();
        let result = program.parse_source("nop\nmv x1\n");
        assert!(matches!(result, Err(AssemblyError::Line { line, .. }) if line.line == 2));
    }

    #[test]
    fn test_line_numbers_continue_across_files() {
        let mut program = AssemblyProgram::new();
        program.parse_source("nop\nnop\n").unwrap();
        program.parse_source("addi x1, x0, 1\n").unwrap();
        assert_eq!(program.parsed_lines[2].line_number, LineNo::new(3));
    }

    #[test]
    fn test_emit_counts_and_addresses() {
        let program = parse("nop\naddi x1, x0, 5\n");
        let encoded = program.emit().unwrap();
        assert_eq!(encoded.len(), program.parsed_lines.len());
        assert_eq!(encoded[0].address, 0);
        assert_eq!(encoded[1].address, 4);
        assert_eq!(encoded[2].bits.hex(), "00000000"); // halt
    }

    #[test]
    fn test_emit_error_names_the_line() {
        let program = parse("nop\naddi x1, x0, 99999\n");
        match program.emit() {
            Err(AssemblyError::Line {
                line, instruction, ..
            }) => {
                assert_eq!(line.line, 2);
                assert_eq!(instruction, "addi");
            }
            other => panic!("expected a line error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_mem_hex_with_annotations() {
        let program = parse("addi x1, x0, 5\n");
        let encoded = program.emit().unwrap();
        let rendered = program.render_mem(&encoded, true, true);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "00500093 // PC=0x0 line=1: addi x1, x0, 5");
        assert_eq!(lines[1], "00000000 // PC=0x4 line=-1: ");
    }

    #[test]
    fn test_render_mem_binary_has_no_annotations() {
        let program = parse("addi x1, x0, 5\n");
        let encoded = program.emit().unwrap();
        let rendered = program.render_mem(&encoded, false, true);
        assert_eq!(
            rendered.lines().next().unwrap(),
            "00000000010100000000000010010011"
        );
    }

    #[test]
    fn test_render_source_map() {
        let program = parse("nop\nloop: nop\nnop\n");
        let encoded = program.emit().unwrap();
        let rendered = program.render_source_map(&encoded);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "00000000 1: root");
        assert_eq!(lines[1], "00000004 2: loop");
        assert_eq!(lines[2], "00000008 3: loop");
    }
}
