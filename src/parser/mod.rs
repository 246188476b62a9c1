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

use pest::Parser;
use pest_derive::Parser;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RiscvParser;

/// One source line reduced to its syntactic parts: an optional label, an
/// optional mnemonic and the raw operand tokens.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawLine {
    pub label: Option<String>,
    pub instruction: Option<String>,
    pub args: Vec<String>,
}

/// Parses one comment-stripped source line. Returns None for lines with no
/// recognizable label or instruction; callers treat those as blank.
pub fn parse_line(text: &str) -> Option<RawLine> {
    let mut pairs = RiscvParser::parse(Rule::line, text).ok()?;
    let line = pairs.next()?;

    let mut raw = RawLine::default();
    for part in line.into_inner() {
        match part.as_rule() {
            Rule::label => {
                raw.label = part
                    .into_inner()
                    .next()
                    .map(|name| name.as_str().to_string());
            }
            Rule::instruction => {
                let mut inner = part.into_inner();
                if let Some(mnemonic) = inner.next() {
                    raw.instruction = Some(mnemonic.as_str().to_string());
                }
                if let Some(operands) = inner.next() {
                    raw.args = operands
                        .into_inner()
                        .map(|operand| operand.as_str().trim().to_string())
                        .filter(|operand| !operand.is_empty())
                        .collect();
                }
            }
            _ => {}
        }
    }

    if raw.label.is_none() && raw.instruction.is_none() {
        None
    } else {
        Some(raw)
    }
}

// ------------- unit tests â€“------------

#[cfg(test)]
mod tests {
    use super::*;
    use pest::*;

    #[test]
    fn test_tokens_for_labeled_instruction() {
        parses_to! {
            parser: RiscvParser,
            input: "loop: addi x1, x0, 5",
            rule: Rule::line,
            tokens: [
                line(0, 20, [
                    label(0, 5, [label_name(0, 4)]),
                    instruction(6, 20, [
                        mnemonic(6, 10),
                        operands(11, 20, [operand(11, 13), operand(15, 17), operand(19, 20)])
                    ])
                ])
            ]
        };
    }

    #[test]
    fn test_tokens_for_bare_label() {
        parses_to! {
            parser: RiscvParser,
            input: "loop:",
            rule: Rule::line,
            tokens: [
                line(0, 5, [label(0, 5, [label_name(0, 4)])])
            ]
        };
    }

    #[test]
    fn test_parse_plain_instruction() {
        let raw = parse_line("add x3, x1, x2").unwrap();
        assert_eq!(raw.label, None);
        assert_eq!(raw.instruction.as_deref(), Some("add"));
        assert_eq!(raw.args, vec!["x3", "x1", "x2"]);
    }

    #[test]
    fn test_parse_label_and_instruction() {
        let raw = parse_line("loop: beq x1, x2, loop").unwrap();
        assert_eq!(raw.label.as_deref(), Some("loop"));
        assert_eq!(raw.instruction.as_deref(), Some("beq"));
        assert_eq!(raw.args, vec!["x1", "x2", "loop"]);
    }

    #[test]
    fn test_parse_label_only() {
        let raw = parse_line("end_loop:").unwrap();
        assert_eq!(raw.label.as_deref(), Some("end_loop"));
        assert_eq!(raw.instruction, None);
        assert!(raw.args.is_empty());
    }

    #[test]
    fn test_parse_offset_operand_stays_raw() {
        let raw = parse_line("lw x5, -4(x2)").unwrap();
        assert_eq!(raw.instruction.as_deref(), Some("lw"));
        assert_eq!(raw.args, vec!["x5", "-4(x2)"]);
    }

    #[test]
    fn test_parse_directive_mnemonic() {
        let raw = parse_line(".globl main").unwrap();
        assert_eq!(raw.instruction.as_deref(), Some(".globl"));
        assert_eq!(raw.args, vec!["main"]);
    }

    #[test]
    fn test_parse_label_with_dots_and_parens() {
        let raw = parse_line(".L3(main):").unwrap();
        assert_eq!(raw.label.as_deref(), Some(".L3(main)"));
    }

    #[test]
    fn test_blank_and_garbage_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("???"), None);
    }

    #[test]
    fn test_garbage_after_label_keeps_label() {
        let raw = parse_line("loop: ???").unwrap();
        assert_eq!(raw.label.as_deref(), Some("loop"));
        assert_eq!(raw.instruction, None);
    }

    #[test]
    fn test_empty_operands_are_dropped() {
        let raw = parse_line("addi x1, , 5").unwrap();
        assert_eq!(raw.args, vec!["x1", "5"]);
    }

    #[test]
    fn test_no_operand_instruction() {
        let raw = parse_line("ret").unwrap();
        assert_eq!(raw.instruction.as_deref(), Some("ret"));
        assert!(raw.args.is_empty());
    }
}
