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

//! Pseudo-instruction expansion. A closed table mapping each pseudo
//! mnemonic to the real instruction(s) it stands for; expansion is a pure
//! function of the textual operands.

use crate::errors::AssemblyError;
use crate::immediate::{check_imm, parse_int_immediate};

/// Result of expanding a pseudo-instruction: a single replacement keeps the
/// source line as-is, a sequence produces one parsed line per element.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    Single(&'static str, Vec<String>),
    Multiple(Vec<(&'static str, Vec<String>)>),
}

pub fn is_pseudo(mnemonic: &str) -> bool {
    matches!(
        mnemonic,
        "nop" | "mv"
            | "not"
            | "neg"
            | "seqz"
            | "snez"
            | "sltz"
            | "sgtz"
            | "beqz"
            | "bnez"
            | "blez"
            | "bgez"
            | "bltz"
            | "bgtz"
            | "bgt"
            | "ble"
            | "bgtu"
            | "bleu"
            | "j"
            | "jr"
            | "ret"
            | "call"
            | "li"
            | "la"
    )
}

pub fn expand(mnemonic: &str, args: &[String]) -> Result<Expansion, AssemblyError> {
    let expansion = match (mnemonic, args) {
        ("nop", []) => Expansion::Single("addi", strings(&["zero", "zero", "0"])),
        ("mv", [rd, rs1]) => Expansion::Single("addi", vec![rd.clone(), rs1.clone(), "0".into()]),
        ("not", [rd, rs1]) => Expansion::Single("xori", vec![rd.clone(), rs1.clone(), "-1".into()]),
        ("neg", [rd, rs1]) => Expansion::Single("sub", vec![rd.clone(), "zero".into(), rs1.clone()]),
        ("seqz", [rd, rs1]) => {
            Expansion::Single("sltiu", vec![rd.clone(), rs1.clone(), "1".into()])
        }
        ("snez", [rd, rs1]) => {
            Expansion::Single("sltu", vec![rd.clone(), "zero".into(), rs1.clone()])
        }
        ("sltz", [rd, rs1]) => {
            Expansion::Single("slt", vec![rd.clone(), rs1.clone(), "zero".into()])
        }
        ("sgtz", [rd, rs1]) => {
            Expansion::Single("slt", vec![rd.clone(), "zero".into(), rs1.clone()])
        }
        ("beqz", [rs1, offset]) => {
            Expansion::Single("beq", vec![rs1.clone(), "zero".into(), offset.clone()])
        }
        ("bnez", [rs1, offset]) => {
            Expansion::Single("bne", vec![rs1.clone(), "zero".into(), offset.clone()])
        }
        ("blez", [rs1, offset]) => {
            Expansion::Single("bge", vec!["zero".into(), rs1.clone(), offset.clone()])
        }
        ("bgez", [rs1, offset]) => {
            Expansion::Single("bge", vec![rs1.clone(), "zero".into(), offset.clone()])
        }
        ("bltz", [rs1, offset]) => {
            Expansion::Single("blt", vec![rs1.clone(), "zero".into(), offset.clone()])
        }
        ("bgtz", [rs1, offset]) => {
            Expansion::Single("blt", vec!["zero".into(), rs1.clone(), offset.clone()])
        }
        ("bgt", [rs, rt, offset]) => {
            Expansion::Single("blt", vec![rt.clone(), rs.clone(), offset.clone()])
        }
        ("ble", [rs, rt, offset]) => {
            Expansion::Single("bge", vec![rt.clone(), rs.clone(), offset.clone()])
        }
        ("bgtu", [rs, rt, offset]) => {
            Expansion::Single("bltu", vec![rt.clone(), rs.clone(), offset.clone()])
        }
        ("bleu", [rs, rt, offset]) => {
            Expansion::Single("bltu", vec![rt.clone(), rs.clone(), offset.clone()])
        }
        ("j", [offset]) => Expansion::Single("jal", vec!["zero".into(), offset.clone()]),
        ("jr", [rs1]) => {
            Expansion::Single("jalr", vec!["zero".into(), rs1.clone(), "0".into()])
        }
        ("ret", []) => Expansion::Single("jalr", strings(&["zero", "ra", "0"])),
        ("call", [label]) => Expansion::Single("jal", vec!["ra".into(), label.clone()]),
        ("li", [rd, expression]) => return expand_li(rd, expression),
        // Declared but deliberately unimplemented: using it is an error.
        ("la", _) => return Err(AssemblyError::UnknownMnemonic("la".to_string())),
        _ if is_pseudo(mnemonic) => {
            return Err(AssemblyError::MalformedOperand {
                reason: format!(
                    "wrong number of operands for pseudo-instruction {mnemonic}: {}",
                    args.len()
                ),
            });
        }
        _ => return Err(AssemblyError::UnknownMnemonic(mnemonic.to_string())),
    };
    Ok(expansion)
}

fn expand_li(rd: &str, expression: &str) -> Result<Expansion, AssemblyError> {
    let value = parse_int_immediate(expression)?;
    if check_imm(value, 12).is_ok() {
        return Ok(Expansion::Single(
            "addi",
            vec![rd.to_string(), "zero".into(), expression.to_string()],
        ));
    }
    // addi sign-extends its 12-bit immediate. When the low part would read
    // as negative, bump the upper immediate to cancel the -4096.
    let mut imm12 = value & 0xFFF;
    let mut upimm = value >> 12;
    if imm12 >= 0x800 {
        imm12 -= 0x1000;
        upimm += 1;
    }
    Ok(Expansion::Multiple(vec![
        ("lui", vec![rd.to_string(), upimm.to_string()]),
        ("addi", vec![rd.to_string(), rd.to_string(), imm12.to_string()]),
    ]))
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
