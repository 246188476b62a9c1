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

//! Recovers textual instructions from 32-bit words. The inverse of the
//! encoder: opcode dispatch, funct7 disambiguation for add/sub and the
//! right shifts, and the branch/jump immediate descrambling.

use crate::bits::BitPack;
use crate::errors::AssemblyError;
use crate::isa;
use std::collections::HashMap;

/// Byte offsets already seen by the caller, mapped to label names. New
/// targets get a synthesized `LABEL_<N>` entry, so successive calls over a
/// word stream agree on names.
pub type TargetLabels = HashMap<i64, String>;

fn decode_error(reason: String) -> AssemblyError {
    AssemblyError::Decode { reason }
}

/// Renders a branch or jump target: the raw byte offset without a label
/// table, otherwise the (possibly newly synthesized) label.
fn format_target(labels: Option<&mut TargetLabels>, offset: i64) -> String {
    match labels {
        None => offset.to_string(),
        Some(map) => {
            if !map.contains_key(&offset) {
                let synthesized = format!("LABEL_{}", map.len());
                map.insert(offset, synthesized);
            }
            let name = &map[&offset];
            format!("{name} # {name} <- {offset}")
        }
    }
}

/// Decodes one instruction word into assembly text.
pub fn disassemble(
    word: u32,
    labels: Option<&mut TargetLabels>,
) -> Result<String, AssemblyError> {
    let bits = BitPack::from_word(word);
    let opcode = bits.slice(25..32).uint() as u32;
    let rd = isa::register_name(bits.slice(20..25).uint() as u32);
    let rs1 = isa::register_name(bits.slice(12..17).uint() as u32);
    let rs2 = isa::register_name(bits.slice(7..12).uint() as u32);
    let funct3 = bits.slice(17..20).uint() as u32;
    let funct7 = bits.slice(0..7).uint() as u32;
    let imm12 = bits.slice(0..12);

    match opcode {
        isa::OPCODE_OP => {
            let op = match funct3 {
                0b000 => match funct7 {
                    0 => "add",
                    isa::FUNCT7_ALT => "sub",
                    _ => {
                        return Err(decode_error(format!(
                            "invalid r-type add/sub funct7: {funct7:07b}"
                        )));
                    }
                },
                0b101 => match funct7 {
                    0 => "srl",
                    isa::FUNCT7_ALT => "sra",
                    _ => {
                        return Err(decode_error(format!(
                            "invalid r-type srl/sra funct7: {funct7:07b}"
                        )));
                    }
                },
                _ => isa::rtype_for_funct3(funct3)
                    .ok_or_else(|| decode_error(format!("invalid r-type funct3: {funct3:03b}")))?,
            };
            Ok(format!("{op} {rd}, {rs1}, {rs2}"))
        }
        isa::OPCODE_OP_IMM => {
            let op = match funct3 {
                0b101 => match funct7 {
                    0 => "srli",
                    isa::FUNCT7_ALT => "srai",
                    _ => {
                        return Err(decode_error(format!(
                            "invalid i-type srli/srai funct7: {funct7:07b}"
                        )));
                    }
                },
                _ => isa::itype_for_funct3(funct3)
                    .ok_or_else(|| decode_error(format!("invalid i-type funct3: {funct3:03b}")))?,
            };
            let immediate = match op {
                // Shift amounts print as the unsigned low five bits.
                "slli" | "srli" | "srai" => imm12.slice(7..12).uint() as i64,
                _ => imm12.int(),
            };
            Ok(format!("{op} {rd}, {rs1}, {immediate}"))
        }
        isa::OPCODE_LOAD => {
            let op = isa::load_for_funct3(funct3)
                .ok_or_else(|| decode_error(format!("invalid load funct3: {funct3:03b}")))?;
            Ok(format!("{op} {rd}, {}({rs1})", imm12.int()))
        }
        isa::OPCODE_STORE => {
            let op = isa::store_for_funct3(funct3)
                .ok_or_else(|| decode_error(format!("invalid s-type funct3: {funct3:03b}")))?;
            let immediate = (bits.slice(0..7) + bits.slice(20..25)).int();
            Ok(format!("{op} {rs2}, {immediate}({rs1})"))
        }
        isa::OPCODE_BRANCH => {
            let op = isa::branch_for_funct3(funct3)
                .ok_or_else(|| decode_error(format!("invalid b-type funct3: {funct3:03b}")))?;
            let mut imm = BitPack::zeroed(12);
            imm.set_slice(0..1, bits.slice(0..1)); // imm[12]
            imm.set_slice(2..8, bits.slice(1..7)); // imm[10:5]
            imm.set_slice(8..12, bits.slice(20..24)); // imm[4:1]
            imm.set_slice(1..2, bits.slice(24..25)); // imm[11]
            let offset = imm.int() * 2;
            Ok(format!(
                "{op} {rs1}, {rs2}, {}",
                format_target(labels, offset)
            ))
        }
        isa::OPCODE_JAL => {
            // imm[20] | imm[19:12] | imm[11] | imm[10:1], reassembled in
            // plain most-significant-first order.
            let imm20 =
                bits.slice(0..1) + bits.slice(12..20) + bits.slice(11..12) + bits.slice(1..11);
            let offset = imm20.int() * 2;
            if offset % 4 != 0 {
                return Err(decode_error(format!(
                    "misaligned jump target: {offset}"
                )));
            }
            Ok(format!("jal {rd}, {}", format_target(labels, offset)))
        }
        isa::OPCODE_JALR => {
            if funct3 != 0 {
                return Err(decode_error(format!(
                    "incorrectly formatted jalr: funct3 should be 000, not {funct3:03b}"
                )));
            }
            Ok(format!("jalr {rd}, {rs1}, {}", imm12.int()))
        }
        isa::OPCODE_LUI => Ok(format!("lui {rd}, {}", bits.slice(0..20).int())),
        isa::OPCODE_AUIPC => Ok(format!("auipc {rd}, {}", bits.slice(0..20).int())),
        _ => Err(decode_error(format!(
            "unsupported opcode: {opcode:07b} ({opcode})"
        ))),
    }
}
