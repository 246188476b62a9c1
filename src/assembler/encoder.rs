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

//! Translates parsed lines into 32-bit instruction words. The branch and
//! jump arms hold the immediate bit scrambling, the single most error-prone
//! piece of the encoding; the field orders there mirror the R/I/S/B/U/J
//! layout diagrams of the ISA manual, most significant field first.

use crate::assembler::label_table::{LabelTable, get_label};
use crate::ast::ParsedLine;
use crate::bits::BitPack;
use crate::errors::AssemblyError;
use crate::immediate::{check_imm, parse_int_immediate};
use crate::isa;
use crate::isa::Format;

/// Encodes one parsed line at its final byte address. Branch and jump
/// offsets are computed against `address` using the finished label table.
pub fn encode_line(
    line: &ParsedLine,
    labels: &LabelTable,
    address: u32,
) -> Result<BitPack, AssemblyError> {
    let bits = match isa::format_of(&line.instruction) {
        Some(Format::R) => match encode_rtype(line) {
            // GCC likes to forget the i on immediate instructions; if a
            // register failed to resolve, retry once with the i restored.
            Err(AssemblyError::UnknownRegister(_))
                if isa::format_of(&format!("{}i", line.instruction)).is_some() =>
            {
                let mut retry = line.clone();
                retry.instruction = format!("{}i", line.instruction);
                return encode_line(&retry, labels, address);
            }
            result => result?,
        },
        Some(Format::I) => encode_itype(line)?,
        Some(Format::L) => encode_load(line)?,
        Some(Format::S) => encode_store(line)?,
        Some(Format::B) => encode_branch(line, labels, address)?,
        Some(Format::U) => encode_upper(line)?,
        Some(Format::J) => encode_jump(line, labels, address)?,
        Some(Format::Halt) => BitPack::zeroed(32),
        None => return Err(AssemblyError::UnknownMnemonic(line.instruction.clone())),
    };
    if bits.len() != 32 {
        return Err(AssemblyError::InternalWidth(bits.len()));
    }
    Ok(bits)
}

fn register_bits(name: &str) -> Result<BitPack, AssemblyError> {
    let number = isa::register_number(name.trim())
        .ok_or_else(|| AssemblyError::UnknownRegister(name.to_string()))?;
    BitPack::from_uint(number as u64, 5)
}

fn funct3_bits(mnemonic: &str) -> Result<BitPack, AssemblyError> {
    let funct3 = isa::funct3_of(mnemonic)
        .ok_or_else(|| AssemblyError::UnknownMnemonic(mnemonic.to_string()))?;
    BitPack::from_uint(funct3 as u64, 3)
}

fn opcode_bits(mnemonic: &str) -> Result<BitPack, AssemblyError> {
    let opcode = isa::opcode_of(mnemonic)
        .ok_or_else(|| AssemblyError::UnknownMnemonic(mnemonic.to_string()))?;
    BitPack::from_uint(opcode as u64, 7)
}

/// Splits an `imm(reg)` operand: a decimal offset and a register name.
fn parse_offset_operand(operand: &str) -> Result<(i64, &str), AssemblyError> {
    let malformed = || AssemblyError::MalformedOperand {
        reason: format!("immediate offset incorrectly formatted: {operand}"),
    };
    let (imm, register) = operand
        .trim()
        .strip_suffix(')')
        .and_then(|rest| rest.split_once('('))
        .ok_or_else(malformed)?;
    let digits = imm.strip_prefix('-').unwrap_or(imm);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if register.is_empty() || !register.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(malformed());
    }
    let value = imm.parse::<i64>().map_err(|_| malformed())?;
    Ok((value, register))
}

/// Half-word offset from the current instruction to a label.
fn label_offset(
    labels: &LabelTable,
    label: &str,
    address: u32,
    bits: u32,
) -> Result<BitPack, AssemblyError> {
    let target = get_label(labels, label.trim())?;
    let offset = (i64::from(target) - i64::from(address)) >> 1;
    check_imm(offset, bits)?;
    BitPack::from_int(offset, bits)
}

fn encode_rtype(line: &ParsedLine) -> Result<BitPack, AssemblyError> {
    let [rd, rs1, rs2] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "R-type instructions require 3 arguments".to_string(),
        });
    };
    let rd = register_bits(rd)?;
    let rs1 = register_bits(rs1)?;
    let rs2 = register_bits(rs2)?;
    let funct7 = match line.instruction.as_str() {
        "sub" | "sra" => BitPack::from_uint(isa::FUNCT7_ALT as u64, 7)?,
        _ => BitPack::zeroed(7),
    };
    Ok(funct7 + rs2 + rs1 + funct3_bits(&line.instruction)? + rd + opcode_bits(&line.instruction)?)
}

fn encode_itype(line: &ParsedLine) -> Result<BitPack, AssemblyError> {
    let [rd, rs1, imm] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "I-type instructions require 3 arguments".to_string(),
        });
    };
    let rd = register_bits(rd)?;
    let rs1 = register_bits(rs1)?;
    let value = parse_int_immediate(imm)?;
    let imm12 = match line.instruction.as_str() {
        // Shifts carry funct7 in the upper immediate bits and take an
        // unsigned 5-bit amount.
        "slli" | "srli" | "srai" => {
            if !(0..32).contains(&value) {
                return Err(AssemblyError::ImmediateRange { value, bits: 5 });
            }
            let funct7 = match line.instruction.as_str() {
                "srai" => BitPack::from_uint(isa::FUNCT7_ALT as u64, 7)?,
                _ => BitPack::zeroed(7),
            };
            funct7 + BitPack::from_uint(value as u64, 5)?
        }
        _ => {
            check_imm(value, 12)?;
            BitPack::from_int(value, 12)?
        }
    };
    Ok(imm12 + rs1 + funct3_bits(&line.instruction)? + rd + opcode_bits(&line.instruction)?)
}

// ex: lw rd, imm(rs1). Same layout as I-type, parsed differently.
fn encode_load(line: &ParsedLine) -> Result<BitPack, AssemblyError> {
    let [rd, offset] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "load instructions require 2 arguments".to_string(),
        });
    };
    let (value, base) = parse_offset_operand(offset)?;
    check_imm(value, 12)?;
    let imm12 = BitPack::from_int(value, 12)?;
    let rs1 = register_bits(base)?;
    let rd = register_bits(rd)?;
    Ok(imm12 + rs1 + funct3_bits(&line.instruction)? + rd + opcode_bits(&line.instruction)?)
}

// ex: sw rs2, imm(rs1). The immediate splits around the register fields.
fn encode_store(line: &ParsedLine) -> Result<BitPack, AssemblyError> {
    let [rs2, offset] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "store instructions require 2 arguments".to_string(),
        });
    };
    let (value, base) = parse_offset_operand(offset)?;
    check_imm(value, 12)?;
    let imm12 = BitPack::from_int(value, 12)?;
    let rs1 = register_bits(base)?;
    let rs2 = register_bits(rs2)?;
    Ok(imm12.slice(0..7)
        + rs2
        + rs1
        + funct3_bits(&line.instruction)?
        + imm12.slice(7..12)
        + opcode_bits(&line.instruction)?)
}

// The branch immediate covers bits [12:1] of the byte offset; bit 0 is
// always zero for aligned targets and is not encoded. Field order:
// imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode.
fn encode_branch(
    line: &ParsedLine,
    labels: &LabelTable,
    address: u32,
) -> Result<BitPack, AssemblyError> {
    let [rs1, rs2, label] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "branch instructions require 3 arguments".to_string(),
        });
    };
    let rs1 = register_bits(rs1)?;
    let rs2 = register_bits(rs2)?;
    let imm12 = label_offset(labels, label, address, 12)?;
    Ok(imm12.slice(0..1)
        + imm12.slice(2..8)
        + rs2
        + rs1
        + funct3_bits(&line.instruction)?
        + imm12.slice(8..12)
        + imm12.slice(1..2)
        + opcode_bits(&line.instruction)?)
}

fn encode_upper(line: &ParsedLine) -> Result<BitPack, AssemblyError> {
    let [rd, upimm] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "U-type instructions require 2 arguments".to_string(),
        });
    };
    let rd = register_bits(rd)?;
    let value = parse_int_immediate(upimm)?;
    check_imm(value, 20)?;
    Ok(BitPack::from_int(value, 20)? + rd + opcode_bits(&line.instruction)?)
}

// The jump immediate is imm[20] | imm[10:1] | imm[11] | imm[19:12].
fn encode_jump(
    line: &ParsedLine,
    labels: &LabelTable,
    address: u32,
) -> Result<BitPack, AssemblyError> {
    let [rd, label] = line.args.as_slice() else {
        return Err(AssemblyError::MalformedOperand {
            reason: "jal requires 2 arguments".to_string(),
        });
    };
    let rd = register_bits(rd)?;
    let imm = label_offset(labels, label, address, 20)?;
    let imm20 = imm.slice(0..1) + imm.slice(10..20) + imm.slice(9..10) + imm.slice(1..9);
    Ok(imm20 + rd + opcode_bits(&line.instruction)?)
}
