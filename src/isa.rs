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

//! Static RV32I tables: register names, format classes, opcodes, funct3
//! codes and their reverse mappings.

// primary opcodes
pub const OPCODE_OP: u32 = 0b0110011;
pub const OPCODE_OP_IMM: u32 = 0b0010011;
pub const OPCODE_LOAD: u32 = 0b0000011;
pub const OPCODE_STORE: u32 = 0b0100011;
pub const OPCODE_BRANCH: u32 = 0b1100011;
pub const OPCODE_JAL: u32 = 0b1101111;
pub const OPCODE_JALR: u32 = 0b1100111;
pub const OPCODE_LUI: u32 = 0b0110111;
pub const OPCODE_AUIPC: u32 = 0b0010111;

/// funct7 for sub, sra and srai; every other base instruction uses zero.
pub const FUNCT7_ALT: u32 = 0b0100000;

/// ABI names by register number; the canonical spelling the disassembler
/// prints (`x8` prints as `fp`).
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "fp", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Resolves `x0..x31` and every ABI alias to the register number.
pub fn register_number(name: &str) -> Option<u32> {
    let number = match name {
        "x0" | "zero" => 0,
        "x1" | "ra" => 1,
        "x2" | "sp" => 2,
        "x3" | "gp" => 3,
        "x4" | "tp" => 4,
        "x5" | "t0" => 5,
        "x6" | "t1" => 6,
        "x7" | "t2" => 7,
        "x8" | "s0" | "fp" => 8,
        "x9" | "s1" => 9,
        "x10" | "a0" => 10,
        "x11" | "a1" => 11,
        "x12" | "a2" => 12,
        "x13" | "a3" => 13,
        "x14" | "a4" => 14,
        "x15" | "a5" => 15,
        "x16" | "a6" => 16,
        "x17" | "a7" => 17,
        "x18" | "s2" => 18,
        "x19" | "s3" => 19,
        "x20" | "s4" => 20,
        "x21" | "s5" => 21,
        "x22" | "s6" => 22,
        "x23" | "s7" => 23,
        "x24" | "s8" => 24,
        "x25" | "s9" => 25,
        "x26" | "s10" => 26,
        "x27" | "s11" => 27,
        "x28" | "t3" => 28,
        "x29" | "t4" => 29,
        "x30" | "t5" => 30,
        "x31" | "t6" => 31,
        _ => return None,
    };
    Some(number)
}

pub fn register_name(number: u32) -> &'static str {
    ABI_NAMES[(number & 0x1f) as usize]
}

/// Format class of a mnemonic. Loads share the I layout but parse their
/// operands differently, so they get their own class, matching the way the
/// encoder dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    L,
    S,
    B,
    U,
    J,
    Halt,
}

pub fn format_of(mnemonic: &str) -> Option<Format> {
    let format = match mnemonic {
        "add" | "sub" | "xor" | "or" | "and" | "sll" | "srl" | "sra" | "slt" | "sltu" => Format::R,
        "addi" | "xori" | "ori" | "andi" | "slli" | "srli" | "srai" | "slti" | "sltiu"
        | "jalr" => Format::I,
        "lb" | "lh" | "lw" | "lbu" | "lhu" => Format::L,
        "sb" | "sh" | "sw" => Format::S,
        "beq" | "bne" | "blt" | "bge" | "bltu" | "bgeu" => Format::B,
        "lui" | "auipc" => Format::U,
        "jal" => Format::J,
        "halt" => Format::Halt,
        _ => return None,
    };
    Some(format)
}

/// 7-bit primary opcode for a mnemonic. `halt` has none; it encodes to the
/// all-zero word.
pub fn opcode_of(mnemonic: &str) -> Option<u32> {
    let opcode = match format_of(mnemonic)? {
        Format::R => OPCODE_OP,
        Format::I if mnemonic == "jalr" => OPCODE_JALR,
        Format::I => OPCODE_OP_IMM,
        Format::L => OPCODE_LOAD,
        Format::S => OPCODE_STORE,
        Format::B => OPCODE_BRANCH,
        Format::U if mnemonic == "lui" => OPCODE_LUI,
        Format::U => OPCODE_AUIPC,
        Format::J => OPCODE_JAL,
        Format::Halt => return None,
    };
    Some(opcode)
}

pub fn funct3_of(mnemonic: &str) -> Option<u32> {
    let funct3 = match mnemonic {
        "add" | "sub" | "addi" | "lb" | "sb" | "beq" | "jalr" => 0b000,
        "sll" | "slli" | "lh" | "sh" | "bne" => 0b001,
        "slt" | "slti" | "lw" | "sw" => 0b010,
        "sltu" | "sltiu" => 0b011,
        "xor" | "xori" | "lbu" | "blt" => 0b100,
        "srl" | "sra" | "srli" | "srai" | "lhu" | "bge" => 0b101,
        "or" | "ori" | "bltu" => 0b110,
        "and" | "andi" | "bgeu" => 0b111,
        _ => return None,
    };
    Some(funct3)
}

// Reverse funct3 tables, one per opcode class. add/sub and srl/sra (and the
// shift immediates) need funct7 on top and are disambiguated by the decoder.

pub fn rtype_for_funct3(funct3: u32) -> Option<&'static str> {
    match funct3 {
        0b001 => Some("sll"),
        0b010 => Some("slt"),
        0b011 => Some("sltu"),
        0b100 => Some("xor"),
        0b110 => Some("or"),
        0b111 => Some("and"),
        _ => None,
    }
}

pub fn itype_for_funct3(funct3: u32) -> Option<&'static str> {
    match funct3 {
        0b000 => Some("addi"),
        0b001 => Some("slli"),
        0b010 => Some("slti"),
        0b011 => Some("sltiu"),
        0b100 => Some("xori"),
        0b110 => Some("ori"),
        0b111 => Some("andi"),
        _ => None,
    }
}

pub fn load_for_funct3(funct3: u32) -> Option<&'static str> {
    match funct3 {
        0b000 => Some("lb"),
        0b001 => Some("lh"),
        0b010 => Some("lw"),
        0b100 => Some("lbu"),
        0b101 => Some("lhu"),
        _ => None,
    }
}

pub fn store_for_funct3(funct3: u32) -> Option<&'static str> {
    match funct3 {
        0b000 => Some("sb"),
        0b001 => Some("sh"),
        0b010 => Some("sw"),
        _ => None,
    }
}

pub fn branch_for_funct3(funct3: u32) -> Option<&'static str> {
    match funct3 {
        0b000 => Some("beq"),
        0b001 => Some("bne"),
        0b100 => Some("blt"),
        0b101 => Some("bge"),
        0b110 => Some("bltu"),
        0b111 => Some("bgeu"),
        _ => None,
    }
}
