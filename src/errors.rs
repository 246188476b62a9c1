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

use crate::ast::LineNo;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Immediate {value} does not fit into {bits} bits")]
    ImmediateRange { value: i64, bits: u32 },

    #[error("Unknown register: {0}")]
    UnknownRegister(String),

    #[error("Unknown instruction: {0}")]
    UnknownMnemonic(String),

    #[error("Label '{0}' was not in the stored table")]
    UnknownLabel(String),

    #[error("Duplicate label definition: {0}")]
    DuplicateLabel(String),

    #[error("Malformed operand: {reason}")]
    MalformedOperand { reason: String },

    #[error("Cannot decode word: {reason}")]
    Decode { reason: String },

    #[error("Internal: encoded instruction is {0} bits instead of 32")]
    InternalWidth(u32),

    #[error("Error on line {line} ({instruction}): {source}\n  original line: {original}")]
    Line {
        line: LineNo,
        instruction: String,
        original: String,
        source: Box<AssemblyError>,
    },
}
