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

use crate::errors::AssemblyError;

/// Parses all valid number literals: `0x` hex, `0b` binary, a leading zero
/// selects octal, anything else is decimal. A bare `0` is decimal zero.
/// Does not parse labels. Returns signed values.
pub fn parse_int_immediate(literal: &str) -> Result<i64, AssemblyError> {
    let trimmed = literal.trim().to_lowercase();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.as_str()),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(digits, 8)
    } else {
        digits.parse::<i64>()
    };
    let magnitude = magnitude.map_err(|_| AssemblyError::MalformedOperand {
        reason: format!("invalid integer literal: {literal}"),
    })?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Succeeds iff `value` fits a signed `bits`-wide field, i.e. lies in
/// `[-2^(bits-1), 2^(bits-1))`.
pub fn check_imm(value: i64, bits: u32) -> Result<(), AssemblyError> {
    let limit = 1i64 << (bits - 1);
    if value >= limit || value < -limit {
        return Err(AssemblyError::ImmediateRange { value, bits });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_int_immediate("5").unwrap(), 5);
        assert_eq!(parse_int_immediate("-42").unwrap(), -42);
        assert_eq!(parse_int_immediate(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_hex() {
        assert_eq!(parse_int_immediate("0x12345").unwrap(), 0x12345);
        assert_eq!(parse_int_immediate("0xFF").unwrap(), 255);
        assert_eq!(parse_int_immediate("-0x10").unwrap(), -16);
    }

    #[test]
    fn test_binary() {
        assert_eq!(parse_int_immediate("0b101").unwrap(), 5);
        assert_eq!(parse_int_immediate("-0b10").unwrap(), -2);
    }

    #[test]
    fn test_octal() {
        assert_eq!(parse_int_immediate("017").unwrap(), 15);
        assert_eq!(parse_int_immediate("-010").unwrap(), -8);
    }

    #[test]
    fn test_bare_zero_is_decimal() {
        assert_eq!(parse_int_immediate("0").unwrap(), 0);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_int_immediate("label").is_err());
        assert!(parse_int_immediate("").is_err());
        assert!(parse_int_immediate("-").is_err());
        assert!(parse_int_immediate("0x").is_err());
    }

    #[test]
    fn test_decimal_round_trip() {
        for value in [-2147483648i64, -4096, -1, 0, 1, 4095, 2147483647] {
            assert_eq!(parse_int_immediate(&value.to_string()).unwrap(), value);
        }
    }

    #[test]
    fn test_check_imm_boundaries() {
        assert!(check_imm(-2048, 12).is_ok());
        assert!(check_imm(2047, 12).is_ok());
        assert_eq!(
            check_imm(2048, 12),
            Err(AssemblyError::ImmediateRange {
                value: 2048,
                bits: 12
            })
        );
        assert_eq!(
            check_imm(-2049, 12),
            Err(AssemblyError::ImmediateRange {
                value: -2049,
                bits: 12
            })
        );
    }
}
