//! `--key` argument parsing.

use std::num::ParseIntError;

/// Parse an obfuscation key given as decimal (`90`) or hex (`0x5A`).
pub fn parse_key(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e: ParseIntError| format!("invalid key '{s}': {e}"))?;

    u8::try_from(value).map_err(|_| format!("key {value} out of range (0-255 / 0x00-0xFF)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_key("0"), Ok(0));
        assert_eq!(parse_key("90"), Ok(0x5A));
        assert_eq!(parse_key("255"), Ok(255));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_key("0x5A"), Ok(0x5A));
        assert_eq!(parse_key("0x3f"), Ok(0x3F));
        assert_eq!(parse_key("0XFF"), Ok(0xFF));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(parse_key("256").is_err());
        assert!(parse_key("0x100").is_err());
        assert!(parse_key("-1").is_err());
        assert!(parse_key("0xZZ").is_err());
        assert!(parse_key("").is_err());
    }
}
