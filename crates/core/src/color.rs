//! Color value type, normalized once at the UI boundary

use crate::error::{MagnetBoardError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Longest color text accepted from any source
pub const MAX_COLOR_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Canonical `#RRGGBB` text
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `#RRGGBB`, `#RGB` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.len() > MAX_COLOR_LEN {
            return Err(MagnetBoardError::InvalidColor(format!(
                "{} characters exceeds the {} character limit",
                text.len(),
                MAX_COLOR_LEN
            )));
        }

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| MagnetBoardError::InvalidColor(text.to_string()));
        }

        let lower = text.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args)
                .ok_or_else(|| MagnetBoardError::InvalidColor(text.to_string()));
        }

        Err(MagnetBoardError::InvalidColor(text.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(Rgb::new(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        // #RGB shorthand expands each digit
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Rgb> {
    let channels: Vec<u8> = args
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<Vec<_>>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Rgb::new(*r, *g, *b)),
        _ => None,
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = MagnetBoardError;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::parse(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_in_either_case() {
        assert_eq!(Rgb::parse("#FF0000").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::parse("#00ff7f").unwrap(), Rgb::new(0, 255, 127));
        assert_eq!(Rgb::parse("#fff").unwrap(), Rgb::WHITE);
    }

    #[test]
    fn normalizes_rgb_function_to_hex() {
        let color = Rgb::parse("rgb(255, 0, 16)").unwrap();
        assert_eq!(color.to_hex(), "#FF0010");

        let spaced = Rgb::parse("RGB( 1 ,2,3 )").unwrap();
        assert_eq!(spaced, Rgb::new(1, 2, 3));

        // Lowercase hex input is normalized too
        assert_eq!(Rgb::parse("#ff00aa").unwrap().to_hex(), "#FF00AA");
        assert_eq!(Rgb::parse("#abc").unwrap().to_hex(), "#AABBCC");
    }

    #[test]
    fn every_channel_value_renders_as_six_hex_digits() {
        for v in [0u8, 1, 15, 16, 127, 128, 254, 255] {
            let text = Rgb::parse(&format!("rgb({}, {}, {})", v, 255 - v, v / 2))
                .unwrap()
                .to_hex();
            assert_eq!(text.len(), 7);
            assert!(text.starts_with('#'));
            assert!(text[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(Rgb::parse("").is_err());
        assert!(Rgb::parse("red").is_err());
        assert!(Rgb::parse("#GG0000").is_err());
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("rgb(256, 0, 0)").is_err());
        assert!(Rgb::parse("rgb(1, 2)").is_err());
        assert!(Rgb::parse(&format!("#{}", "0".repeat(70))).is_err());
    }

    #[test]
    fn serde_uses_hex_text() {
        let json = serde_json::to_string(&Rgb::new(0, 0, 255)).unwrap();
        assert_eq!(json, "\"#0000FF\"");
        let back: Rgb = serde_json::from_str("\"rgb(0, 0, 255)\"").unwrap();
        assert_eq!(back, Rgb::new(0, 0, 255));
    }
}
