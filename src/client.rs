//! Remote participant identity and cursor styling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a remote collaborator, either a name or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientId {
    Number(u64),
    Name(String),
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for ClientId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ClientId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ClientId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// An RGB color for a remote cursor or selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl UserColor {
    /// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let inner = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
        let r = parts.next()??;
        let g = parts.next()??;
        let b = parts.next()??;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { r, g, b })
    }
}

impl fmt::Display for UserColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn parse_hex(hex: &str) -> Option<UserColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut digits = hex.chars().filter_map(|c| c.to_digit(16));
            let mut next = || digits.next().and_then(|d| u8::try_from(d * 17).ok());
            Some(UserColor {
                r: next()?,
                g: next()?,
                b: next()?,
            })
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(UserColor {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            })
        }
        _ => None,
    }
}
