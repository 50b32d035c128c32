use serde::{Deserialize, Serialize};

/// Numeric precision descriptor attached to weights and derived attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Fixed { width: u32, integer: u32, signed: bool },
    Int { width: u32, signed: bool },
}

impl Precision {
    pub fn fixed(width: u32, integer: u32) -> Self {
        Precision::Fixed {
            width,
            integer,
            signed: true,
        }
    }

    pub fn int(width: u32) -> Self {
        Precision::Int {
            width,
            signed: true,
        }
    }

    pub fn uint(width: u32) -> Self {
        Precision::Int {
            width,
            signed: false,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Precision::Fixed { width, .. } | Precision::Int { width, .. } => *width,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precision::Fixed {
                width,
                integer,
                signed,
            } => write!(f, "ac_fixed<{},{},{}>", width, integer, signed),
            Precision::Int { width, signed } => write!(f, "ac_int<{},{}>", width, signed),
        }
    }
}

/// A named type definition consumed by the source emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub precision: Precision,
}

impl NamedType {
    pub fn new(name: impl Into<String>, precision: Precision) -> Self {
        Self {
            name: name.into(),
            precision,
        }
    }
}
