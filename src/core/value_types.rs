//! Logical type, storage type and trim type definitions
//!
//! The numeric ids are part of the binary descriptor format and must not change.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Logical value types known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[derive(Default)]
pub enum LogicalType {
    /// Generic descriptor without a concrete type
    #[default]
    None = 0,
    /// Double precision floating point number
    Number = 1,
    /// Text
    String = 2,
    /// Point in time with millisecond precision
    Date = 3,
    /// Boolean flag
    Boolean = 4,
    /// 64-bit signed integer
    Integer = 5,
    /// Arbitrary precision decimal
    BigNumber = 6,
    /// Opaque serialized object
    Serializable = 7,
    /// Raw bytes
    Binary = 8,
    /// Point in time with nanosecond precision
    Timestamp = 9,
    /// IPv4 or IPv6 address
    InternetAddress = 10,
}

impl LogicalType {
    /// Every logical type, ordered by id
    pub const ALL: [LogicalType; 11] = [
        LogicalType::None,
        LogicalType::Number,
        LogicalType::String,
        LogicalType::Date,
        LogicalType::Boolean,
        LogicalType::Integer,
        LogicalType::BigNumber,
        LogicalType::Serializable,
        LogicalType::Binary,
        LogicalType::Timestamp,
        LogicalType::InternetAddress,
    ];

    /// Numeric id used in the binary format
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a type by its numeric id
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Convert logical type to its display name
    pub fn to_str(&self) -> &'static str {
        match self {
            LogicalType::None => "None",
            LogicalType::Number => "Number",
            LogicalType::String => "String",
            LogicalType::Date => "Date",
            LogicalType::Boolean => "Boolean",
            LogicalType::Integer => "Integer",
            LogicalType::BigNumber => "BigNumber",
            LogicalType::Serializable => "Serializable",
            LogicalType::Binary => "Binary",
            LogicalType::Timestamp => "Timestamp",
            LogicalType::InternetAddress => "Internet Address",
        }
    }

    /// Check if this type holds a number
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Number | LogicalType::Integer | LogicalType::BigNumber
        )
    }

    /// Check if this type holds a point in time
    pub fn is_temporal(&self) -> bool {
        matches!(self, LogicalType::Date | LogicalType::Timestamp)
    }

    /// Distinct bit mixed into hash codes of values of this type
    pub fn hash_salt(&self) -> u64 {
        1u64 << (self.id() as u32)
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogicalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "-" => Ok(LogicalType::None),
            "number" => Ok(LogicalType::Number),
            "string" => Ok(LogicalType::String),
            "date" => Ok(LogicalType::Date),
            "boolean" => Ok(LogicalType::Boolean),
            "integer" => Ok(LogicalType::Integer),
            "bignumber" => Ok(LogicalType::BigNumber),
            "serializable" => Ok(LogicalType::Serializable),
            "binary" => Ok(LogicalType::Binary),
            "timestamp" => Ok(LogicalType::Timestamp),
            "internet address" | "inet" => Ok(LogicalType::InternetAddress),
            _ => Err(format!("Invalid logical type: '{}'", s)),
        }
    }
}

/// Physical representation of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[derive(Default)]
pub enum StorageType {
    /// The native value itself
    #[default]
    Normal = 0,
    /// Raw bytes decoded through the storage metadata
    BinaryString = 1,
    /// Offset into the descriptor's dictionary
    Indexed = 2,
}

impl StorageType {
    /// Numeric id used in the binary format
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a storage type by its numeric id
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(StorageType::Normal),
            1 => Some(StorageType::BinaryString),
            2 => Some(StorageType::Indexed),
            _ => None,
        }
    }

    /// Convert storage type to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            StorageType::Normal => "normal",
            StorageType::BinaryString => "binary-string",
            StorageType::Indexed => "indexed",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(StorageType::Normal),
            "binary-string" | "binary_string" => Ok(StorageType::BinaryString),
            "indexed" => Ok(StorageType::Indexed),
            _ => Err(format!("Invalid storage type: '{}'", s)),
        }
    }
}

/// Which side of a string is trimmed before parsing and comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[derive(Default)]
pub enum TrimType {
    #[default]
    None = 0,
    Left = 1,
    Right = 2,
    Both = 3,
}

impl TrimType {
    /// Numeric id used in the binary format
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a trim type by its numeric id
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(TrimType::None),
            1 => Some(TrimType::Left),
            2 => Some(TrimType::Right),
            3 => Some(TrimType::Both),
            _ => None,
        }
    }

    /// Convert trim type to its code
    pub fn to_str(&self) -> &'static str {
        match self {
            TrimType::None => "none",
            TrimType::Left => "left",
            TrimType::Right => "right",
            TrimType::Both => "both",
        }
    }

    /// Trim whitespace from the configured side(s)
    pub fn apply<'a>(&self, s: &'a str) -> &'a str {
        match self {
            TrimType::None => s,
            TrimType::Left => s.trim_start(),
            TrimType::Right => s.trim_end(),
            TrimType::Both => s.trim(),
        }
    }

    /// Trim only ASCII spaces from the configured side(s)
    pub fn apply_spaces<'a>(&self, s: &'a str) -> &'a str {
        match self {
            TrimType::None => s,
            TrimType::Left => s.trim_start_matches(' '),
            TrimType::Right => s.trim_end_matches(' '),
            TrimType::Both => s.trim_matches(' '),
        }
    }
}

impl std::fmt::Display for TrimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for TrimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(TrimType::None),
            "left" => Ok(TrimType::Left),
            "right" => Ok(TrimType::Right),
            "both" => Ok(TrimType::Both),
            _ => Err(format!("Invalid trim type: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type_ids() {
        assert_eq!(LogicalType::None.id(), 0);
        assert_eq!(LogicalType::Number.id(), 1);
        assert_eq!(LogicalType::String.id(), 2);
        assert_eq!(LogicalType::InternetAddress.id(), 10);
        for t in LogicalType::ALL {
            assert_eq!(LogicalType::from_id(t.id()), Some(t));
        }
        assert_eq!(LogicalType::from_id(11), None);
        assert_eq!(LogicalType::from_id(-1), None);
    }

    #[test]
    fn test_logical_type_from_str() {
        assert_eq!("String".parse::<LogicalType>().ok(), Some(LogicalType::String));
        assert_eq!(
            "bignumber".parse::<LogicalType>().ok(),
            Some(LogicalType::BigNumber)
        );
        assert_eq!(
            "Internet Address".parse::<LogicalType>().ok(),
            Some(LogicalType::InternetAddress)
        );
        assert_eq!("Decimal".parse::<LogicalType>().ok(), None);
        for t in LogicalType::ALL {
            assert_eq!(t.to_str().parse::<LogicalType>().ok(), Some(t));
        }
    }

    #[test]
    fn test_hash_salts_are_distinct() {
        let mut seen = 0u64;
        for t in LogicalType::ALL {
            assert_eq!(seen & t.hash_salt(), 0);
            seen |= t.hash_salt();
        }
    }

    #[test]
    fn test_storage_type_roundtrip() {
        for s in [
            StorageType::Normal,
            StorageType::BinaryString,
            StorageType::Indexed,
        ] {
            assert_eq!(StorageType::from_id(s.id()), Some(s));
            assert_eq!(s.to_str().parse::<StorageType>().ok(), Some(s));
        }
        assert_eq!(StorageType::from_id(3), None);
    }

    #[test]
    fn test_trim_type_apply() {
        assert_eq!(TrimType::None.apply("  a  "), "  a  ");
        assert_eq!(TrimType::Left.apply("  a  "), "a  ");
        assert_eq!(TrimType::Right.apply("  a  "), "  a");
        assert_eq!(TrimType::Both.apply("\t a \n"), "a");
        assert_eq!(TrimType::Both.apply_spaces("\t a "), "\t a");
        assert_eq!("both".parse::<TrimType>().ok(), Some(TrimType::Both));
    }
}
