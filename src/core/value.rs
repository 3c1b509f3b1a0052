//! Native value types
//!
//! This module defines the values carried alongside a value descriptor.

use super::value_types::LogicalType;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A single value in one of the native representations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Text
    String(String),
    /// Double precision number
    Number(f64),
    /// 64-bit integer
    Integer(i64),
    /// Arbitrary precision decimal
    BigNumber(Decimal),
    /// Boolean value
    Boolean(bool),
    /// Instant with millisecond precision
    Date(DateTime<Utc>),
    /// Instant with nanosecond precision
    Timestamp(DateTime<Utc>),
    /// Raw bytes, also used for binary-string storage
    Binary(Vec<u8>),
    /// Opaque serialized object
    Serializable(Vec<u8>),
    /// IPv4 or IPv6 address
    InternetAddress(IpAddr),
    /// Offset into an indexed-storage dictionary
    Index(i32),
}

impl Value {
    /// Create a date value, dropping anything below the millisecond
    pub fn date(dt: DateTime<Utc>) -> Self {
        Value::Date(truncate_to_millis(dt))
    }

    /// Create a timestamp value
    pub fn timestamp(dt: DateTime<Utc>) -> Self {
        Value::Timestamp(dt)
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Logical type naturally carried by this value
    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            Value::Null | Value::Index(_) => None,
            Value::String(_) => Some(LogicalType::String),
            Value::Number(_) => Some(LogicalType::Number),
            Value::Integer(_) => Some(LogicalType::Integer),
            Value::BigNumber(_) => Some(LogicalType::BigNumber),
            Value::Boolean(_) => Some(LogicalType::Boolean),
            Value::Date(_) => Some(LogicalType::Date),
            Value::Timestamp(_) => Some(LogicalType::Timestamp),
            Value::Binary(_) => Some(LogicalType::Binary),
            Value::Serializable(_) => Some(LogicalType::Serializable),
            Value::InternetAddress(_) => Some(LogicalType::InternetAddress),
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Integer(_) => "integer",
            Value::BigNumber(_) => "bignumber",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Binary(_) => "binary",
            Value::Serializable(_) => "serializable",
            Value::InternetAddress(_) => "internet address",
            Value::Index(_) => "index",
        }
    }

    /// Get the value as a string slice (zero-copy)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the value as an i64
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a decimal
    pub fn as_big_number(&self) -> Option<Decimal> {
        match self {
            Value::BigNumber(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the instant held by a date or timestamp
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as bytes (zero-copy)
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) | Value::Serializable(b) => Some(b),
            _ => None,
        }
    }

    /// Get the value as an internet address
    pub fn as_internet_address(&self) -> Option<IpAddr> {
        match self {
            Value::InternetAddress(a) => Some(*a),
            _ => None,
        }
    }
}

/// Drop the sub-millisecond part of an instant
pub fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(dt)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::BigNumber(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::date(v)
    }
}

impl From<IpAddr> for Value {
    fn from(v: IpAddr) -> Self {
        Value::InternetAddress(v)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(v: Ipv4Addr) -> Self {
        Value::InternetAddress(IpAddr::V4(v))
    }
}

impl From<Ipv6Addr> for Value {
    fn from(v: Ipv6Addr) -> Self {
        Value::InternetAddress(IpAddr::V6(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_value_from_types() {
        let val: Value = 42.into();
        assert_eq!(val, Value::Integer(42));

        let val: Value = "hello".into();
        assert_eq!(val, Value::String("hello".to_string()));

        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(true));

        let val: Value = Some(1.5).into();
        assert_eq!(val, Value::Number(1.5));

        let val: Value = Option::<i64>::None.into();
        assert_eq!(val, Value::Null);

        let val: Value = Ipv4Addr::new(10, 0, 0, 1).into();
        assert_eq!(val.type_name(), "internet address");
    }

    #[test]
    fn test_date_drops_sub_millis() {
        let dt = Utc
            .timestamp_opt(1_500_000_000, 123_456_789)
            .single()
            .unwrap();
        let val = Value::date(dt);
        assert_eq!(val.as_instant().unwrap().nanosecond(), 123_000_000);

        let val = Value::timestamp(dt);
        assert_eq!(val.as_instant().unwrap().nanosecond(), 123_456_789);
    }

    #[test]
    fn test_value_logical_type() {
        assert_eq!(Value::Null.logical_type(), None);
        assert_eq!(Value::Index(3).logical_type(), None);
        assert_eq!(
            Value::from("x").logical_type(),
            Some(LogicalType::String)
        );
        assert_eq!(
            Value::BigNumber(Decimal::ONE).logical_type(),
            Some(LogicalType::BigNumber)
        );
    }
}
