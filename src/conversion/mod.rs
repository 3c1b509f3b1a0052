//! Conversion engine
//!
//! Every descriptor can read a value it owns as any other native type. The
//! `get_*` family resolves the storage representation first, checks that the
//! runtime value matches the declared type, then converts using the
//! descriptor's masks, symbols and conversion switches. Null in gives
//! `Ok(None)` out.

pub mod collation;
pub mod compare;
pub mod date_format;
pub mod narrow;
pub mod number_format;

use crate::core::error::{MetaError, Result};
use crate::core::factory::ValueMetaFactory;
use crate::core::value::{truncate_to_millis, Value};
use crate::core::value_meta::{ValueMeta, DEFAULT_DATE_FORMAT_MASK};
use crate::core::value_types::{LogicalType, TrimType};
use chrono::{DateTime, Utc};
use date_format::{parse_iso8601, DateFormat};
use number_format::{decimal_to_f64, NumberFormat, NumberSymbols, ParsedNumber};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

pub use collation::Collator;
pub use narrow::NarrowConverter;

/// Convert `value`, described by `from`, into the type described by `to`
pub fn convert(value: &Value, from: &ValueMeta, to: &ValueMeta) -> Result<Value> {
    to.convert_data(from, value)
}

/// Interpret a string as a boolean
///
/// `Y`, `YES`, `TRUE` and `1` in any case are true; everything else is false.
/// Empty input has no boolean value.
pub fn convert_string_to_boolean(s: &str) -> Option<bool> {
    if s.is_empty() {
        return None;
    }
    let upper = s.to_uppercase();
    Some(matches!(upper.as_str(), "Y" | "YES" | "TRUE" | "1"))
}

/// Unsigned big-endian integer value of an address
pub fn address_to_u128(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(*v4) as u128,
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

/// Address for an unsigned integer; values above 32 bits become IPv6
pub fn u128_to_address(value: u128) -> IpAddr {
    match u32::try_from(value) {
        Ok(v4) => IpAddr::V4(Ipv4Addr::from(v4)),
        Err(_) => IpAddr::V6(Ipv6Addr::from(value)),
    }
}

fn only_spaces(s: &str) -> bool {
    s.chars().all(|c| c == ' ')
}

impl ValueMeta {
    // ------------------------------------------------------------------
    // Formats
    // ------------------------------------------------------------------

    /// Symbols used by number masks of this descriptor
    pub fn number_symbols(&self) -> NumberSymbols {
        let first = |s: &Option<String>, default: char| {
            s.as_deref()
                .and_then(|v| v.chars().next())
                .unwrap_or(default)
        };
        NumberSymbols {
            decimal: first(&self.decimal_symbol, '.'),
            grouping: first(&self.grouping_symbol, ','),
            currency: self
                .currency_symbol
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "¤".to_string()),
        }
    }

    /// Number mask in effect for the given type
    ///
    /// Conversion metadata, when present, supplies the format.
    pub fn number_format(&self, target: LogicalType) -> NumberFormat {
        if let Some(cm) = self.conversion_metadata.as_deref() {
            return cm.number_format(target);
        }
        let mask = self
            .mask_for(target)
            .unwrap_or_else(|| crate::core::value_meta::DEFAULT_NUMBER_PARSE_MASK.to_string());
        NumberFormat::new(&mask, self.number_symbols())
    }

    /// Date mask in effect for the given type
    pub fn date_format(&self, target: LogicalType) -> Result<DateFormat> {
        if let Some(cm) = self.conversion_metadata.as_deref() {
            return cm.date_format(target);
        }
        let mask = self
            .mask_for(target)
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT_MASK.to_string());
        DateFormat::new(&mask, self.date_format_time_zone, self.date_format_lenient)
    }

    fn uses_default_date_format(&self) -> bool {
        match self.conversion_metadata.as_deref() {
            Some(cm) => cm.uses_default_date_mask(),
            None => self.uses_default_date_mask(),
        }
    }

    fn trim<'a>(&self, s: &'a str) -> &'a str {
        self.trim_type.apply(s)
    }

    // ------------------------------------------------------------------
    // Native resolution
    // ------------------------------------------------------------------

    /// Resolve storage and check the runtime type; `None` for null
    pub(crate) fn native_value<'a>(&self, value: &'a Value) -> Result<Option<Cow<'a, Value>>> {
        if value.is_null() {
            return Ok(None);
        }
        if self.value_type == LogicalType::None {
            return Err(MetaError::unimplemented(format!(
                "{}: the generic descriptor cannot interpret values",
                self
            )));
        }
        let resolved = if self.is_storage_normal() {
            Cow::Borrowed(value)
        } else {
            Cow::Owned(self.convert_to_normal_storage_type(value)?)
        };
        if resolved.is_null() {
            return Ok(None);
        }
        self.check_native(&resolved)?;
        Ok(Some(resolved))
    }

    pub(crate) fn check_native(&self, value: &Value) -> Result<()> {
        match value.logical_type() {
            Some(t) if t == self.value_type => Ok(()),
            _ => Err(MetaError::type_mismatch(
                self.value_type.to_str(),
                value.type_name(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// Read a value as text
    pub fn get_string(&self, value: &Value) -> Result<Option<String>> {
        match self.native_value(value)? {
            Some(native) => self.format_native(&native).map(Some),
            None => Ok(self.null_padding()),
        }
    }

    /// Read a value as a double
    pub fn get_number(&self, value: &Value) -> Result<Option<f64>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let number = match native.as_ref() {
            Value::String(s) => return self.string_to_number(s),
            Value::Number(n) => *n,
            Value::Integer(i) => *i as f64,
            Value::BigNumber(d) => decimal_to_f64(d)?,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Date(d) => d.timestamp_millis() as f64,
            Value::Timestamp(t) => self.timestamp_magnitude(t)? as f64,
            Value::InternetAddress(a) => address_to_u128(a) as f64,
            other => return Err(self.unsupported(other, LogicalType::Number)),
        };
        Ok(Some(number))
    }

    /// Read a value as an integer
    pub fn get_integer(&self, value: &Value) -> Result<Option<i64>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let integer = match native.as_ref() {
            Value::String(s) => return self.string_to_integer(s),
            Value::Number(n) => round_half_up(*n)?,
            Value::Integer(i) => *i,
            Value::BigNumber(d) => d.trunc().to_i64().ok_or_else(|| {
                MetaError::conversion(format!("{}: big number {} does not fit an integer", self, d))
            })?,
            Value::Boolean(b) => *b as i64,
            Value::Date(d) => d.timestamp_millis(),
            Value::Timestamp(t) => self.timestamp_magnitude(t)?,
            Value::InternetAddress(a) => i64::try_from(address_to_u128(a)).map_err(|_| {
                MetaError::conversion(format!("{}: address {} does not fit an integer", self, a))
            })?,
            other => return Err(self.unsupported(other, LogicalType::Integer)),
        };
        Ok(Some(integer))
    }

    /// Read a value as a big number
    pub fn get_big_number(&self, value: &Value) -> Result<Option<Decimal>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let number = match native.as_ref() {
            Value::String(s) => return self.string_to_big_number(s),
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| Decimal::from_f64(*n))
                .ok_or_else(|| {
                    MetaError::conversion(format!("{}: number {} does not fit a big number", self, n))
                })?,
            Value::Integer(i) => Decimal::from(*i),
            Value::BigNumber(d) => *d,
            Value::Boolean(b) => Decimal::from(*b as i64),
            Value::Date(d) => Decimal::from(d.timestamp_millis()),
            Value::Timestamp(t) => Decimal::from(self.timestamp_magnitude(t)?),
            Value::InternetAddress(a) => i128::try_from(address_to_u128(a))
                .ok()
                .and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok())
                .ok_or_else(|| {
                    MetaError::conversion(format!("{}: address {} does not fit a big number", self, a))
                })?,
            other => return Err(self.unsupported(other, LogicalType::BigNumber)),
        };
        Ok(Some(number))
    }

    /// Read a value as a boolean
    pub fn get_boolean(&self, value: &Value) -> Result<Option<bool>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let flag = match native.as_ref() {
            Value::String(s) => return Ok(convert_string_to_boolean(self.trim(s))),
            Value::Number(n) => n.trunc() != 0.0,
            Value::Integer(i) => *i != 0,
            Value::BigNumber(d) => !d.is_zero(),
            Value::Boolean(b) => *b,
            other => return Err(self.unsupported(other, LogicalType::Boolean)),
        };
        Ok(Some(flag))
    }

    /// Read a value as a date with millisecond precision
    pub fn get_date(&self, value: &Value) -> Result<Option<DateTime<Utc>>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let date = match native.as_ref() {
            Value::String(s) => return self.string_to_date(s, LogicalType::Date),
            Value::Number(n) => self.date_from_millis(*n as i64)?,
            Value::Integer(i) => self.date_from_millis(*i)?,
            Value::BigNumber(d) => self.date_from_millis(self.decimal_to_i64(d)?)?,
            Value::Date(d) => *d,
            Value::Timestamp(t) => truncate_to_millis(*t),
            other => return Err(self.unsupported(other, LogicalType::Date)),
        };
        Ok(Some(date))
    }

    /// Read a value as a timestamp with nanosecond precision
    pub fn get_timestamp(&self, value: &Value) -> Result<Option<DateTime<Utc>>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let timestamp = match native.as_ref() {
            Value::String(s) => return self.string_to_date(s, LogicalType::Timestamp),
            Value::Number(n) => self.timestamp_from_magnitude(*n as i64)?,
            Value::Integer(i) => self.timestamp_from_magnitude(*i)?,
            Value::BigNumber(d) => self.timestamp_from_magnitude(self.decimal_to_i64(d)?)?,
            Value::Date(d) | Value::Timestamp(d) => *d,
            other => return Err(self.unsupported(other, LogicalType::Timestamp)),
        };
        Ok(Some(timestamp))
    }

    /// Read a value as raw bytes
    pub fn get_binary(&self, value: &Value) -> Result<Option<Vec<u8>>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        match native.as_ref() {
            Value::Binary(b) | Value::Serializable(b) => Ok(Some(b.clone())),
            Value::String(s) => Ok(Some(s.as_bytes().to_vec())),
            other => Ok(Some(self.format_native(other)?.into_bytes())),
        }
    }

    /// Read a value as an internet address
    pub fn get_internet_address(&self, value: &Value) -> Result<Option<IpAddr>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let addr = match native.as_ref() {
            Value::InternetAddress(a) => *a,
            Value::String(s) => {
                let s = self.trim(s);
                if s.is_empty() {
                    return Ok(None);
                }
                IpAddr::from_str(s).map_err(|e| {
                    MetaError::conversion(format!(
                        "{}: couldn't convert string [{}] to an internet address: {}",
                        self, s, e
                    ))
                })?
            }
            Value::Integer(i) => u128::try_from(*i).map(u128_to_address).map_err(|_| {
                MetaError::conversion(format!("{}: negative integer {} is not an address", self, i))
            })?,
            Value::BigNumber(d) => d
                .trunc()
                .to_u128()
                .map(u128_to_address)
                .ok_or_else(|| {
                    MetaError::conversion(format!("{}: big number {} is not an address", self, d))
                })?,
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => u128_to_address(*n as u128),
            other => return Err(self.unsupported(other, LogicalType::InternetAddress)),
        };
        Ok(Some(addr))
    }

    /// Read a value as an opaque serialized object
    pub fn get_serializable(&self, value: &Value) -> Result<Option<Vec<u8>>> {
        let native = match self.native_value(value)? {
            Some(v) => v,
            None => return Ok(None),
        };
        match native.as_ref() {
            Value::Serializable(b) | Value::Binary(b) => Ok(Some(b.clone())),
            other => Err(self.unsupported(other, LogicalType::Serializable)),
        }
    }

    // ------------------------------------------------------------------
    // Conversions between descriptors
    // ------------------------------------------------------------------

    /// Convert a value described by `source` into this descriptor's type
    ///
    /// The result uses normal storage.
    pub fn convert_data(&self, source: &ValueMeta, value: &Value) -> Result<Value> {
        let converted = match self.value_type {
            LogicalType::String => source.get_string(value)?.map(Value::String),
            LogicalType::Number => source.get_number(value)?.map(Value::Number),
            LogicalType::Integer => source.get_integer(value)?.map(Value::Integer),
            LogicalType::BigNumber => source.get_big_number(value)?.map(Value::BigNumber),
            LogicalType::Boolean => source.get_boolean(value)?.map(Value::Boolean),
            LogicalType::Date => source.get_date(value)?.map(Value::Date),
            LogicalType::Timestamp => source.get_timestamp(value)?.map(Value::Timestamp),
            LogicalType::Binary => source.get_binary(value)?.map(Value::Binary),
            LogicalType::Serializable => source.get_serializable(value)?.map(Value::Serializable),
            LogicalType::InternetAddress => source
                .get_internet_address(value)?
                .map(Value::InternetAddress),
            LogicalType::None => {
                return Err(MetaError::conversion(format!(
                    "{}: unable to convert data to type None",
                    self
                )))
            }
        };
        Ok(converted.unwrap_or(Value::Null))
    }

    /// Retype a value through the conversion metadata
    pub fn convert_data_using_conversion_metadata(&self, value: &Value) -> Result<Value> {
        let cm = self.conversion_metadata.as_deref().ok_or_else(|| {
            MetaError::invalid_metadata(format!(
                "{}: no conversion metadata to convert with",
                self
            ))
        })?;
        cm.convert_data(self, value)
    }

    /// Convert a string read from a text source
    ///
    /// `convert_meta` describes the text (masks and symbols); `null_if` is a
    /// marker meaning "null", `if_null` a replacement for missing input.
    pub fn convert_data_from_string(
        &self,
        pol: Option<&str>,
        convert_meta: &ValueMeta,
        null_if: Option<&str>,
        if_null: Option<&str>,
        trim_type: TrimType,
    ) -> Result<Value> {
        let is_string = self.is_string();
        let empty_value = if is_string {
            Value::String(String::new())
        } else {
            Value::Null
        };
        let null_value = null_if.unwrap_or("");

        let mut pol: Option<Cow<str>> = pol.map(Cow::Borrowed);
        if let Some(replacement) = if_null.filter(|r| !r.is_empty()) {
            let missing = match pol.as_deref() {
                None => true,
                Some(p) => p.is_empty() || matches_null_marker(p, null_value),
            };
            if missing {
                pol = Some(Cow::Owned(replacement.to_string()));
            }
        }

        if pol.is_none() && is_string && self.config.null_string_becomes_empty() {
            pol = Some(Cow::Borrowed(""));
        }

        let pol = match pol {
            None => return Ok(Value::Null),
            Some(p) if p.is_empty() && !is_string => return Ok(Value::Null),
            Some(p) => p,
        };

        if !null_value.is_empty() {
            if matches_null_marker(&pol, null_value) {
                return Ok(empty_value);
            }
        } else if only_spaces(&pol) && !self.config.do_not_normalize_spaces_only_string_to_empty {
            return Ok(empty_value);
        }

        let trimmed = trim_type.apply_spaces(&pol);
        self.convert_data(convert_meta, &Value::String(trimmed.to_string()))
    }

    /// Parse text using this descriptor's masks and symbols
    pub fn from_string(&self, text: Option<&str>) -> Result<Value> {
        let string_meta = ValueMetaFactory::clone_value_meta(self, LogicalType::String)?;
        self.convert_data_from_string(text, &string_meta, None, None, self.trim_type)
    }

    /// Format a value as text; alias of [`ValueMeta::get_string`]
    pub fn to_string_value(&self, value: &Value) -> Result<Option<String>> {
        self.get_string(value)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Format a native value with this descriptor's masks
    pub(crate) fn format_native(&self, native: &Value) -> Result<String> {
        let text = match native {
            Value::String(s) => self.trim(s).to_string(),
            Value::Number(n) => self.number_format(LogicalType::Number).format_f64(*n),
            Value::Integer(i) => self.number_format(LogicalType::Integer).format_i64(*i),
            Value::BigNumber(d) => self
                .number_format(LogicalType::BigNumber)
                .format_decimal(d),
            Value::Date(d) => self.date_format(LogicalType::Date)?.format(d),
            Value::Timestamp(t) => self.date_format(LogicalType::Timestamp)?.format(t),
            Value::Boolean(b) => self.boolean_to_string(*b),
            Value::Binary(b) => String::from_utf8_lossy(b).into_owned(),
            Value::InternetAddress(a) => a.to_string(),
            other => return Err(self.unsupported(other, LogicalType::String)),
        };
        Ok(text)
    }

    fn boolean_to_string(&self, b: bool) -> String {
        let text = match (self.length >= 3, b) {
            (true, true) => "true",
            (true, false) => "false",
            (false, true) => "Y",
            (false, false) => "N",
        };
        text.to_string()
    }

    fn null_padding(&self) -> Option<String> {
        let padded = self.output_padding
            && self.length > 0
            && matches!(self.value_type, LogicalType::Number | LogicalType::Integer);
        padded.then(|| " ".repeat(self.length as usize))
    }

    fn unsupported(&self, value: &Value, target: LogicalType) -> MetaError {
        MetaError::conversion(format!(
            "{}: unable to convert {} data to {}",
            self,
            value.type_name(),
            target
        ))
    }

    fn parse_number_text(&self, s: &str, target: LogicalType) -> Result<ParsedNumber> {
        let format = self.number_format(target);
        let total = s.chars().count();
        match format.parse(s) {
            Some(parsed) if parsed.end == total => Ok(parsed),
            Some(parsed) if self.lenient_string_to_number => {
                tracing::trace!(value = s, consumed = parsed.end, "lenient number parse");
                Ok(parsed)
            }
            Some(parsed) => Err(MetaError::conversion(format!(
                "{}: couldn't convert String to {}: non-numeric character found at position {} for value [{}]",
                self,
                target,
                parsed.end + 1,
                s
            ))),
            None => Err(MetaError::conversion(format!(
                "{}: couldn't convert String to {}: unparseable number [{}]",
                self, target, s
            ))),
        }
    }

    fn string_to_number(&self, s: &str) -> Result<Option<f64>> {
        let s = self.trim(s);
        if s.is_empty() {
            return Ok(None);
        }
        self.parse_number_text(s, LogicalType::Number)?
            .to_f64()
            .map(Some)
    }

    fn string_to_integer(&self, s: &str) -> Result<Option<i64>> {
        let s = self.trim(s);
        if s.is_empty() {
            return Ok(None);
        }
        self.parse_number_text(s, LogicalType::Integer)?
            .to_i64()
            .map(Some)
    }

    fn string_to_big_number(&self, s: &str) -> Result<Option<Decimal>> {
        let s = self.trim(s);
        if s.is_empty() {
            return Ok(None);
        }
        let format = self.number_format(LogicalType::BigNumber);
        let total = s.chars().count();
        let parsed = format.parse(s);
        if let Some(p) = parsed.as_ref().filter(|p| p.end == total) {
            return p.to_decimal().map(Some);
        }

        if self.lenient_string_to_number {
            // Grouped input: try both separator conventions before settling for the prefix.
            for (decimal, grouping) in [('.', ','), (',', '.')] {
                let candidate = format.with_separators(decimal, grouping);
                if let Some(p) = candidate.parse(s).filter(|p| p.end == total) {
                    return p.to_decimal().map(Some);
                }
            }
            return match parsed {
                Some(p) => p.to_decimal().map(Some),
                None => Err(MetaError::conversion(format!(
                    "{}: couldn't convert String to BigNumber: unparseable number [{}]",
                    self, s
                ))),
            };
        }

        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Some)
            .map_err(|_| {
                let position = parsed.map(|p| p.end + 1).unwrap_or(1);
                MetaError::conversion(format!(
                    "{}: couldn't convert String to BigNumber: non-numeric character found at position {} for value [{}]",
                    self, position, s
                ))
            })
    }

    fn string_to_date(&self, s: &str, target: LogicalType) -> Result<Option<DateTime<Utc>>> {
        let s = self.trim(s);
        if s.is_empty() {
            return Ok(None);
        }
        let format = self.date_format(target)?;
        let parsed = match format.parse(s) {
            Ok(dt) => dt,
            Err(err) => {
                if !self.uses_default_date_format() {
                    return Err(err);
                }
                let fallback = parse_iso8601(s, &self.date_format_time_zone).ok_or(err)?;
                tracing::debug!(value = s, "parsed date with ISO-8601 fallback");
                fallback
            }
        };
        if target == LogicalType::Date {
            Ok(Some(truncate_to_millis(parsed)))
        } else {
            Ok(Some(parsed))
        }
    }

    fn decimal_to_i64(&self, d: &Decimal) -> Result<i64> {
        d.trunc().to_i64().ok_or_else(|| {
            MetaError::conversion(format!("{}: big number {} does not fit an integer", self, d))
        })
    }

    fn date_from_millis(&self, millis: i64) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            MetaError::conversion(format!("{}: {} ms is outside the date range", self, millis))
        })
    }

    /// Integer magnitude of a timestamp under the configured mode
    ///
    /// Legacy mode reads and writes milliseconds, so a timestamp converted
    /// to a number and back lands on the same millisecond in either mode.
    fn timestamp_magnitude(&self, t: &DateTime<Utc>) -> Result<i64> {
        if self.config.timestamp_number_mode.is_nanoseconds() {
            t.timestamp_nanos_opt().ok_or_else(|| {
                MetaError::conversion(format!(
                    "{}: timestamp {} is outside the nanosecond range",
                    self, t
                ))
            })
        } else {
            Ok(t.timestamp_millis())
        }
    }

    fn timestamp_from_magnitude(&self, v: i64) -> Result<DateTime<Utc>> {
        if self.config.timestamp_number_mode.is_nanoseconds() {
            Ok(DateTime::from_timestamp_nanos(v))
        } else {
            self.date_from_millis(v)
        }
    }
}

fn matches_null_marker(pol: &str, null_value: &str) -> bool {
    let pol_len = pol.chars().count();
    let marker_len = null_value.chars().count();
    if marker_len > pol_len {
        return false;
    }
    let padded = format!("{}{}", null_value, " ".repeat(pol_len - marker_len));
    pol.to_lowercase() == padded.to_lowercase()
}

fn round_half_up(n: f64) -> Result<i64> {
    let rounded = (n + 0.5).floor();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Ok(rounded as i64)
    } else {
        Err(MetaError::conversion(format!(
            "number {} does not fit an integer",
            n
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ConversionConfig, TimestampNumberMode};
    use crate::core::value_types::StorageType;
    use chrono::{Duration, TimeZone, Timelike};

    fn meta(value_type: LogicalType) -> ValueMeta {
        ValueMeta::with_config("test", value_type, ConversionConfig::new())
    }

    fn lenient(value_type: LogicalType) -> ValueMeta {
        ValueMeta::with_config(
            "test",
            value_type,
            ConversionConfig::new().lenient_string_to_number(true),
        )
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_lenient_integer_parsing() {
        let m = lenient(LogicalType::String);
        for (input, expected) in [
            ("1", 1),
            ("1b", 1),
            ("1,5", 1),
            ("1.5", 1),
            ("10,000,000.25", 10),
            ("10.000.000,25", 10),
        ] {
            assert_eq!(m.get_integer(&s(input)).unwrap(), Some(expected), "{}", input);
        }
    }

    #[test]
    fn test_strict_integer_parsing() {
        let m = meta(LogicalType::String);
        for input in ["1a", "1,1", "100,000,3", "100.000,3"] {
            let err = m.get_integer(&s(input)).unwrap_err();
            assert!(err.is_conversion(), "{}", input);
        }
        assert_eq!(m.get_integer(&s("42")).unwrap(), Some(42));
        assert_eq!(m.get_integer(&s("-7")).unwrap(), Some(-7));

        let err = m.get_integer(&s("1a")).unwrap_err();
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_lenient_big_number_uses_full_grouped_value() {
        let m = lenient(LogicalType::String);
        assert_eq!(
            m.get_big_number(&s("10,000,000.25")).unwrap(),
            Some(Decimal::from_str("10000000.25").unwrap())
        );
        assert_eq!(
            m.get_big_number(&s("10.000.000,25")).unwrap(),
            Some(Decimal::from_str("10000000.25").unwrap())
        );
        assert_eq!(
            m.get_big_number(&s("12abc")).unwrap(),
            Some(Decimal::from(12))
        );
    }

    #[test]
    fn test_strict_big_number() {
        let m = meta(LogicalType::String);
        assert_eq!(
            m.get_big_number(&s("100.5")).unwrap(),
            Some(Decimal::from_str("100.5").unwrap())
        );
        assert!(m.get_big_number(&s("1,5")).is_err());
    }

    #[test]
    fn test_getters_without_conversion_mask() {
        let m = meta(LogicalType::String);
        assert_eq!(m.get_integer(&s("100.56")).unwrap(), Some(100));
        assert_eq!(m.get_number(&s("100.56")).unwrap(), Some(100.56));

        let date = m.get_date(&s("2017/10/20 00:00:00.000")).unwrap().unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2017, 10, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_string_is_null_for_numbers() {
        let m = meta(LogicalType::String);
        assert_eq!(m.get_integer(&s("")).unwrap(), None);
        assert_eq!(m.get_number(&s("")).unwrap(), None);
        assert_eq!(m.get_date(&s("")).unwrap(), None);
    }

    #[test]
    fn test_number_to_string_uses_mask() {
        let m = meta(LogicalType::Number);
        assert_eq!(m.get_string(&Value::Number(100.0)).unwrap().unwrap(), "100.0");

        let mut m = meta(LogicalType::Number);
        m.set_conversion_mask(Some("#,##0.00".to_string()));
        m.set_decimal_symbol(Some(",".to_string()));
        m.set_grouping_symbol(Some(".".to_string()));
        assert_eq!(
            m.get_string(&Value::Number(1234.5)).unwrap().unwrap(),
            "1.234,50"
        );

        let m = meta(LogicalType::Integer);
        assert_eq!(m.get_string(&Value::Integer(-12)).unwrap().unwrap(), "-12");
    }

    #[test]
    fn test_integer_padding_for_null() {
        let mut m = meta(LogicalType::Integer);
        m.set_length(4);
        m.set_output_padding(true);
        assert_eq!(m.get_string(&Value::Null).unwrap(), Some("    ".to_string()));
    }

    #[test]
    fn test_number_to_integer_rounds() {
        let m = meta(LogicalType::Number);
        assert_eq!(m.get_integer(&Value::Number(2.5)).unwrap(), Some(3));
        assert_eq!(m.get_integer(&Value::Number(-2.5)).unwrap(), Some(-2));
        assert_eq!(m.get_integer(&Value::Number(2.4)).unwrap(), Some(2));
    }

    #[test]
    fn test_boolean_conversions() {
        let m = meta(LogicalType::String);
        assert_eq!(m.get_boolean(&s("Y")).unwrap(), Some(true));
        assert_eq!(m.get_boolean(&s("yes")).unwrap(), Some(true));
        assert_eq!(m.get_boolean(&s("TRUE")).unwrap(), Some(true));
        assert_eq!(m.get_boolean(&s("N")).unwrap(), Some(false));
        assert_eq!(m.get_boolean(&s("false")).unwrap(), Some(false));
        assert_eq!(m.get_boolean(&s("maybe")).unwrap(), Some(false));
        assert_eq!(m.get_boolean(&s("")).unwrap(), None);
        assert_eq!(m.get_boolean(&Value::Null).unwrap(), None);

        let mut b = meta(LogicalType::Boolean);
        assert_eq!(b.get_string(&Value::Boolean(true)).unwrap().unwrap(), "Y");
        b.set_length(5);
        assert_eq!(b.get_string(&Value::Boolean(false)).unwrap().unwrap(), "false");

        let n = meta(LogicalType::Number);
        assert_eq!(n.get_boolean(&Value::Number(0.5)).unwrap(), Some(false));
        assert_eq!(n.get_boolean(&Value::Number(-3.0)).unwrap(), Some(true));
    }

    #[test]
    fn test_boolean_from_timestamp_fails() {
        let m = meta(LogicalType::Timestamp);
        let err = m.get_boolean(&Value::Timestamp(Utc::now())).unwrap_err();
        assert!(err.is_conversion());
        assert_eq!(m.get_boolean(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let m = meta(LogicalType::Integer);
        let err = m.get_integer(&s("12")).unwrap_err();
        assert!(matches!(err, MetaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_date_number_roundtrip() {
        let d = meta(LogicalType::Date);
        let dt = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        let millis = d.get_integer(&Value::Date(dt)).unwrap().unwrap();
        assert_eq!(millis, dt.timestamp_millis());

        let i = meta(LogicalType::Integer);
        assert_eq!(i.get_date(&Value::Integer(millis)).unwrap(), Some(dt));
    }

    #[test]
    fn test_date_timestamp_precision() {
        let ts_meta = meta(LogicalType::Timestamp);
        let dt = Utc.timestamp_opt(1_600_000_000, 123_456_789).single().unwrap();
        let date = ts_meta.get_date(&Value::Timestamp(dt)).unwrap().unwrap();
        assert_eq!(date.nanosecond(), 123_000_000);

        let date_meta = meta(LogicalType::Date);
        let back = date_meta.get_timestamp(&Value::Date(date)).unwrap().unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_timestamp_nanosecond_mode_roundtrip() {
        let config = ConversionConfig::new().timestamp_number_mode(TimestampNumberMode::Nanoseconds);
        let ts_meta = ValueMeta::with_config("ts", LogicalType::Timestamp, config);
        let int_meta = ValueMeta::with_config("n", LogicalType::Integer, config);

        let dt = Utc.timestamp_opt(1_600_000_000, 123_456_789).single().unwrap();
        let n = int_meta.convert_data(&ts_meta, &Value::Timestamp(dt)).unwrap();
        assert_eq!(n, Value::Integer(1_600_000_000_123_456_789));

        let back = ts_meta.convert_data(&int_meta, &n).unwrap();
        assert_eq!(back, Value::Timestamp(dt));
    }

    #[test]
    fn test_timestamp_millisecond_mode_is_lossy() {
        let config =
            ConversionConfig::new().timestamp_number_mode(TimestampNumberMode::Milliseconds);
        let ts_meta = ValueMeta::with_config("ts", LogicalType::Timestamp, config);
        let int_meta = ValueMeta::with_config("n", LogicalType::Integer, config);

        let dt = Utc.timestamp_opt(1_600_000_000, 123_456_789).single().unwrap();
        let n = int_meta.convert_data(&ts_meta, &Value::Timestamp(dt)).unwrap();
        assert_eq!(n, Value::Integer(1_600_000_000_123));

        let back = ts_meta.convert_data(&int_meta, &n).unwrap();
        assert_eq!(back, Value::Timestamp(dt - Duration::nanoseconds(456_789)));
    }

    #[test]
    fn test_timestamp_legacy_mode_uses_milliseconds_both_ways() {
        let config = ConversionConfig::new().timestamp_number_mode(TimestampNumberMode::Legacy);
        let ts_meta = ValueMeta::with_config("ts", LogicalType::Timestamp, config);
        let int_meta = ValueMeta::with_config("n", LogicalType::Integer, config);

        let back = ts_meta
            .convert_data(&int_meta, &Value::Integer(1_600_000_000_123))
            .unwrap();
        let dt = Utc.timestamp_opt(1_600_000_000, 123_000_000).single().unwrap();
        assert_eq!(back, Value::Timestamp(dt));

        let n = int_meta.convert_data(&ts_meta, &back).unwrap();
        assert_eq!(n, Value::Integer(1_600_000_000_123));
    }

    #[test]
    fn test_date_mask_and_iso_fallback() {
        let mut m = meta(LogicalType::String);
        m.set_conversion_mask(Some("yyyy-MM-dd".to_string()));
        let d = m.get_date(&s("1918-03-25T07:40:03.012+03:00")).unwrap().unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(1918, 3, 25, 0, 0, 0).unwrap());

        let m = meta(LogicalType::String);
        let d = m.get_date(&s("2019-01-01T10:00:00Z")).unwrap().unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2019, 1, 1, 10, 0, 0).unwrap());

        let mut m = meta(LogicalType::String);
        m.set_conversion_mask(Some("dd/MM/yyyy".to_string()));
        assert!(m.get_date(&s("2019-01-01T10:00:00Z")).is_err());
    }

    #[test]
    fn test_date_format_leniency() {
        let mut m = meta(LogicalType::String);
        m.set_conversion_mask(Some("yyyy-MM-dd".to_string()));
        assert!(m.get_date(&s("2021-02-30")).is_err());

        m.set_date_format_lenient(true);
        let d = m.get_date(&s("2021-02-30")).unwrap().unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2021, 3, 2, 0, 0, 0).unwrap());

        let d = m.get_date(&s("2021-00-10")).unwrap().unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2020, 12, 10, 0, 0, 0).unwrap());

        let err = m.get_date(&s("2020-01-999999999999")).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn test_internet_address_conversions() {
        let m = meta(LogicalType::String);
        let addr = m.get_internet_address(&s("192.168.10.1")).unwrap().unwrap();
        assert_eq!(addr, IpAddr::V4(Ipv4Addr::new(192, 168, 10, 1)));

        let a = meta(LogicalType::InternetAddress);
        let n = a.get_integer(&Value::InternetAddress(addr)).unwrap().unwrap();
        assert_eq!(n, 0xC0A8_0A01);

        let i = meta(LogicalType::Integer);
        assert_eq!(i.get_internet_address(&Value::Integer(n)).unwrap(), Some(addr));
        assert!(i.get_internet_address(&Value::Integer(-1)).is_err());

        assert!(m.get_internet_address(&s("not-an-ip")).is_err());
    }

    #[test]
    fn test_convert_data_from_string_null_policy() {
        let string_meta = meta(LogicalType::String);

        let target = meta(LogicalType::String);
        let v = target
            .convert_data_from_string(None, &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::Null);
        let v = target
            .convert_data_from_string(Some(""), &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::String(String::new()));

        let differs = ConversionConfig::new().empty_string_differs_from_null(true);
        let target = ValueMeta::with_config("t", LogicalType::String, differs);
        let v = target
            .convert_data_from_string(None, &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::String(String::new()));

        let keep_null = differs.do_not_normalize_null_string_to_empty(true);
        let target = ValueMeta::with_config("t", LogicalType::String, keep_null);
        let v = target
            .convert_data_from_string(None, &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn test_convert_data_from_string_spaces_and_markers() {
        let string_meta = meta(LogicalType::String);
        let target = meta(LogicalType::String);
        let v = target
            .convert_data_from_string(Some("   "), &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::String(String::new()));

        let keep = ConversionConfig::new().do_not_normalize_spaces_only_string_to_empty(true);
        let target = ValueMeta::with_config("t", LogicalType::String, keep);
        let v = target
            .convert_data_from_string(Some("   "), &string_meta, None, None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::String("   ".to_string()));

        let target = meta(LogicalType::Integer);
        let v = target
            .convert_data_from_string(Some("NA  "), &string_meta, Some("na"), None, TrimType::None)
            .unwrap();
        assert_eq!(v, Value::Null);

        let v = target
            .convert_data_from_string(Some(""), &string_meta, None, Some("7"), TrimType::None)
            .unwrap();
        assert_eq!(v, Value::Integer(7));

        let v = target
            .convert_data_from_string(Some(" 12 "), &string_meta, None, None, TrimType::Both)
            .unwrap();
        assert_eq!(v, Value::Integer(12));
    }

    #[test]
    fn test_conversion_metadata() {
        let mut m = meta(LogicalType::String);
        let mut cm = meta(LogicalType::Integer);
        cm.set_conversion_mask(Some("#,##0".to_string()));
        m.set_conversion_metadata(Some(cm));

        let v = m.convert_data_using_conversion_metadata(&s("1,234")).unwrap();
        assert_eq!(v, Value::Integer(1234));

        let plain = meta(LogicalType::String);
        assert!(plain.convert_data_using_conversion_metadata(&s("1")).is_err());
    }

    #[test]
    fn test_from_string_uses_descriptor_format() {
        let mut d = meta(LogicalType::Date);
        d.set_conversion_mask(Some("dd.MM.yyyy".to_string()));
        let v = d.from_string(Some("24.02.2017")).unwrap();
        assert_eq!(
            v,
            Value::Date(Utc.with_ymd_and_hms(2017, 2, 24, 0, 0, 0).unwrap())
        );
        assert_eq!(d.from_string(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_binary_string_storage_getters() {
        let mut m = meta(LogicalType::Integer);
        m.set_storage_type(StorageType::BinaryString);
        m.set_storage_metadata(Some(meta(LogicalType::String))).unwrap();

        let stored = Value::Binary(b"123".to_vec());
        assert_eq!(m.get_integer(&stored).unwrap(), Some(123));
        assert_eq!(m.get_number(&stored).unwrap(), Some(123.0));
        assert_eq!(m.get_integer(&Value::Binary(Vec::new())).unwrap(), None);
    }

    #[test]
    fn test_generic_descriptor_refuses_values() {
        let m = meta(LogicalType::None);
        assert!(matches!(
            m.get_string(&s("x")),
            Err(MetaError::Unimplemented(_))
        ));
        assert!(m.convert_data(&meta(LogicalType::String), &s("x")).is_err());
    }
}
