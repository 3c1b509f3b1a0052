//! Binary codec for descriptors and values
//!
//! All integers are big-endian. Strings are an `i32` byte length followed by
//! UTF-8 bytes, with length `-1` marking a missing string. A descriptor
//! starts with its type id; [`ValueMeta::read_meta`] consumes it and
//! [`ValueMeta::read_meta_data`] reads the remaining fields for a known type.

use super::config::ConversionConfig;
use super::error::{MetaError, Result};
use super::value::Value;
use super::value_meta::ValueMeta;
use super::value_types::{LogicalType, StorageType, TrimType};
use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

impl ValueMeta {
    /// Write the full descriptor, type id first
    pub fn write_meta<W: Write>(&self, w: &mut W) -> Result<()> {
        write_i32(w, self.value_type.id())?;
        self.write_meta_data(w)
    }

    /// Write every descriptor field after the type id
    pub fn write_meta_data<W: Write>(&self, w: &mut W) -> Result<()> {
        write_i32(w, self.storage_type.id())?;
        write_i32(w, self.length)?;
        write_i32(w, self.precision)?;
        write_string(w, Some(&self.name))?;
        write_string(w, self.origin.as_deref())?;
        write_string(w, self.comments.as_deref())?;
        write_string(w, self.conversion_mask.as_deref())?;
        write_string(w, self.decimal_symbol.as_deref())?;
        write_string(w, self.grouping_symbol.as_deref())?;
        write_string(w, self.currency_symbol.as_deref())?;
        write_i32(w, self.trim_type.id())?;
        write_bool(w, self.case_insensitive)?;
        write_bool(w, self.sorted_descending)?;
        write_bool(w, self.output_padding)?;
        write_bool(w, self.date_format_lenient)?;
        write_bool(w, self.lenient_string_to_number)?;
        write_string(w, self.date_format_locale.as_deref())?;
        write_string(w, Some(self.date_format_time_zone.name()))?;
        write_bool(w, self.collator_disabled)?;
        write_string(w, Some(&self.collator_locale))?;
        write_i32(w, self.collator_strength)?;
        write_bool(w, self.large_text_field)?;

        match self.storage_type {
            StorageType::Indexed => match &self.index {
                Some(index) => {
                    write_i32(w, len_i32(index.len())?)?;
                    for entry in index {
                        self.write_native(w, entry)?;
                    }
                }
                None => write_i32(w, -1)?,
            },
            StorageType::BinaryString => {
                write_bool(w, self.storage_metadata.is_some())?;
                if let Some(sm) = &self.storage_metadata {
                    sm.write_meta(w)?;
                }
            }
            StorageType::Normal => {}
        }

        write_bool(w, self.conversion_metadata.is_some())?;
        if let Some(cm) = &self.conversion_metadata {
            cm.write_meta(w)?;
        }
        Ok(())
    }

    /// Read a descriptor written by [`ValueMeta::write_meta`]
    pub fn read_meta<R: Read>(r: &mut R) -> Result<ValueMeta> {
        let type_id = read_i32(r)?;
        let value_type = LogicalType::from_id(type_id)
            .ok_or_else(|| MetaError::plugin_lookup(format!("type id {}", type_id)))?;
        Self::read_meta_data(value_type, r)
    }

    /// Read the descriptor fields that follow an already consumed type id
    pub fn read_meta_data<R: Read>(value_type: LogicalType, r: &mut R) -> Result<ValueMeta> {
        let mut meta = ValueMeta::with_config("", value_type, ConversionConfig::current());

        let storage_id = read_i32(r)?;
        meta.storage_type = StorageType::from_id(storage_id).ok_or_else(|| {
            MetaError::invalid_metadata(format!("unknown storage type id {}", storage_id))
        })?;
        meta.length = read_i32(r)?;
        meta.precision = read_i32(r)?;
        meta.name = read_string(r)?.unwrap_or_default();
        meta.origin = read_string(r)?;
        meta.comments = read_string(r)?;
        meta.conversion_mask = read_string(r)?;
        meta.decimal_symbol = read_string(r)?;
        meta.grouping_symbol = read_string(r)?;
        meta.currency_symbol = read_string(r)?;
        let trim_id = read_i32(r)?;
        meta.trim_type = TrimType::from_id(trim_id).ok_or_else(|| {
            MetaError::invalid_metadata(format!("unknown trim type id {}", trim_id))
        })?;
        meta.case_insensitive = read_bool(r)?;
        meta.sorted_descending = read_bool(r)?;
        meta.output_padding = read_bool(r)?;
        meta.date_format_lenient = read_bool(r)?;
        meta.lenient_string_to_number = read_bool(r)?;
        meta.date_format_locale = read_string(r)?;
        meta.date_format_time_zone = match read_string(r)? {
            Some(name) => Tz::from_str(&name).map_err(|_| {
                MetaError::invalid_metadata(format!("unknown time zone '{}'", name))
            })?,
            None => Tz::UTC,
        };
        meta.collator_disabled = read_bool(r)?;
        meta.collator_locale = read_string(r)?.unwrap_or_default();
        meta.collator_strength = read_i32(r)?;
        meta.large_text_field = read_bool(r)?;

        match meta.storage_type {
            StorageType::Indexed => {
                let count = read_i32(r)?;
                if count >= 0 {
                    let mut index = Vec::with_capacity(count.min(1024) as usize);
                    for _ in 0..count {
                        index.push(meta.read_native(r)?);
                    }
                    meta.index = Some(index);
                }
            }
            StorageType::BinaryString => {
                if read_bool(r)? {
                    meta.storage_metadata = Some(Box::new(Self::read_meta(r)?));
                }
            }
            StorageType::Normal => {}
        }

        if read_bool(r)? {
            meta.conversion_metadata = Some(Box::new(Self::read_meta(r)?));
        }
        tracing::trace!(meta = %meta, "read descriptor");
        Ok(meta)
    }

    /// Write one value in this descriptor's storage representation
    pub fn write_data<W: Write>(&self, w: &mut W, value: &Value) -> Result<()> {
        if self.value_type == LogicalType::None {
            return Err(MetaError::unimplemented(format!(
                "{}: the generic descriptor cannot write data",
                self
            )));
        }
        match self.storage_type {
            StorageType::Normal => self.write_native(w, value),
            StorageType::BinaryString => {
                write_bool(w, value.is_null())?;
                match value {
                    Value::Null => Ok(()),
                    Value::Binary(bytes) => write_bytes(w, bytes),
                    other => Err(MetaError::type_mismatch("binary string", other.type_name())),
                }
            }
            StorageType::Indexed => {
                write_bool(w, value.is_null())?;
                match value {
                    Value::Null => Ok(()),
                    Value::Index(i) => write_i32(w, *i),
                    other => Err(MetaError::type_mismatch("index", other.type_name())),
                }
            }
        }
    }

    /// Read one value written by [`ValueMeta::write_data`]
    pub fn read_data<R: Read>(&self, r: &mut R) -> Result<Value> {
        if self.value_type == LogicalType::None {
            return Err(MetaError::unimplemented(format!(
                "{}: the generic descriptor cannot read data",
                self
            )));
        }
        match self.storage_type {
            StorageType::Normal => self.read_native(r),
            StorageType::BinaryString => {
                if read_bool(r)? {
                    return Ok(Value::Null);
                }
                Ok(Value::Binary(read_bytes(r)?))
            }
            StorageType::Indexed => {
                if read_bool(r)? {
                    return Ok(Value::Null);
                }
                Ok(Value::Index(read_i32(r)?))
            }
        }
    }

    /// Descriptor as a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_meta(&mut out)?;
        Ok(out)
    }

    /// Descriptor from bytes written by [`ValueMeta::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<ValueMeta> {
        let mut reader = bytes;
        Self::read_meta(&mut reader)
    }

    fn write_native<W: Write>(&self, w: &mut W, value: &Value) -> Result<()> {
        write_bool(w, value.is_null())?;
        if value.is_null() {
            return Ok(());
        }
        self.check_native(value)?;
        match value {
            Value::String(s) => write_string(w, Some(s)),
            Value::Number(n) => write_all(w, &n.to_be_bytes()),
            Value::Integer(i) => write_i64(w, *i),
            Value::BigNumber(d) => write_string(w, Some(&d.to_string())),
            Value::Boolean(b) => write_bool(w, *b),
            Value::Date(d) => write_i64(w, d.timestamp_millis()),
            Value::Timestamp(t) => {
                write_i64(w, t.timestamp_millis())?;
                write_i32(w, t.timestamp_subsec_nanos() as i32)
            }
            Value::Binary(b) | Value::Serializable(b) => write_bytes(w, b),
            Value::InternetAddress(addr) => {
                write_bool(w, is_link_local(addr))?;
                let octets = match addr {
                    IpAddr::V4(v4) => v4.octets().to_vec(),
                    IpAddr::V6(v6) => v6.octets().to_vec(),
                };
                write_bytes(w, &octets)
            }
            Value::Null | Value::Index(_) => Ok(()),
        }
    }

    fn read_native<R: Read>(&self, r: &mut R) -> Result<Value> {
        if read_bool(r)? {
            return Ok(Value::Null);
        }
        let value = match self.value_type {
            LogicalType::String => Value::String(read_string(r)?.unwrap_or_default()),
            LogicalType::Number => {
                let mut buf = [0u8; 8];
                read_exact(r, &mut buf)?;
                Value::Number(f64::from_be_bytes(buf))
            }
            LogicalType::Integer => Value::Integer(read_i64(r)?),
            LogicalType::BigNumber => {
                let text = read_string(r)?.unwrap_or_default();
                Value::BigNumber(Decimal::from_str(&text).map_err(|e| {
                    MetaError::invalid_metadata(format!("invalid big number '{}': {}", text, e))
                })?)
            }
            LogicalType::Boolean => Value::Boolean(read_bool(r)?),
            LogicalType::Date => {
                let millis = read_i64(r)?;
                Value::Date(DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                    MetaError::invalid_metadata(format!("date {} ms out of range", millis))
                })?)
            }
            LogicalType::Timestamp => {
                let millis = read_i64(r)?;
                let nanos = read_i32(r)?;
                let secs = millis.div_euclid(1000);
                u32::try_from(nanos)
                    .ok()
                    .and_then(|n| DateTime::from_timestamp(secs, n))
                    .map(Value::Timestamp)
                    .ok_or_else(|| {
                        MetaError::invalid_metadata(format!(
                            "timestamp {} ms + {} ns out of range",
                            millis, nanos
                        ))
                    })?
            }
            LogicalType::Binary => Value::Binary(read_bytes(r)?),
            LogicalType::Serializable => Value::Serializable(read_bytes(r)?),
            LogicalType::InternetAddress => {
                let _link_local = read_bool(r)?;
                let octets = read_bytes(r)?;
                Value::InternetAddress(address_from_octets(&octets)?)
            }
            LogicalType::None => {
                return Err(MetaError::unimplemented(
                    "the generic descriptor cannot read data",
                ))
            }
        };
        Ok(value)
    }
}

fn is_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn address_from_octets(octets: &[u8]) -> Result<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(octets) {
        return Ok(IpAddr::V4(Ipv4Addr::from(v4)));
    }
    if let Ok(v6) = <[u8; 16]>::try_from(octets) {
        return Ok(IpAddr::V6(Ipv6Addr::from(v6)));
    }
    Err(MetaError::invalid_metadata(format!(
        "internet address of {} bytes",
        octets.len()
    )))
}

fn len_i32(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| MetaError::other(format!("length {} exceeds i32::MAX", len)))
}

fn write_all<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    w.write_all(bytes).map_err(MetaError::from_io)
}

fn write_i32<W: Write>(w: &mut W, v: i32) -> Result<()> {
    write_all(w, &v.to_be_bytes())
}

fn write_i64<W: Write>(w: &mut W, v: i64) -> Result<()> {
    write_all(w, &v.to_be_bytes())
}

fn write_bool<W: Write>(w: &mut W, v: bool) -> Result<()> {
    write_all(w, &[v as u8])
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_i32(w, len_i32(bytes.len())?)?;
    write_all(w, bytes)
}

fn write_string<W: Write>(w: &mut W, s: Option<&str>) -> Result<()> {
    match s {
        Some(s) => write_bytes(w, s.as_bytes()),
        None => write_i32(w, -1),
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf).map_err(MetaError::from_io)
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_i64<R: Read>(r: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

fn read_bool<R: Read>(r: &mut R) -> Result<bool> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0] != 0)
}

fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = read_i32(r)?;
    let len = usize::try_from(len)
        .map_err(|_| MetaError::invalid_metadata(format!("negative byte length {}", len)))?;
    let mut buf = Vec::new();
    r.take(len as u64)
        .read_to_end(&mut buf)
        .map_err(MetaError::from_io)?;
    if buf.len() != len {
        return Err(MetaError::Eof);
    }
    Ok(buf)
}

fn read_string<R: Read>(r: &mut R) -> Result<Option<String>> {
    let len = read_i32(r)?;
    if len == -1 {
        return Ok(None);
    }
    let len = usize::try_from(len)
        .map_err(|_| MetaError::invalid_metadata(format!("negative string length {}", len)))?;
    let mut buf = Vec::new();
    r.take(len as u64)
        .read_to_end(&mut buf)
        .map_err(MetaError::from_io)?;
    if buf.len() != len {
        return Err(MetaError::Eof);
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| MetaError::invalid_metadata(format!("string is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn meta(value_type: LogicalType) -> ValueMeta {
        ValueMeta::with_config("wire", value_type, ConversionConfig::new())
    }

    fn roundtrip(m: &ValueMeta) -> ValueMeta {
        ValueMeta::from_bytes(&m.to_bytes().unwrap()).unwrap()
    }

    fn data_roundtrip(m: &ValueMeta, v: &Value) -> Value {
        let mut buf = Vec::new();
        m.write_data(&mut buf, v).unwrap();
        m.read_data(&mut buf.as_slice()).unwrap()
    }

    #[test]
    fn test_descriptor_roundtrip_plain() {
        let mut m = meta(LogicalType::Number);
        m.set_length_and_precision(12, 3);
        m.set_origin(Some("orders".to_string()));
        m.set_comments(Some("net amount".to_string()));
        m.set_currency_symbol(Some("€".to_string()));
        m.set_trim_type(TrimType::Both);
        m.set_sorted_descending(true);
        m.set_date_format_locale(Some("fr-FR".to_string()));
        m.set_date_format_time_zone(Tz::America__New_York);
        m.set_collator_disabled(false);
        m.set_collator_strength(2);
        assert_eq!(roundtrip(&m), m);
    }

    #[test]
    fn test_descriptor_roundtrip_nested() {
        let mut m = meta(LogicalType::Date);
        m.set_storage_type(StorageType::BinaryString);
        let mut sm = meta(LogicalType::String);
        sm.set_conversion_mask(Some("MM/dd/yyyy".to_string()));
        m.set_storage_metadata(Some(sm)).unwrap();
        m.set_conversion_metadata(Some(meta(LogicalType::String)));
        assert_eq!(roundtrip(&m), m);

        let mut indexed = meta(LogicalType::String);
        indexed.set_storage_type(StorageType::Indexed);
        indexed
            .set_index(Some(vec![Value::from("a"), Value::from("b")]))
            .unwrap();
        assert_eq!(roundtrip(&indexed), indexed);
    }

    #[test]
    fn test_type_id_leads() {
        let bytes = meta(LogicalType::Timestamp).to_bytes().unwrap();
        assert_eq!(&bytes[..4], &9i32.to_be_bytes());

        let mut reader = &bytes[4..];
        let m = ValueMeta::read_meta_data(LogicalType::Timestamp, &mut reader).unwrap();
        assert_eq!(m.value_type(), LogicalType::Timestamp);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_descriptor() {
        let bytes = meta(LogicalType::String).to_bytes().unwrap();
        let err = ValueMeta::from_bytes(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, MetaError::Eof));

        let err = ValueMeta::from_bytes(&99i32.to_be_bytes()).unwrap_err();
        assert!(matches!(err, MetaError::PluginLookup(_)));
    }

    #[test]
    fn test_data_roundtrip() {
        let ts = Utc.timestamp_opt(-1_234, 987_654_321).single().unwrap();
        let cases = [
            (LogicalType::String, Value::from("héllo")),
            (LogicalType::Number, Value::Number(-0.25)),
            (LogicalType::Integer, Value::Integer(i64::MIN)),
            (LogicalType::BigNumber, Value::BigNumber(Decimal::new(-123_456, 4))),
            (LogicalType::Boolean, Value::Boolean(true)),
            (
                LogicalType::Date,
                Value::Date(Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 40).unwrap()),
            ),
            (LogicalType::Timestamp, Value::Timestamp(ts)),
            (LogicalType::Binary, Value::Binary(vec![0, 255, 7])),
            (LogicalType::Serializable, Value::Serializable(vec![1])),
            (LogicalType::InternetAddress, Value::from(Ipv6Addr::LOCALHOST)),
            (LogicalType::Integer, Value::Null),
        ];
        for (t, v) in cases {
            assert_eq!(data_roundtrip(&meta(t), &v), v, "{}", t);
        }
    }

    #[test]
    fn test_internet_address_layout() {
        let m = meta(LogicalType::InternetAddress);
        let mut buf = Vec::new();
        m.write_data(&mut buf, &Value::from(Ipv4Addr::new(169, 254, 1, 2)))
            .unwrap();
        // null flag, link-local flag, length, octets
        assert_eq!(buf, vec![0, 1, 0, 0, 0, 4, 169, 254, 1, 2]);
    }

    #[test]
    fn test_storage_data_roundtrip() {
        let mut bs = meta(LogicalType::Integer);
        bs.set_storage_type(StorageType::BinaryString);
        let v = Value::Binary(b"17".to_vec());
        assert_eq!(data_roundtrip(&bs, &v), v);

        let mut idx = meta(LogicalType::String);
        idx.set_storage_type(StorageType::Indexed);
        assert_eq!(data_roundtrip(&idx, &Value::Index(3)), Value::Index(3));
        assert_eq!(data_roundtrip(&idx, &Value::Null), Value::Null);
    }

    #[test]
    fn test_generic_descriptor_has_no_data() {
        let m = meta(LogicalType::None);
        let mut buf = Vec::new();
        assert!(matches!(
            m.write_data(&mut buf, &Value::from("x")),
            Err(MetaError::Unimplemented(_))
        ));
    }
}
