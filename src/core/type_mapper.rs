//! External-type mapper
//!
//! Turns a database column description into a [`ValueMeta`]. The vendor
//! agnostic baseline runs first; the vendor's [`DialectStrategy`] then
//! adjusts the result. Mapping never fails: unknown SQL type codes become
//! strings.

use super::database_types::DatabaseVendor;
use super::error::{MetaError, Result};
use super::factory::ValueMetaFactory;
use super::value::Value;
use super::value_meta::{ValueMeta, CLOB_LENGTH};
use super::value_types::{LogicalType, StorageType};
use crate::dialects::{dialect_for, DialectStrategy};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::sync::Arc;

/// SQL type codes as reported by database drivers
pub mod sql_types {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const NCHAR: i32 = -15;
    pub const NVARCHAR: i32 = -9;
    pub const LONGNVARCHAR: i32 = -16;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const TIME_WITH_TIMEZONE: i32 = 2013;
    pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const LONGVARBINARY: i32 = -4;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
    pub const NCLOB: i32 = 2011;
    pub const BOOLEAN: i32 = 16;
    pub const NULL: i32 = 0;
    pub const OTHER: i32 = 1111;

    /// Check if the code is one of the floating point types
    pub fn is_floating(code: i32) -> bool {
        matches!(code, FLOAT | REAL | DOUBLE)
    }

    /// Check if the code is one of the binary types
    pub fn is_binary(code: i32) -> bool {
        matches!(code, BINARY | VARBINARY | LONGVARBINARY | BLOB)
    }
}

/// Read-only description of one result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub sql_type: i32,
    pub type_name: Option<String>,
    /// Declared size (digits for numbers, characters for text)
    pub precision: i32,
    /// Declared decimal digits
    pub scale: i32,
    pub display_size: i32,
    pub signed: bool,
    pub nullable: Option<bool>,
    pub label: Option<String>,
}

impl ColumnMetadata {
    pub fn new<S: Into<String>>(name: S, sql_type: i32) -> Self {
        Self {
            name: name.into(),
            sql_type,
            type_name: None,
            precision: 0,
            scale: 0,
            display_size: 0,
            signed: true,
            nullable: None,
            label: None,
        }
    }

    pub fn with_type_name<S: Into<String>>(mut self, type_name: S) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_display_size(mut self, display_size: i32) -> Self {
        self.display_size = display_size;
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check if the driver reported the given type name, ignoring case
    pub fn type_name_is(&self, name: &str) -> bool {
        self.type_name
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }
}

/// Mapper switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    /// Ignore declared character lengths
    pub ignore_length: bool,
    /// Keep strings as raw bytes and decode them on demand
    pub lazy_conversion: bool,
    /// Treat MySQL `YEAR` columns as dates rather than integers
    pub year_is_date_type: bool,
    /// Map 38-digit Oracle numbers and `BIGINT` to big numbers
    pub strict_big_number: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            ignore_length: false,
            lazy_conversion: false,
            year_is_date_type: true,
            strict_big_number: false,
        }
    }
}

impl MapperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_length(mut self, enabled: bool) -> Self {
        self.ignore_length = enabled;
        self
    }

    pub fn lazy_conversion(mut self, enabled: bool) -> Self {
        self.lazy_conversion = enabled;
        self
    }

    pub fn year_is_date_type(mut self, enabled: bool) -> Self {
        self.year_is_date_type = enabled;
        self
    }

    pub fn strict_big_number(mut self, enabled: bool) -> Self {
        self.strict_big_number = enabled;
        self
    }
}

/// Intermediate mapping result handed to the dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub value_type: LogicalType,
    pub length: i32,
    pub precision: i32,
    pub large_text: bool,
}

impl MappedType {
    pub fn new(value_type: LogicalType, length: i32, precision: i32) -> Self {
        Self {
            value_type,
            length,
            precision,
            large_text: false,
        }
    }

    /// Same mapping with another type, length and precision
    pub fn retype(mut self, value_type: LogicalType, length: i32, precision: i32) -> Self {
        self.value_type = value_type;
        self.length = length;
        self.precision = precision;
        self
    }
}

/// Maps column metadata of one vendor to descriptors
#[derive(Debug, Clone)]
pub struct TypeMapper {
    dialect: Arc<dyn DialectStrategy>,
    options: MapperOptions,
}

impl TypeMapper {
    /// Mapper for a vendor, using that vendor's dialect
    pub fn new(vendor: DatabaseVendor) -> Self {
        Self::with_dialect(dialect_for(vendor))
    }

    /// Mapper using an explicit dialect
    pub fn with_dialect(dialect: Arc<dyn DialectStrategy>) -> Self {
        Self {
            dialect,
            options: MapperOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    pub fn vendor(&self) -> DatabaseVendor {
        self.dialect.vendor()
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Map one column to a descriptor
    pub fn map_column(&self, column: &ColumnMetadata) -> ValueMeta {
        let baseline = self.baseline(column);
        let mapped = self.dialect.customize(baseline, column, &self.options);
        if mapped != baseline {
            tracing::debug!(
                column = %column.name,
                vendor = %self.vendor(),
                from = %baseline.value_type,
                to = %mapped.value_type,
                "dialect adjusted column mapping"
            );
        }

        let mut meta = ValueMetaFactory::create_typed(
            mapped.value_type,
            &column.name,
            mapped.length,
            mapped.precision,
        );
        // Factory rules do not apply to mapped columns: keep the driver's numbers.
        meta.set_length_and_precision(mapped.length, mapped.precision);
        meta.set_large_text_field(mapped.large_text);
        meta.set_comments(column.label.clone());

        if self.options.lazy_conversion && meta.is_string() {
            let mut storage_meta = meta.clone();
            storage_meta.set_storage_type(StorageType::Normal);
            meta.set_storage_type(StorageType::BinaryString);
            meta.storage_metadata = Some(Box::new(storage_meta));
        }

        tracing::debug!(
            column = %column.name,
            sql_type = column.sql_type,
            meta = %meta,
            "mapped column"
        );
        meta
    }

    /// Map every column in order
    pub fn map_columns(&self, columns: &[ColumnMetadata]) -> Vec<ValueMeta> {
        columns.iter().map(|c| self.map_column(c)).collect()
    }

    fn baseline(&self, column: &ColumnMetadata) -> MappedType {
        use sql_types::*;

        let code = column.sql_type;
        match code {
            CHAR | VARCHAR | NCHAR | NVARCHAR | LONGVARCHAR | LONGNVARCHAR => {
                let length = if self.options.ignore_length {
                    -1
                } else {
                    column.display_size
                };
                MappedType::new(LogicalType::String, length, -1)
            }
            CLOB | NCLOB => {
                let mut mapped = MappedType::new(LogicalType::String, CLOB_LENGTH, -1);
                mapped.large_text = true;
                mapped
            }
            BIGINT if column.signed => MappedType::new(LogicalType::Integer, 15, 0),
            BIGINT => MappedType::new(LogicalType::BigNumber, 16, 0),
            INTEGER => MappedType::new(LogicalType::Integer, 9, 0),
            SMALLINT => MappedType::new(LogicalType::Integer, 4, 0),
            TINYINT => MappedType::new(LogicalType::Integer, 2, 0),
            DECIMAL | NUMERIC | FLOAT | REAL | DOUBLE => {
                let length = if column.precision >= 126 {
                    -1
                } else {
                    column.precision
                };
                let precision = if column.scale >= 126 { -1 } else { column.scale };
                if is_floating(code) {
                    let precision = if precision == 0 { -1 } else { precision };
                    let value_type = if length > 15 || precision > 15 {
                        LogicalType::BigNumber
                    } else {
                        LogicalType::Number
                    };
                    MappedType::new(value_type, length, precision)
                } else {
                    let value_type = if precision > 0 || length > 18 {
                        LogicalType::BigNumber
                    } else if length > 0 && precision == 0 {
                        LogicalType::Integer
                    } else {
                        LogicalType::Number
                    };
                    MappedType::new(value_type, length, precision)
                }
            }
            TIMESTAMP | TIMESTAMP_WITH_TIMEZONE if self.dialect.supports_timestamp_data_type() => {
                MappedType::new(LogicalType::Timestamp, column.scale, -1)
            }
            TIMESTAMP | TIMESTAMP_WITH_TIMEZONE | DATE | TIME | TIME_WITH_TIMEZONE => {
                MappedType::new(LogicalType::Date, -1, -1)
            }
            BOOLEAN | BIT => MappedType::new(LogicalType::Boolean, -1, -1),
            BINARY | VARBINARY | LONGVARBINARY | BLOB => {
                MappedType::new(LogicalType::Binary, -1, -1)
            }
            _ => MappedType::new(LogicalType::String, -1, column.scale),
        }
    }
}

/// SQL type code a descriptor binds as
pub fn sql_type_for(value_type: LogicalType) -> i32 {
    match value_type {
        LogicalType::Number => sql_types::DOUBLE,
        LogicalType::String => sql_types::VARCHAR,
        LogicalType::Date => sql_types::TIMESTAMP,
        LogicalType::Timestamp => sql_types::TIMESTAMP,
        LogicalType::Boolean => sql_types::BOOLEAN,
        LogicalType::Integer => sql_types::BIGINT,
        LogicalType::BigNumber => sql_types::DECIMAL,
        LogicalType::Binary | LogicalType::Serializable => sql_types::VARBINARY,
        LogicalType::InternetAddress => sql_types::OTHER,
        LogicalType::None => sql_types::NULL,
    }
}

/// Statement parameter produced from a value and its descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// Typed null
    Null(i32),
    Text(String),
    Integer(i64),
    Double(f64),
    Decimal(Decimal),
    Boolean(bool),
    Bytes(Vec<u8>),
    /// Instant with the calendar zone to bind it in; no zone when timezones are ignored
    Instant {
        value: DateTime<Utc>,
        zone: Option<Tz>,
    },
}

impl ValueMeta {
    /// Prepare a value for a prepared statement parameter
    pub fn bind_value(&self, value: &Value) -> Result<BoundValue> {
        let null = || BoundValue::Null(sql_type_for(self.value_type));
        let bound = match self.value_type {
            LogicalType::String => self.get_string(value)?.map(BoundValue::Text),
            LogicalType::Number => self.get_number(value)?.map(BoundValue::Double),
            LogicalType::Integer => self.get_integer(value)?.map(BoundValue::Integer),
            LogicalType::BigNumber => self.get_big_number(value)?.map(BoundValue::Decimal),
            LogicalType::Boolean => self.get_boolean(value)?.map(BoundValue::Boolean),
            LogicalType::Date | LogicalType::Timestamp => {
                let zone = if self.is_ignore_timezone() {
                    None
                } else {
                    Some(self.date_format_time_zone)
                };
                let instant = if self.value_type == LogicalType::Date {
                    self.get_date(value)?
                } else {
                    self.get_timestamp(value)?
                };
                instant.map(|value| BoundValue::Instant { value, zone })
            }
            LogicalType::Binary => self.get_binary(value)?.map(BoundValue::Bytes),
            LogicalType::Serializable => self.get_serializable(value)?.map(BoundValue::Bytes),
            LogicalType::InternetAddress => self
                .get_internet_address(value)?
                .map(|a| BoundValue::Text(a.to_string())),
            LogicalType::None => {
                return Err(MetaError::unimplemented(format!(
                    "{}: the generic descriptor cannot bind values",
                    self
                )))
            }
        };
        Ok(bound.unwrap_or_else(null))
    }
}

#[cfg(test)]
mod tests {
    use super::sql_types::*;
    use super::*;
    use crate::core::config::ConversionConfig;

    fn map(vendor: DatabaseVendor, column: ColumnMetadata) -> ValueMeta {
        TypeMapper::new(vendor).map_column(&column)
    }

    fn shape(m: &ValueMeta) -> (LogicalType, i32, i32) {
        (m.value_type(), m.length(), m.precision())
    }

    #[test]
    fn test_character_columns() {
        let m = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("name", VARCHAR).with_display_size(40),
        );
        assert_eq!(shape(&m), (LogicalType::String, 40, -1));
        assert!(!m.is_large_text_field());

        let clob = map(DatabaseVendor::Generic, ColumnMetadata::new("doc", CLOB));
        assert_eq!(clob.length(), CLOB_LENGTH);
        assert!(clob.is_large_text_field());

        let ignored = TypeMapper::new(DatabaseVendor::Generic)
            .with_options(MapperOptions::new().ignore_length(true))
            .map_column(&ColumnMetadata::new("name", CHAR).with_display_size(8));
        assert_eq!(ignored.length(), -1);
    }

    #[test]
    fn test_integer_family() {
        for (code, length) in [(TINYINT, 2), (SMALLINT, 4), (INTEGER, 9), (BIGINT, 15)] {
            let m = map(DatabaseVendor::Generic, ColumnMetadata::new("n", code));
            assert_eq!(shape(&m), (LogicalType::Integer, length, 0));
        }
        let unsigned = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("n", BIGINT).with_signed(false),
        );
        assert_eq!(shape(&unsigned), (LogicalType::BigNumber, 16, 0));
    }

    #[test]
    fn test_decimal_baseline() {
        let cases = [
            (10, 2, LogicalType::BigNumber),
            (10, 0, LogicalType::Integer),
            (18, 0, LogicalType::Integer),
            (19, 0, LogicalType::BigNumber),
            (0, 0, LogicalType::Number),
            (10, -2, LogicalType::Number),
            (10, 130, LogicalType::Number),
        ];
        for (size, scale, expected) in cases {
            let m = map(
                DatabaseVendor::Generic,
                ColumnMetadata::new("d", DECIMAL)
                    .with_precision(size)
                    .with_scale(scale),
            );
            assert_eq!(m.value_type(), expected, "({}, {})", size, scale);
        }
    }

    #[test]
    fn test_floating_baseline() {
        let m = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("f", DOUBLE).with_precision(15).with_scale(0),
        );
        assert_eq!(shape(&m), (LogicalType::Number, 15, -1));

        let wide = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("f", DOUBLE).with_precision(17).with_scale(17),
        );
        assert_eq!(wide.value_type(), LogicalType::BigNumber);
    }

    #[test]
    fn test_temporal_and_boolean() {
        let ts = map(DatabaseVendor::Generic, ColumnMetadata::new("t", TIMESTAMP));
        assert_eq!(ts.value_type(), LogicalType::Date);
        let ts = map(
            DatabaseVendor::Postgres,
            ColumnMetadata::new("t", TIMESTAMP).with_scale(6),
        );
        assert_eq!(shape(&ts), (LogicalType::Timestamp, 6, -1));

        let time = map(DatabaseVendor::Generic, ColumnMetadata::new("t", TIME));
        assert_eq!(time.value_type(), LogicalType::Date);

        let bit = map(DatabaseVendor::Generic, ColumnMetadata::new("b", BIT));
        assert_eq!(bit.value_type(), LogicalType::Boolean);
    }

    #[test]
    fn test_binary_and_unknown() {
        let bin = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("b", VARBINARY).with_precision(80),
        );
        assert_eq!(shape(&bin), (LogicalType::Binary, -1, -1));

        let other = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("x", OTHER).with_scale(3),
        );
        assert_eq!(shape(&other), (LogicalType::String, -1, 3));
    }

    #[test]
    fn test_lazy_conversion() {
        let m = TypeMapper::new(DatabaseVendor::Generic)
            .with_options(MapperOptions::new().lazy_conversion(true))
            .map_column(&ColumnMetadata::new("s", VARCHAR).with_display_size(5));
        assert_eq!(m.storage_type(), StorageType::BinaryString);
        let sm = m.storage_metadata().unwrap();
        assert_eq!(sm.value_type(), LogicalType::String);
        assert_eq!(sm.storage_type(), StorageType::Normal);
        assert_eq!(sm.length(), 5);

        let n = TypeMapper::new(DatabaseVendor::Generic)
            .with_options(MapperOptions::new().lazy_conversion(true))
            .map_column(&ColumnMetadata::new("n", INTEGER));
        assert_eq!(n.storage_type(), StorageType::Normal);
    }

    #[test]
    fn test_label_becomes_comment() {
        let m = map(
            DatabaseVendor::Generic,
            ColumnMetadata::new("id", INTEGER).with_label("Customer id"),
        );
        assert_eq!(m.comments(), Some("Customer id"));
    }

    #[test]
    fn test_bind_value_honors_ignore_timezone() {
        let instant = Utc::now();
        let mut m = ValueMeta::with_config("d", LogicalType::Timestamp, ConversionConfig::new());
        m.set_date_format_time_zone(Tz::Europe__Paris);
        assert_eq!(
            m.bind_value(&Value::Timestamp(instant)).unwrap(),
            BoundValue::Instant {
                value: instant,
                zone: Some(Tz::Europe__Paris)
            }
        );

        let ignore = ConversionConfig::new().db_ignore_timezone(true);
        let m = ValueMeta::with_config("d", LogicalType::Timestamp, ignore);
        assert_eq!(
            m.bind_value(&Value::Timestamp(instant)).unwrap(),
            BoundValue::Instant {
                value: instant,
                zone: None
            }
        );
        assert_eq!(
            m.bind_value(&Value::Null).unwrap(),
            BoundValue::Null(TIMESTAMP)
        );
    }
}
