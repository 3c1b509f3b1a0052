//! Oracle overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};
use crate::core::value_types::LogicalType;

/// Oracle dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl DialectStrategy for OracleDialect {
    fn vendor(&self) -> DatabaseVendor {
        DatabaseVendor::Oracle
    }

    fn supports_timestamp_data_type(&self) -> bool {
        true
    }

    fn customize(
        &self,
        mapped: MappedType,
        column: &ColumnMetadata,
        options: &MapperOptions,
    ) -> MappedType {
        let big_or_integer = if options.strict_big_number {
            LogicalType::BigNumber
        } else {
            LogicalType::Integer
        };
        match column.sql_type {
            sql_types::NUMERIC
            | sql_types::DECIMAL
            | sql_types::FLOAT
            | sql_types::REAL
            | sql_types::DOUBLE => {
                let mut mapped = mapped;
                if mapped.precision == 0 && mapped.length == 38 {
                    mapped = mapped.retype(big_or_integer, mapped.length, mapped.precision);
                }
                // NUMBER without size
                if mapped.precision <= 0 && mapped.length <= 0 {
                    mapped = mapped.retype(LogicalType::BigNumber, -1, -1);
                }
                mapped
            }
            sql_types::BIGINT if options.strict_big_number => {
                mapped.retype(LogicalType::BigNumber, mapped.length, mapped.precision)
            }
            // RAW and LONG RAW
            sql_types::VARBINARY | sql_types::LONGVARBINARY => {
                mapped.retype(LogicalType::String, column.display_size, -1)
            }
            _ => mapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::type_mapper::TypeMapper;

    fn number(precision: i32, scale: i32) -> ColumnMetadata {
        ColumnMetadata::new("n", sql_types::NUMERIC)
            .with_precision(precision)
            .with_scale(scale)
    }

    #[test]
    fn test_number_38_follows_strict_flag() {
        let lenient = TypeMapper::new(DatabaseVendor::Oracle).map_column(&number(38, 0));
        assert_eq!(lenient.value_type(), LogicalType::Integer);

        let strict = TypeMapper::new(DatabaseVendor::Oracle)
            .with_options(MapperOptions::new().strict_big_number(true))
            .map_column(&number(38, 0));
        assert_eq!(strict.value_type(), LogicalType::BigNumber);
        assert_eq!((strict.length(), strict.precision()), (38, 0));
    }

    #[test]
    fn test_bigint_follows_strict_flag() {
        let column = ColumnMetadata::new("id", sql_types::BIGINT);
        let lenient = TypeMapper::new(DatabaseVendor::Oracle).map_column(&column);
        assert_eq!(lenient.value_type(), LogicalType::Integer);

        let strict = TypeMapper::new(DatabaseVendor::Oracle)
            .with_options(MapperOptions::new().strict_big_number(true))
            .map_column(&column);
        assert_eq!(strict.value_type(), LogicalType::BigNumber);
    }

    #[test]
    fn test_unsized_number() {
        let m = TypeMapper::new(DatabaseVendor::Oracle).map_column(&number(0, -127));
        assert_eq!(m.value_type(), LogicalType::BigNumber);
        assert_eq!((m.length(), m.precision()), (-1, -1));
    }

    #[test]
    fn test_raw_is_string() {
        let m = TypeMapper::new(DatabaseVendor::Oracle).map_column(
            &ColumnMetadata::new("r", sql_types::VARBINARY).with_display_size(32),
        );
        assert_eq!(m.value_type(), LogicalType::String);
        assert_eq!(m.length(), 32);

        let blob = TypeMapper::new(DatabaseVendor::Oracle)
            .map_column(&ColumnMetadata::new("b", sql_types::BLOB));
        assert_eq!(blob.value_type(), LogicalType::Binary);
    }
}
