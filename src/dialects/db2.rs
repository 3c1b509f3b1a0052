//! DB2 overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};

/// DB2 dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Dialect;

impl DialectStrategy for Db2Dialect {
    fn vendor(&self) -> DatabaseVendor {
        DatabaseVendor::Db2
    }

    fn customize(
        &self,
        mut mapped: MappedType,
        column: &ColumnMetadata,
        _options: &MapperOptions,
    ) -> MappedType {
        // CHAR(n) FOR BIT DATA reports a display size of twice its length
        if sql_types::is_binary(column.sql_type) && column.display_size == 2 * column.precision {
            mapped.length = column.precision;
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::type_mapper::TypeMapper;
    use crate::core::value_types::LogicalType;

    #[test]
    fn test_bit_data_length() {
        let m = TypeMapper::new(DatabaseVendor::Db2).map_column(
            &ColumnMetadata::new("b", sql_types::BINARY)
                .with_precision(80)
                .with_display_size(160),
        );
        assert_eq!(m.value_type(), LogicalType::Binary);
        assert_eq!(m.length(), 80);

        let other = TypeMapper::new(DatabaseVendor::Db2).map_column(
            &ColumnMetadata::new("b", sql_types::BINARY)
                .with_precision(80)
                .with_display_size(80),
        );
        assert_eq!(other.length(), -1);
    }
}
