//! SQLite overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};
use crate::core::value_types::LogicalType;

/// SQLite dialect; binary columns come back as text
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl DialectStrategy for SqliteDialect {
    fn vendor(&self) -> DatabaseVendor {
        DatabaseVendor::Sqlite
    }

    fn customize(
        &self,
        mapped: MappedType,
        column: &ColumnMetadata,
        _options: &MapperOptions,
    ) -> MappedType {
        if sql_types::is_binary(column.sql_type) {
            mapped.retype(LogicalType::String, -1, -1)
        } else {
            mapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::type_mapper::TypeMapper;

    #[test]
    fn test_binary_is_string() {
        let m = TypeMapper::new(DatabaseVendor::Sqlite)
            .map_column(&ColumnMetadata::new("b", sql_types::BLOB));
        assert_eq!(m.value_type(), LogicalType::String);

        let ts = TypeMapper::new(DatabaseVendor::Sqlite)
            .map_column(&ColumnMetadata::new("t", sql_types::TIMESTAMP));
        assert_eq!(ts.value_type(), LogicalType::Date);
    }
}
