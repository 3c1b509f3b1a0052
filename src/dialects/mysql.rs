//! MySQL and MariaDB overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};
use crate::core::value_types::LogicalType;

/// Dialect shared by MySQL and MariaDB
#[derive(Debug, Clone, Copy)]
pub struct MysqlDialect {
    vendor: DatabaseVendor,
}

impl MysqlDialect {
    pub fn new(vendor: DatabaseVendor) -> Self {
        Self { vendor }
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new(DatabaseVendor::Mysql)
    }
}

impl DialectStrategy for MysqlDialect {
    fn vendor(&self) -> DatabaseVendor {
        self.vendor
    }

    fn customize(
        &self,
        mapped: MappedType,
        column: &ColumnMetadata,
        options: &MapperOptions,
    ) -> MappedType {
        match column.sql_type {
            // Drivers report sizes like (12,31) for plain doubles.
            code if sql_types::is_floating(code) && mapped.precision >= mapped.length => {
                mapped.retype(LogicalType::Number, -1, -1)
            }
            sql_types::DATE | sql_types::TIME
                if !options.year_is_date_type && column.type_name_is("YEAR") =>
            {
                mapped.retype(LogicalType::Integer, 4, 0)
            }
            _ => mapped,
        }
    }
}
