//! PostgreSQL and Greenplum overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};
use crate::core::value_types::LogicalType;

/// Dialect shared by PostgreSQL and Greenplum
#[derive(Debug, Clone, Copy)]
pub struct PostgresDialect {
    vendor: DatabaseVendor,
}

impl PostgresDialect {
    pub fn new(vendor: DatabaseVendor) -> Self {
        Self { vendor }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new(DatabaseVendor::Postgres)
    }
}

impl DialectStrategy for PostgresDialect {
    fn vendor(&self) -> DatabaseVendor {
        self.vendor
    }

    fn supports_timestamp_data_type(&self) -> bool {
        true
    }

    fn customize(
        &self,
        mapped: MappedType,
        column: &ColumnMetadata,
        _options: &MapperOptions,
    ) -> MappedType {
        match column.sql_type {
            // NUMERIC without size is arbitrary precision
            sql_types::NUMERIC if mapped.length == 0 && mapped.precision == 0 => {
                mapped.retype(LogicalType::BigNumber, -1, -1)
            }
            sql_types::DOUBLE if mapped.precision >= 16 && mapped.length >= 16 => {
                mapped.retype(LogicalType::Number, -1, -1)
            }
            _ => mapped,
        }
    }
}
