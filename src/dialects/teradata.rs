//! Teradata overrides

use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{sql_types, ColumnMetadata, MappedType, MapperOptions};

/// Teradata dialect; `DATE` columns carry day granularity only
#[derive(Debug, Clone, Copy, Default)]
pub struct TeradataDialect;

impl DialectStrategy for TeradataDialect {
    fn vendor(&self) -> DatabaseVendor {
        DatabaseVendor::Teradata
    }

    fn customize(
        &self,
        mut mapped: MappedType,
        column: &ColumnMetadata,
        _options: &MapperOptions,
    ) -> MappedType {
        if column.sql_type == sql_types::DATE {
            mapped.precision = 1;
        }
        mapped
    }
}
