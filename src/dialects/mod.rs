//! Per-vendor column mapping overrides
//!
//! Each vendor gets one [`DialectStrategy`] implementation. The type mapper
//! computes a vendor-agnostic baseline and then hands it to the strategy,
//! which may adjust type, length and precision.

mod db2;
mod generic;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod teradata;

pub use db2::Db2Dialect;
pub use generic::GenericDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use teradata::TeradataDialect;

use crate::core::database_types::DatabaseVendor;
use crate::core::type_mapper::{ColumnMetadata, MappedType, MapperOptions};
use std::sync::Arc;

/// Vendor hooks used by the type mapper
pub trait DialectStrategy: std::fmt::Debug + Send + Sync {
    /// Vendor this strategy handles
    fn vendor(&self) -> DatabaseVendor;

    /// Whether `TIMESTAMP` columns hold genuine timestamps
    fn supports_timestamp_data_type(&self) -> bool {
        false
    }

    /// Adjust the baseline mapping of a column
    fn customize(
        &self,
        mapped: MappedType,
        _column: &ColumnMetadata,
        _options: &MapperOptions,
    ) -> MappedType {
        mapped
    }
}

/// Strategy for a vendor
pub fn dialect_for(vendor: DatabaseVendor) -> Arc<dyn DialectStrategy> {
    match vendor {
        DatabaseVendor::Generic => Arc::new(GenericDialect),
        DatabaseVendor::Postgres | DatabaseVendor::Greenplum => {
            Arc::new(PostgresDialect::new(vendor))
        }
        DatabaseVendor::Mysql | DatabaseVendor::MariaDb => Arc::new(MysqlDialect::new(vendor)),
        DatabaseVendor::Oracle => Arc::new(OracleDialect),
        DatabaseVendor::Sqlite => Arc::new(SqliteDialect),
        DatabaseVendor::Teradata => Arc::new(TeradataDialect),
        DatabaseVendor::Db2 => Arc::new(Db2Dialect),
    }
}
