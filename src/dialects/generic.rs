use super::DialectStrategy;
use crate::core::database_types::DatabaseVendor;

/// Dialect without overrides
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl DialectStrategy for GenericDialect {
    fn vendor(&self) -> DatabaseVendor {
        DatabaseVendor::Generic
    }
}
