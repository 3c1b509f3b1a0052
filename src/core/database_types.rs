//! Database vendor definitions
//!
//! This module defines the vendors whose column metadata the type mapper
//! understands.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Database vendors with known column metadata quirks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum DatabaseVendor {
    /// Vendor without specific overrides
    #[default]
    Generic = 0,
    /// PostgreSQL database
    Postgres = 1,
    /// Greenplum database
    Greenplum = 2,
    /// MySQL database
    Mysql = 3,
    /// MariaDB database
    MariaDb = 4,
    /// Oracle database
    Oracle = 5,
    /// SQLite database
    Sqlite = 6,
    /// Teradata database
    Teradata = 7,
    /// IBM DB2 database
    Db2 = 8,
}

impl DatabaseVendor {
    /// Every vendor, ordered by discriminant
    pub const ALL: [DatabaseVendor; 9] = [
        DatabaseVendor::Generic,
        DatabaseVendor::Postgres,
        DatabaseVendor::Greenplum,
        DatabaseVendor::Mysql,
        DatabaseVendor::MariaDb,
        DatabaseVendor::Oracle,
        DatabaseVendor::Sqlite,
        DatabaseVendor::Teradata,
        DatabaseVendor::Db2,
    ];

    /// Convert vendor to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            DatabaseVendor::Generic => "generic",
            DatabaseVendor::Postgres => "postgres",
            DatabaseVendor::Greenplum => "greenplum",
            DatabaseVendor::Mysql => "mysql",
            DatabaseVendor::MariaDb => "mariadb",
            DatabaseVendor::Oracle => "oracle",
            DatabaseVendor::Sqlite => "sqlite",
            DatabaseVendor::Teradata => "teradata",
            DatabaseVendor::Db2 => "db2",
        }
    }

    /// Check if this vendor speaks the MySQL dialect
    pub fn is_mysql_variant(&self) -> bool {
        matches!(self, DatabaseVendor::Mysql | DatabaseVendor::MariaDb)
    }

    /// Check if this vendor speaks the PostgreSQL dialect
    pub fn is_postgres_variant(&self) -> bool {
        matches!(self, DatabaseVendor::Postgres | DatabaseVendor::Greenplum)
    }
}

impl std::fmt::Display for DatabaseVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for DatabaseVendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" | "none" => Ok(DatabaseVendor::Generic),
            "postgres" | "postgresql" => Ok(DatabaseVendor::Postgres),
            "greenplum" => Ok(DatabaseVendor::Greenplum),
            "mysql" => Ok(DatabaseVendor::Mysql),
            "mariadb" => Ok(DatabaseVendor::MariaDb),
            "oracle" => Ok(DatabaseVendor::Oracle),
            "sqlite" | "sqlite3" => Ok(DatabaseVendor::Sqlite),
            "teradata" => Ok(DatabaseVendor::Teradata),
            "db2" | "ibm db2" => Ok(DatabaseVendor::Db2),
            _ => Err(format!("Invalid database vendor: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_to_str() {
        assert_eq!(DatabaseVendor::Postgres.to_str(), "postgres");
        assert_eq!(DatabaseVendor::MariaDb.to_str(), "mariadb");
        assert_eq!(DatabaseVendor::Db2.to_str(), "db2");
    }

    #[test]
    fn test_vendor_from_str() {
        assert_eq!(
            "postgresql".parse::<DatabaseVendor>().ok(),
            Some(DatabaseVendor::Postgres)
        );
        assert_eq!(
            "MariaDB".parse::<DatabaseVendor>().ok(),
            Some(DatabaseVendor::MariaDb)
        );
        assert_eq!(
            "sqlite3".parse::<DatabaseVendor>().ok(),
            Some(DatabaseVendor::Sqlite)
        );
        assert!("mongodb".parse::<DatabaseVendor>().is_err());
    }

    #[test]
    fn test_vendor_roundtrip_through_str() {
        for vendor in DatabaseVendor::ALL {
            assert_eq!(vendor.to_str().parse::<DatabaseVendor>().ok(), Some(vendor));
        }
    }

    #[test]
    fn test_vendor_families() {
        assert!(DatabaseVendor::Mysql.is_mysql_variant());
        assert!(DatabaseVendor::MariaDb.is_mysql_variant());
        assert!(!DatabaseVendor::Postgres.is_mysql_variant());
        assert!(DatabaseVendor::Greenplum.is_postgres_variant());
        assert_eq!(DatabaseVendor::default(), DatabaseVendor::Generic);
    }
}
