//! Core descriptor types
//!
//! This module provides the fundamental building blocks of the crate: error
//! types, the value model, the value descriptor itself, the conversion
//! configuration, storage handling, the binary codec and the database column
//! type mapper.

pub mod codec;
pub mod config;
pub mod database_types;
pub mod error;
pub mod factory;
pub mod storage;
pub mod type_mapper;
pub mod value;
pub mod value_meta;
pub mod value_types;

// Re-export commonly used types
pub use config::{ConversionConfig, TimestampNumberMode};
pub use database_types::DatabaseVendor;
pub use error::{MetaError, Result};
pub use factory::ValueMetaFactory;
pub use type_mapper::{
    sql_type_for, sql_types, BoundValue, ColumnMetadata, MappedType, MapperOptions, TypeMapper,
};
pub use value::Value;
pub use value_meta::ValueMeta;
pub use value_types::{LogicalType, StorageType, TrimType};
