//! # Rust Row Metadata
//!
//! Per-column value metadata for row-oriented data pipelines. A [`ValueMeta`]
//! describes one field of a row: its logical type, its storage
//! representation, its length and precision, and the masks, symbols and
//! locale used to turn values into text and back.
//!
//! ## Features
//!
//! - **Conversion engine**: every descriptor reads its values as any other native type
//! - **Storage types**: normal, lazily converted binary strings, and dictionary indexes
//! - **Comparison and hashing**: null ordering, case folding, collation and descending sorts
//! - **Binary codec**: self-describing descriptor and value streams
//! - **Column mapping**: database column metadata to descriptors, with per-vendor dialects
//! - **Configuration**: process-wide conversion switches guarded by `parking_lot`
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_row_metadata::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ConversionConfig::new();
//!     let text = ValueMeta::with_config("amount", LogicalType::String, config);
//!     let mut number = ValueMeta::with_config("amount", LogicalType::Integer, config);
//!     number.set_conversion_mask(Some("#,##0".to_string()));
//!
//!     let value = number.convert_data(&text, &Value::from("1234"))?;
//!     assert_eq!(value, Value::Integer(1234));
//!     assert_eq!(number.get_string(&value)?.as_deref(), Some("1,234"));
//!     Ok(())
//! }
//! ```
//!
//! ### Mapping Database Columns
//!
//! ```rust
//! use rust_row_metadata::prelude::*;
//!
//! let mapper = TypeMapper::new(DatabaseVendor::Postgres);
//! let meta = mapper.map_column(&ColumnMetadata::new("price", sql_types::NUMERIC));
//! assert_eq!(meta.value_type(), LogicalType::BigNumber);
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_row_metadata/
//! ├── src/
//! │   ├── core/              # Descriptor, values, storage, codec, type mapper
//! │   ├── conversion/        # Getters, formats, comparison, narrow converter
//! │   ├── dialects/          # Per-vendor column mapping overrides
//! │   └── lib.rs
//! ├── tests/                 # Integration and property tests
//! ├── benches/               # Criterion benchmarks
//! └── Cargo.toml
//! ```

/// Core descriptor types
pub mod core;

/// Conversion, formatting and comparison
pub mod conversion;

/// Per-vendor column mapping overrides
pub mod dialects;

/// Prelude for convenient imports
///
/// ```rust
/// use rust_row_metadata::prelude::*;
///
/// let meta = ValueMeta::new("id", LogicalType::Integer);
/// assert!(meta.is_numeric());
/// ```
pub mod prelude {
    pub use crate::conversion::{Collator, NarrowConverter};
    pub use crate::core::{
        sql_types, BoundValue, ColumnMetadata, ConversionConfig, DatabaseVendor, LogicalType,
        MapperOptions, MetaError, Result, StorageType, TimestampNumberMode, TrimType, TypeMapper,
        Value, ValueMeta, ValueMetaFactory,
    };
}

// Re-export at root level for convenience
pub use conversion::NarrowConverter;
pub use core::{
    ConversionConfig, DatabaseVendor, LogicalType, MetaError, Result, StorageType, TrimType,
    TypeMapper, Value, ValueMeta, ValueMetaFactory,
};
