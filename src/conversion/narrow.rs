//! Narrow converter
//!
//! Retypes a single value when no full descriptor is at hand. Only the pairs
//! listed in [`NarrowConverter::supports`] are defined; formatting uses the
//! default masks of the source type.

use crate::core::config::ConversionConfig;
use crate::core::error::{MetaError, Result};
use crate::core::value::Value;
use crate::core::value_meta::ValueMeta;
use crate::core::value_types::LogicalType;

/// Explicit source-type by target-type converter
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowConverter {
    config: ConversionConfig,
}

impl NarrowConverter {
    /// Converter using the process-wide configuration
    pub fn new() -> Self {
        Self::with_config(ConversionConfig::current())
    }

    pub fn with_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Check if a conversion pair is defined
    pub fn supports(source: LogicalType, target: LogicalType) -> bool {
        use LogicalType::*;
        match source {
            String => target != Serializable && target != None,
            Integer => matches!(
                target,
                String | Integer | Number | BigNumber | Boolean | Date | Timestamp
            ),
            Number => matches!(target, String | Number | Integer | BigNumber | Boolean),
            BigNumber => matches!(target, String | BigNumber | Number | Integer | Boolean),
            Boolean => matches!(target, Boolean | String | Integer),
            Date => matches!(
                target,
                String | Integer | Number | BigNumber | Date | Timestamp
            ),
            Timestamp => matches!(
                target,
                Integer | Number | BigNumber | Date | String | Timestamp
            ),
            Binary => matches!(target, Binary | String),
            InternetAddress => matches!(target, InternetAddress | String),
            Serializable => target == Serializable,
            None => false,
        }
    }

    /// Convert `value` of type `source` into type `target`
    ///
    /// Null converts to null for every pair, defined or not.
    pub fn convert(&self, source: LogicalType, target: LogicalType, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if value.logical_type() != Some(source) {
            return Err(MetaError::type_mismatch(source.to_str(), value.type_name()));
        }
        if !Self::supports(source, target) {
            return Err(MetaError::conversion(format!(
                "Unable to convert from {} to {}",
                source, target
            )));
        }
        if source == target {
            return Ok(value.clone());
        }
        let from = ValueMeta::with_config("value", source, self.config);
        let to = ValueMeta::with_config("value", target, self.config);
        to.convert_data(&from, value)
    }
}
