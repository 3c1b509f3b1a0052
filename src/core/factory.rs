//! Descriptor factory
//!
//! Builds descriptors from numeric type ids or type names and clones
//! descriptors into a different logical type.

use super::error::{MetaError, Result};
use super::value_meta::ValueMeta;
use super::value_types::{LogicalType, StorageType};
use std::str::FromStr;

/// Factory for [`ValueMeta`] instances
pub struct ValueMetaFactory;

impl ValueMetaFactory {
    /// Create a descriptor for a type id
    ///
    /// String descriptors carry no precision; integer and binary descriptors
    /// always have precision 0.
    pub fn create(type_id: i32, name: &str, length: i32, precision: i32) -> Result<ValueMeta> {
        let value_type = LogicalType::from_id(type_id)
            .ok_or_else(|| MetaError::plugin_lookup(format!("type id {}", type_id)))?;
        Ok(Self::create_typed(value_type, name, length, precision))
    }

    /// Create a descriptor for a known logical type
    pub fn create_typed(
        value_type: LogicalType,
        name: &str,
        length: i32,
        precision: i32,
    ) -> ValueMeta {
        let precision = match value_type {
            LogicalType::String => -1,
            LogicalType::Integer | LogicalType::Binary => 0,
            _ => precision,
        };
        let mut meta = ValueMeta::new(name, value_type);
        meta.set_length_and_precision(length, precision);
        meta
    }

    /// Create a descriptor without length or precision
    pub fn create_simple(type_id: i32, name: &str) -> Result<ValueMeta> {
        Self::create(type_id, name, -1, -1)
    }

    /// Create a descriptor from a type name such as `"BigNumber"`
    pub fn create_by_name(type_name: &str, name: &str) -> Result<ValueMeta> {
        let value_type = LogicalType::from_str(type_name)
            .map_err(|_| MetaError::plugin_lookup(type_name.to_string()))?;
        Ok(Self::create_typed(value_type, name, -1, -1))
    }

    /// Type id for a type name, or `None` (0) when unknown
    pub fn id_for_name(type_name: &str) -> i32 {
        LogicalType::from_str(type_name)
            .map(|t| t.id())
            .unwrap_or(LogicalType::None.id())
    }

    /// Names of every creatable type, in id order
    pub fn type_names() -> Vec<&'static str> {
        LogicalType::ALL
            .iter()
            .filter(|t| **t != LogicalType::None)
            .map(|t| t.to_str())
            .collect()
    }

    /// Copy a descriptor into another logical type
    ///
    /// Formatting, locale and collation attributes carry over. The copy
    /// uses normal storage and has no dictionary or conversion metadata.
    pub fn clone_value_meta(source: &ValueMeta, target: LogicalType) -> Result<ValueMeta> {
        let mut meta = ValueMeta::with_config(source.name(), target, *source.config());
        meta.set_length_and_precision(source.length(), source.precision());
        if target == LogicalType::String {
            meta.set_precision(-1);
        }
        meta.set_origin(source.origin().map(str::to_string));
        meta.set_comments(source.comments().map(str::to_string));
        if source.conversion_mask().is_some() {
            meta.set_conversion_mask(source.conversion_mask().map(str::to_string));
        }
        meta.set_decimal_symbol(source.decimal_symbol().map(str::to_string));
        meta.set_grouping_symbol(source.grouping_symbol().map(str::to_string));
        meta.set_currency_symbol(source.currency_symbol().map(str::to_string));
        meta.set_trim_type(source.trim_type());
        meta.set_case_insensitive(source.is_case_insensitive());
        meta.set_sorted_descending(source.is_sorted_descending());
        meta.set_output_padding(source.is_output_padding());
        meta.set_date_format_lenient(source.is_date_format_lenient());
        meta.set_lenient_string_to_number(source.is_lenient_string_to_number());
        meta.set_date_format_locale(source.date_format_locale().map(str::to_string));
        meta.set_date_format_time_zone(source.date_format_time_zone());
        meta.set_collator_disabled(source.is_collator_disabled());
        meta.set_collator_locale(source.collator_locale());
        meta.set_collator_strength(source.collator_strength());
        meta.set_large_text_field(source.is_large_text_field());
        meta.set_storage_type(StorageType::Normal);
        Ok(meta)
    }
}
