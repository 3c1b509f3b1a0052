//! Storage adapter
//!
//! Values may be held in their native form, as the raw bytes they were read
//! with (decoded lazily through the storage metadata), or as an index into a
//! dictionary of distinct values.

use super::error::{MetaError, Result};
use super::value::Value;
use super::value_meta::ValueMeta;
use super::value_types::StorageType;

impl ValueMeta {
    /// Bring a stored value into normal storage
    pub fn convert_to_normal_storage_type(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.storage_type {
            StorageType::Normal => Ok(value.clone()),
            StorageType::BinaryString => match value {
                Value::Binary(bytes) => self.convert_binary_string_to_native_type(bytes),
                other => Err(MetaError::type_mismatch("binary string", other.type_name())),
            },
            StorageType::Indexed => match value {
                Value::Index(i) => self.index_lookup(*i),
                other => Err(MetaError::type_mismatch("index", other.type_name())),
            },
        }
    }

    /// Bring a stored value into binary-string form
    pub fn convert_to_binary_string_storage_type(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.storage_type {
            StorageType::Normal => self.convert_normal_storage_type_to_binary_string(value),
            StorageType::BinaryString => Ok(value.clone()),
            StorageType::Indexed => {
                let native = self.convert_to_normal_storage_type(value)?;
                self.convert_normal_storage_type_to_binary_string(&native)
            }
        }
    }

    /// Decode raw bytes into this descriptor's native type
    pub fn convert_binary_string_to_native_type(&self, bytes: &[u8]) -> Result<Value> {
        let storage_meta = self.storage_metadata.as_deref().ok_or_else(|| {
            MetaError::invalid_metadata(format!(
                "{}: binary-string storage without storage metadata",
                self
            ))
        })?;
        let text = match self.convert_binary_string_to_string(bytes)? {
            Some(text) => text,
            None => return Ok(Value::Null),
        };
        let raw = if storage_meta.is_string() {
            Value::String(text)
        } else {
            storage_meta.from_string(Some(&text))?
        };
        self.convert_data(storage_meta, &raw)
    }

    /// Raw bytes as text; empty bytes are null unless empty differs from null
    pub fn convert_binary_string_to_string(&self, bytes: &[u8]) -> Result<Option<String>> {
        if bytes.is_empty() && !self.config.empty_string_differs_from_null {
            return Ok(None);
        }
        String::from_utf8(bytes.to_vec()).map(Some).map_err(|e| {
            MetaError::conversion(format!("{}: stored bytes are not valid UTF-8: {}", self, e))
        })
    }

    /// Format a native value into the bytes binary-string storage holds
    ///
    /// The storage metadata supplies the format when present, so the result
    /// decodes back through [`ValueMeta::convert_binary_string_to_native_type`].
    pub fn convert_normal_storage_type_to_binary_string(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.check_native(value)?;
        let formatter = self.storage_metadata.as_deref().unwrap_or(self);
        let text = formatter.format_native(value)?;
        Ok(Value::Binary(text.into_bytes()))
    }

    /// Dictionary entry for an index
    pub fn index_lookup(&self, index: i32) -> Result<Value> {
        let dictionary = self.index.as_deref().unwrap_or(&[]);
        usize::try_from(index)
            .ok()
            .and_then(|i| dictionary.get(i))
            .cloned()
            .ok_or_else(|| MetaError::index_out_of_range(index as i64, dictionary.len()))
    }

    /// Position of a native value in the dictionary, appending it if missing
    pub fn index_of_or_insert(&mut self, value: &Value) -> Result<i32> {
        if !self.is_storage_indexed() {
            return Err(MetaError::invalid_metadata(format!(
                "{}: dictionary lookups require indexed storage",
                self
            )));
        }
        let dictionary = self.index.get_or_insert_with(Vec::new);
        if let Some(pos) = dictionary.iter().position(|v| v == value) {
            return Ok(pos as i32);
        }
        let pos = i32::try_from(dictionary.len())
            .map_err(|_| MetaError::other("dictionary exceeds i32::MAX entries"))?;
        dictionary.push(value.clone());
        Ok(pos)
    }

    /// Decode a stored value; same as [`ValueMeta::convert_to_normal_storage_type`]
    pub fn decode_storage(&self, stored: &Value) -> Result<Value> {
        self.convert_to_normal_storage_type(stored)
    }

    /// Encode a native value into this descriptor's storage representation
    pub fn encode_storage(&mut self, native: &Value) -> Result<Value> {
        if native.is_null() {
            return Ok(Value::Null);
        }
        match self.storage_type {
            StorageType::Normal => {
                self.check_native(native)?;
                Ok(native.clone())
            }
            StorageType::BinaryString => self.convert_normal_storage_type_to_binary_string(native),
            StorageType::Indexed => {
                self.check_native(native)?;
                self.index_of_or_insert(native).map(Value::Index)
            }
        }
    }
}
