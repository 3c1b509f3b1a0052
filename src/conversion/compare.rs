//! Null detection, ordering and hashing of values

use super::address_to_u128;
use super::collation::Collator;
use crate::core::error::{MetaError, Result};
use crate::core::value::Value;
use crate::core::value_meta::ValueMeta;
use crate::core::value_types::{LogicalType, StorageType};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

impl ValueMeta {
    /// Check if a value counts as null under this descriptor
    ///
    /// Empty strings are null unless the configuration says empty differs
    /// from null. Binary-string storage applies the same rule to empty bytes.
    pub fn is_null(&self, value: &Value) -> Result<bool> {
        if value.is_null() {
            return Ok(true);
        }
        let empty_is_null = !self.config.empty_string_differs_from_null;
        match self.storage_type {
            StorageType::BinaryString => {
                if let Value::Binary(bytes) = value {
                    if bytes.is_empty() {
                        return Ok(empty_is_null);
                    }
                }
            }
            StorageType::Indexed => {
                if let Value::Index(i) = value {
                    let resolved = self.index_lookup(*i)?;
                    return self.is_native_null(&resolved, empty_is_null);
                }
            }
            StorageType::Normal => return self.is_native_null(value, empty_is_null),
        }
        let native = self.convert_to_normal_storage_type(value)?;
        self.is_native_null(&native, empty_is_null)
    }

    fn is_native_null(&self, native: &Value, empty_is_null: bool) -> Result<bool> {
        Ok(match native {
            Value::Null => true,
            Value::String(s) if self.is_string() => {
                empty_is_null && self.trim_type.apply(s).is_empty()
            }
            _ => false,
        })
    }

    /// Compare two values of this descriptor
    ///
    /// Null sorts before any other value; descending order inverts the
    /// whole result.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        let left = self.comparable(a)?;
        let right = self.comparable(b)?;
        self.compare_natives(left.as_ref(), right.as_ref())
    }

    /// Compare a value of this descriptor with one described by `other`
    ///
    /// The right-hand value is brought into this descriptor's type and
    /// storage before comparing.
    pub fn compare_with(&self, a: &Value, other: &ValueMeta, b: &Value) -> Result<Ordering> {
        if self.value_type == other.value_type {
            if self.storage_type == other.storage_type {
                return self.compare(a, b);
            }
            let converted = match self.storage_type {
                StorageType::Normal => other.convert_to_normal_storage_type(b)?,
                StorageType::BinaryString => {
                    let storage_mask = self
                        .storage_metadata()
                        .and_then(|sm| sm.conversion_mask())
                        .filter(|m| !m.is_empty());
                    let mut encoder = other.clone();
                    if let Some(mask) = storage_mask {
                        encoder.set_conversion_mask(Some(mask.to_string()));
                    }
                    encoder.convert_to_binary_string_storage_type(b)?
                }
                StorageType::Indexed => {
                    let left = self.comparable(a)?;
                    let right = other.comparable(b)?;
                    return self.compare_natives(left.as_ref(), right.as_ref());
                }
            };
            return self.compare(a, &converted);
        }

        // Integers against doubles compare as doubles.
        if self.value_type == LogicalType::Integer && other.value_type == LogicalType::Number {
            let promoted = other.convert_data(self, a)?;
            return Ok(other
                .compare_natives(other.comparable(b)?.as_ref(), Some(&promoted).filter(|v| !v.is_null()))?
                .reverse());
        }

        let left = self.comparable(a)?;
        let converted = self.convert_data(other, b)?;
        let right = if self.is_native_null(&converted, !self.config.empty_string_differs_from_null)? {
            None
        } else {
            Some(converted)
        };
        self.compare_natives(left.as_ref(), right.as_ref())
    }

    /// Hash a value consistently with [`ValueMeta::compare`]
    ///
    /// Every type hashes null to a distinct constant.
    pub fn hash_code(&self, value: &Value) -> Result<u64> {
        let salt = self.value_type.hash_salt();
        let native = match self.comparable(value)? {
            Some(v) => v,
            None => return Ok(salt),
        };
        let mut state = DefaultHasher::new();
        self.value_type.id().hash(&mut state);
        match &native {
            Value::String(s) => {
                let s = self.trim_type.apply(s);
                if !self.collator_disabled {
                    self.collator().hash_key(s, &mut state);
                } else if self.case_insensitive {
                    s.to_lowercase().hash(&mut state);
                } else {
                    s.hash(&mut state);
                }
            }
            Value::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                n.to_bits().hash(&mut state);
            }
            Value::Integer(i) => i.hash(&mut state),
            Value::BigNumber(d) => d.normalize().hash(&mut state),
            Value::Boolean(b) => b.hash(&mut state),
            Value::Date(d) | Value::Timestamp(d) => {
                d.timestamp().hash(&mut state);
                d.timestamp_subsec_nanos().hash(&mut state);
            }
            Value::Binary(b) | Value::Serializable(b) => b.hash(&mut state),
            Value::InternetAddress(a) => address_to_u128(a).hash(&mut state),
            Value::Null | Value::Index(_) => {}
        }
        Ok(state.finish() ^ salt)
    }

    /// Collator configured on this descriptor
    pub fn collator(&self) -> Collator {
        Collator::new(self.collator_locale.clone(), self.collator_strength)
    }

    // Native, normal-storage value; `None` for anything that counts as null.
    fn comparable(&self, value: &Value) -> Result<Option<Value>> {
        if self.is_null(value)? {
            return Ok(None);
        }
        Ok(self.native_value(value)?.map(|v| v.into_owned()))
    }

    fn compare_natives(&self, a: Option<&Value>, b: Option<&Value>) -> Result<Ordering> {
        let cmp = match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => self.compare_present(a, b)?,
        };
        Ok(if self.sorted_descending {
            cmp.reverse()
        } else {
            cmp
        })
    }

    fn compare_present(&self, a: &Value, b: &Value) -> Result<Ordering> {
        let cmp = match (a, b) {
            (Value::String(x), Value::String(y)) => {
                let x = self.trim_type.apply(x);
                let y = self.trim_type.apply(y);
                if !self.collator_disabled {
                    self.collator().compare(x, y)
                } else if self.case_insensitive {
                    x.chars()
                        .flat_map(char::to_lowercase)
                        .cmp(y.chars().flat_map(char::to_lowercase))
                } else {
                    x.cmp(y)
                }
            }
            (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
            (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
            (Value::BigNumber(x), Value::BigNumber(y)) => x.cmp(y),
            (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
            (Value::Date(x), Value::Date(y))
            | (Value::Timestamp(x), Value::Timestamp(y))
            | (Value::Date(x), Value::Timestamp(y))
            | (Value::Timestamp(x), Value::Date(y)) => x.cmp(y),
            (Value::Binary(x), Value::Binary(y))
            | (Value::Serializable(x), Value::Serializable(y)) => {
                x.len().cmp(&y.len()).then_with(|| x.cmp(y))
            }
            (Value::InternetAddress(x), Value::InternetAddress(y)) => {
                address_to_u128(x).cmp(&address_to_u128(y))
            }
            (x, y) => {
                return Err(MetaError::type_mismatch(x.type_name(), y.type_name()));
            }
        };
        Ok(cmp)
    }
}
