//! Value descriptor
//!
//! A [`ValueMeta`] describes one column: its logical type, how values are
//! physically stored, and the formatting, locale and collation rules used when
//! values are converted or compared.

use super::config::ConversionConfig;
use super::error::{MetaError, Result};
use super::value::Value;
use super::value_types::{LogicalType, StorageType, TrimType};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Default mask used to format integers
pub const DEFAULT_INTEGER_FORMAT_MASK: &str = "####0;-####0";
/// Default mask used to format numbers
pub const DEFAULT_NUMBER_FORMAT_MASK: &str = "####0.0#########;-####0.0#########";
/// Default mask used to format big numbers
pub const DEFAULT_BIG_NUMBER_FORMAT_MASK: &str =
    "######0.0###################;-######0.0###################";
/// Default mask used to format and parse dates
pub const DEFAULT_DATE_FORMAT_MASK: &str = "yyyy/MM/dd HH:mm:ss.SSS";
/// Default mask used to format and parse timestamps
pub const DEFAULT_TIMESTAMP_FORMAT_MASK: &str = "yyyy/MM/dd HH:mm:ss.SSSSSSSSS";

/// Default mask used when a string is parsed as an integer
pub const DEFAULT_INTEGER_PARSE_MASK: &str = "####0";
/// Default mask used when a string is parsed as a number
pub const DEFAULT_NUMBER_PARSE_MASK: &str = "####0.0#########";
/// Default mask used when a string is parsed as a big number
pub const DEFAULT_BIG_NUMBER_PARSE_MASK: &str = "######0.0###################";

/// Locale assumed when none is configured
pub const DEFAULT_LOCALE: &str = "en-US";

/// Length given to large character columns such as CLOBs
pub const CLOB_LENGTH: i32 = 9_999_999;

/// Metadata describing a single column of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueMeta {
    pub(crate) name: String,
    pub(crate) value_type: LogicalType,
    pub(crate) storage_type: StorageType,
    pub(crate) length: i32,
    pub(crate) precision: i32,
    pub(crate) origin: Option<String>,
    pub(crate) comments: Option<String>,
    pub(crate) conversion_mask: Option<String>,
    pub(crate) decimal_symbol: Option<String>,
    pub(crate) grouping_symbol: Option<String>,
    pub(crate) currency_symbol: Option<String>,
    pub(crate) trim_type: TrimType,
    pub(crate) case_insensitive: bool,
    pub(crate) sorted_descending: bool,
    pub(crate) output_padding: bool,
    pub(crate) date_format_lenient: bool,
    pub(crate) lenient_string_to_number: bool,
    pub(crate) date_format_locale: Option<String>,
    pub(crate) date_format_time_zone: Tz,
    pub(crate) collator_disabled: bool,
    pub(crate) collator_locale: String,
    pub(crate) collator_strength: i32,
    pub(crate) large_text_field: bool,
    pub(crate) index: Option<Vec<Value>>,
    pub(crate) storage_metadata: Option<Box<ValueMeta>>,
    pub(crate) conversion_metadata: Option<Box<ValueMeta>>,
    #[serde(skip, default = "ConversionConfig::current")]
    pub(crate) config: ConversionConfig,
}

impl ValueMeta {
    /// Create a descriptor using the process-wide conversion configuration
    pub fn new<S: Into<String>>(name: S, value_type: LogicalType) -> Self {
        Self::with_config(name, value_type, ConversionConfig::current())
    }

    /// Create a descriptor with an explicit conversion configuration
    pub fn with_config<S: Into<String>>(
        name: S,
        value_type: LogicalType,
        config: ConversionConfig,
    ) -> Self {
        let mut meta = Self {
            name: name.into(),
            value_type,
            storage_type: StorageType::Normal,
            length: -1,
            precision: -1,
            origin: None,
            comments: None,
            conversion_mask: None,
            decimal_symbol: Some(".".to_string()),
            grouping_symbol: Some(",".to_string()),
            currency_symbol: None,
            trim_type: TrimType::None,
            case_insensitive: false,
            sorted_descending: false,
            output_padding: false,
            date_format_lenient: false,
            lenient_string_to_number: config.lenient_string_to_number,
            date_format_locale: None,
            date_format_time_zone: Tz::UTC,
            collator_disabled: true,
            collator_locale: DEFAULT_LOCALE.to_string(),
            collator_strength: 0,
            large_text_field: false,
            index: None,
            storage_metadata: None,
            conversion_metadata: None,
            config,
        };
        meta.set_default_conversion_mask();
        meta
    }

    fn set_default_conversion_mask(&mut self) {
        match self.value_type {
            LogicalType::Integer => {
                self.conversion_mask = Some(DEFAULT_INTEGER_FORMAT_MASK.to_string());
            }
            LogicalType::Number => {
                self.conversion_mask = Some(DEFAULT_NUMBER_FORMAT_MASK.to_string());
            }
            LogicalType::BigNumber => {
                self.conversion_mask = Some(DEFAULT_BIG_NUMBER_FORMAT_MASK.to_string());
                self.grouping_symbol = None;
                self.decimal_symbol = Some(".".to_string());
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Logical type; fixed for the lifetime of the descriptor
    pub fn value_type(&self) -> LogicalType {
        self.value_type
    }

    /// Display name of the logical type
    pub fn type_desc(&self) -> &'static str {
        self.value_type.to_str()
    }

    /// Name of the native Rust type backing values of this descriptor
    pub fn native_type_name(&self) -> Result<&'static str> {
        match self.value_type {
            LogicalType::None => Err(MetaError::unimplemented(
                "the generic descriptor has no native data type",
            )),
            LogicalType::Number => Ok("f64"),
            LogicalType::String => Ok("String"),
            LogicalType::Date | LogicalType::Timestamp => Ok("chrono::DateTime<Utc>"),
            LogicalType::Boolean => Ok("bool"),
            LogicalType::Integer => Ok("i64"),
            LogicalType::BigNumber => Ok("rust_decimal::Decimal"),
            LogicalType::Serializable | LogicalType::Binary => Ok("Vec<u8>"),
            LogicalType::InternetAddress => Ok("std::net::IpAddr"),
        }
    }

    pub fn is_string(&self) -> bool {
        self.value_type == LogicalType::String
    }

    pub fn is_numeric(&self) -> bool {
        self.value_type.is_numeric()
    }

    pub fn is_date(&self) -> bool {
        self.value_type.is_temporal()
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Change the storage type
    ///
    /// Leaving indexed storage drops the dictionary; leaving binary-string
    /// storage drops the storage metadata.
    pub fn set_storage_type(&mut self, storage_type: StorageType) {
        if storage_type != StorageType::Indexed {
            self.index = None;
        }
        if storage_type != StorageType::BinaryString {
            self.storage_metadata = None;
        }
        self.storage_type = storage_type;
    }

    pub fn is_storage_normal(&self) -> bool {
        self.storage_type == StorageType::Normal
    }

    pub fn is_storage_binary_string(&self) -> bool {
        self.storage_type == StorageType::BinaryString
    }

    pub fn is_storage_indexed(&self) -> bool {
        self.storage_type == StorageType::Indexed
    }

    /// Dictionary of values for indexed storage
    pub fn index(&self) -> Option<&[Value]> {
        self.index.as_deref()
    }

    /// Set the dictionary; requires indexed storage
    pub fn set_index(&mut self, index: Option<Vec<Value>>) -> Result<()> {
        if index.is_some() && !self.is_storage_indexed() {
            return Err(MetaError::invalid_metadata(format!(
                "{}: a dictionary requires indexed storage, not {}",
                self.name, self.storage_type
            )));
        }
        self.index = index;
        Ok(())
    }

    /// Descriptor used to decode binary-string storage
    pub fn storage_metadata(&self) -> Option<&ValueMeta> {
        self.storage_metadata.as_deref()
    }

    /// Set the storage metadata; requires binary-string storage
    pub fn set_storage_metadata(&mut self, meta: Option<ValueMeta>) -> Result<()> {
        if meta.is_some() && !self.is_storage_binary_string() {
            return Err(MetaError::invalid_metadata(format!(
                "{}: storage metadata requires binary-string storage, not {}",
                self.name, self.storage_type
            )));
        }
        self.storage_metadata = meta.map(Box::new);
        Ok(())
    }

    /// Descriptor used to retype values on demand
    pub fn conversion_metadata(&self) -> Option<&ValueMeta> {
        self.conversion_metadata.as_deref()
    }

    pub fn set_conversion_metadata(&mut self, meta: Option<ValueMeta>) {
        self.conversion_metadata = meta.map(Box::new);
    }

    // ------------------------------------------------------------------
    // Length and descriptive fields
    // ------------------------------------------------------------------

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn set_length(&mut self, length: i32) {
        self.length = length;
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn set_precision(&mut self, precision: i32) {
        self.precision = precision;
    }

    pub fn set_length_and_precision(&mut self, length: i32, precision: i32) {
        self.length = length;
        self.precision = precision;
    }

    /// Check if the length is unknown or zero
    pub fn is_length_invalid_or_zero(&self) -> bool {
        self.length < 1
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn set_origin(&mut self, origin: Option<String>) {
        self.origin = origin;
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn set_comments(&mut self, comments: Option<String>) {
        self.comments = comments;
    }

    /// Whether the column holds large character objects
    pub fn is_large_text_field(&self) -> bool {
        self.large_text_field
    }

    pub fn set_large_text_field(&mut self, large: bool) {
        self.large_text_field = large;
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    pub fn conversion_mask(&self) -> Option<&str> {
        self.conversion_mask.as_deref()
    }

    pub fn set_conversion_mask(&mut self, mask: Option<String>) {
        self.conversion_mask = mask;
    }

    pub fn decimal_symbol(&self) -> Option<&str> {
        self.decimal_symbol.as_deref()
    }

    pub fn set_decimal_symbol(&mut self, symbol: Option<String>) {
        self.decimal_symbol = symbol;
    }

    pub fn grouping_symbol(&self) -> Option<&str> {
        self.grouping_symbol.as_deref()
    }

    pub fn set_grouping_symbol(&mut self, symbol: Option<String>) {
        self.grouping_symbol = symbol;
    }

    pub fn currency_symbol(&self) -> Option<&str> {
        self.currency_symbol.as_deref()
    }

    pub fn set_currency_symbol(&mut self, symbol: Option<String>) {
        self.currency_symbol = symbol;
    }

    pub fn is_output_padding(&self) -> bool {
        self.output_padding
    }

    pub fn set_output_padding(&mut self, padding: bool) {
        self.output_padding = padding;
    }

    pub fn is_date_format_lenient(&self) -> bool {
        self.date_format_lenient
    }

    pub fn set_date_format_lenient(&mut self, lenient: bool) {
        self.date_format_lenient = lenient;
    }

    pub fn is_lenient_string_to_number(&self) -> bool {
        self.lenient_string_to_number
    }

    pub fn set_lenient_string_to_number(&mut self, lenient: bool) {
        self.lenient_string_to_number = lenient;
    }

    pub fn date_format_locale(&self) -> Option<&str> {
        self.date_format_locale.as_deref()
    }

    pub fn set_date_format_locale(&mut self, locale: Option<String>) {
        self.date_format_locale = locale;
    }

    pub fn date_format_time_zone(&self) -> Tz {
        self.date_format_time_zone
    }

    pub fn set_date_format_time_zone(&mut self, tz: Tz) {
        self.date_format_time_zone = tz;
    }

    /// Mask used for the given target type
    ///
    /// The configured conversion mask wins; otherwise a String descriptor uses
    /// the parse defaults and every other descriptor the format defaults.
    pub fn mask_for(&self, target: LogicalType) -> Option<String> {
        if let Some(mask) = self.conversion_mask.as_deref().filter(|m| !m.is_empty()) {
            return Some(mask.to_string());
        }
        let from_string = self.is_string();
        let mask = match target {
            LogicalType::Integer if from_string => DEFAULT_INTEGER_PARSE_MASK.to_string(),
            LogicalType::Integer => self.integer_format_mask(),
            LogicalType::Number if from_string => DEFAULT_NUMBER_PARSE_MASK.to_string(),
            LogicalType::Number => self.number_format_mask(DEFAULT_NUMBER_FORMAT_MASK),
            LogicalType::BigNumber if from_string => DEFAULT_BIG_NUMBER_PARSE_MASK.to_string(),
            LogicalType::BigNumber => self.number_format_mask(DEFAULT_BIG_NUMBER_FORMAT_MASK),
            LogicalType::Date => DEFAULT_DATE_FORMAT_MASK.to_string(),
            LogicalType::Timestamp => DEFAULT_TIMESTAMP_FORMAT_MASK.to_string(),
            _ => return None,
        };
        Some(mask)
    }

    /// Check if the date mask in effect is the built-in default
    pub fn uses_default_date_mask(&self) -> bool {
        self.conversion_mask
            .as_deref()
            .map(|m| m.is_empty())
            .unwrap_or(true)
    }

    fn integer_format_mask(&self) -> String {
        if self.is_length_invalid_or_zero() {
            return DEFAULT_INTEGER_FORMAT_MASK.to_string();
        }
        // An i64 never has more than 19 digits
        let zeros = "0".repeat((self.length as usize).min(19));
        format!(" {};-{}", zeros, zeros)
    }

    // Fixed-width pattern derived from length and precision, e.g. (5,2) -> " 000.00"
    fn number_format_mask(&self, default: &str) -> String {
        if self.is_length_invalid_or_zero() {
            return default.to_string();
        }
        let length = self.length as usize;
        let mut positive: Vec<char> = vec![' '];
        if self.precision < 0 {
            positive.extend(std::iter::repeat('0').take(length));
            positive.extend(".00".chars());
        } else {
            positive.extend(std::iter::repeat('0').take(length + 1));
            let pos = self.length - self.precision + 1;
            if pos >= 0 && (pos as usize) < positive.len() {
                positive[pos as usize] = '.';
            }
        }
        let positive: String = positive.into_iter().collect();
        let negative = format!("-{}", &positive[1..]);
        format!("{};{}", positive, negative)
    }

    // ------------------------------------------------------------------
    // Text semantics
    // ------------------------------------------------------------------

    pub fn trim_type(&self) -> TrimType {
        self.trim_type
    }

    pub fn set_trim_type(&mut self, trim_type: TrimType) {
        self.trim_type = trim_type;
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
        self.case_insensitive = case_insensitive;
    }

    pub fn is_sorted_descending(&self) -> bool {
        self.sorted_descending
    }

    pub fn set_sorted_descending(&mut self, descending: bool) {
        self.sorted_descending = descending;
    }

    pub fn is_collator_disabled(&self) -> bool {
        self.collator_disabled
    }

    pub fn set_collator_disabled(&mut self, disabled: bool) {
        self.collator_disabled = disabled;
    }

    pub fn collator_locale(&self) -> &str {
        &self.collator_locale
    }

    pub fn set_collator_locale<S: Into<String>>(&mut self, locale: S) {
        self.collator_locale = locale.into();
    }

    pub fn collator_strength(&self) -> i32 {
        self.collator_strength
    }

    /// Set the collation strength, clamped to `0..=3`
    pub fn set_collator_strength(&mut self, strength: i32) {
        self.collator_strength = strength.clamp(0, 3);
    }

    // ------------------------------------------------------------------
    // Configuration snapshot
    // ------------------------------------------------------------------

    /// Conversion switches captured at construction
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Whether bound dates should skip timezone-aware calendars
    pub fn is_ignore_timezone(&self) -> bool {
        self.config.db_ignore_timezone
    }

    // ------------------------------------------------------------------
    // Text export
    // ------------------------------------------------------------------

    /// Short description such as `String(10)<binary-string>`
    pub fn to_string_meta(&self) -> String {
        let mut out = self.type_desc().to_string();
        match self.value_type {
            LogicalType::Number | LogicalType::BigNumber => {
                if self.length > 0 {
                    if self.precision > 0 {
                        out.push_str(&format!("({}, {})", self.length, self.precision));
                    } else {
                        out.push_str(&format!("({})", self.length));
                    }
                }
            }
            LogicalType::String | LogicalType::Integer | LogicalType::Binary => {
                if self.length > 0 {
                    out.push_str(&format!("({})", self.length));
                }
            }
            _ => {}
        }
        match self.storage_type {
            StorageType::Normal => {}
            other => out.push_str(&format!("<{}>", other)),
        }
        out
    }

    /// Serialize the descriptor to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a descriptor from JSON, snapshotting the current configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PartialEq for ValueMeta {
    // The configuration snapshot is process state, not a descriptor attribute.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value_type == other.value_type
            && self.storage_type == other.storage_type
            && self.length == other.length
            && self.precision == other.precision
            && self.origin == other.origin
            && self.comments == other.comments
            && self.conversion_mask == other.conversion_mask
            && self.decimal_symbol == other.decimal_symbol
            && self.grouping_symbol == other.grouping_symbol
            && self.currency_symbol == other.currency_symbol
            && self.trim_type == other.trim_type
            && self.case_insensitive == other.case_insensitive
            && self.sorted_descending == other.sorted_descending
            && self.output_padding == other.output_padding
            && self.date_format_lenient == other.date_format_lenient
            && self.lenient_string_to_number == other.lenient_string_to_number
            && self.date_format_locale == other.date_format_locale
            && self.date_format_time_zone == other.date_format_time_zone
            && self.collator_disabled == other.collator_disabled
            && self.collator_locale == other.collator_locale
            && self.collator_strength == other.collator_strength
            && self.large_text_field == other.large_text_field
            && self.index == other.index
            && self.storage_metadata == other.storage_metadata
            && self.conversion_metadata == other.conversion_metadata
    }
}

impl std::fmt::Display for ValueMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.to_string_meta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(value_type: LogicalType) -> ValueMeta {
        ValueMeta::with_config("col", value_type, ConversionConfig::new())
    }

    #[test]
    fn test_defaults() {
        let m = meta(LogicalType::String);
        assert_eq!(m.storage_type(), StorageType::Normal);
        assert_eq!(m.length(), -1);
        assert_eq!(m.precision(), -1);
        assert_eq!(m.decimal_symbol(), Some("."));
        assert_eq!(m.grouping_symbol(), Some(","));
        assert!(m.is_collator_disabled());
        assert_eq!(m.collator_strength(), 0);
        assert_eq!(m.conversion_mask(), None);
        assert_eq!(m.date_format_time_zone(), Tz::UTC);
    }

    #[test]
    fn test_default_numeric_masks() {
        assert_eq!(
            meta(LogicalType::Integer).conversion_mask(),
            Some(DEFAULT_INTEGER_FORMAT_MASK)
        );
        assert_eq!(
            meta(LogicalType::Number).conversion_mask(),
            Some(DEFAULT_NUMBER_FORMAT_MASK)
        );

        let big = meta(LogicalType::BigNumber);
        assert_eq!(big.conversion_mask(), Some(DEFAULT_BIG_NUMBER_FORMAT_MASK));
        assert_eq!(big.grouping_symbol(), None);
        assert_eq!(big.decimal_symbol(), Some("."));
    }

    #[test]
    fn test_mask_for_string_uses_parse_defaults() {
        let m = meta(LogicalType::String);
        assert_eq!(
            m.mask_for(LogicalType::Integer).as_deref(),
            Some(DEFAULT_INTEGER_PARSE_MASK)
        );
        assert_eq!(
            m.mask_for(LogicalType::Date).as_deref(),
            Some(DEFAULT_DATE_FORMAT_MASK)
        );
        assert_eq!(m.mask_for(LogicalType::Boolean), None);
    }

    #[test]
    fn test_mask_from_length_and_precision() {
        let mut m = meta(LogicalType::Number);
        m.set_conversion_mask(None);
        m.set_length_and_precision(5, 2);
        assert_eq!(
            m.mask_for(LogicalType::Number).as_deref(),
            Some(" 000.00;-000.00")
        );

        let mut m = meta(LogicalType::Integer);
        m.set_conversion_mask(None);
        m.set_length(3);
        assert_eq!(m.mask_for(LogicalType::Integer).as_deref(), Some(" 000;-000"));

        m.set_length(CLOB_LENGTH);
        let zeros = "0".repeat(19);
        assert_eq!(
            m.mask_for(LogicalType::Integer),
            Some(format!(" {};-{}", zeros, zeros))
        );
    }

    #[test]
    fn test_storage_invariants() {
        let mut m = meta(LogicalType::String);
        assert!(m.set_index(Some(vec![Value::from("a")])).is_err());
        assert!(m.set_storage_metadata(Some(meta(LogicalType::String))).is_err());

        m.set_storage_type(StorageType::Indexed);
        assert!(m.set_index(Some(vec![Value::from("a")])).is_ok());
        assert_eq!(m.index().map(|i| i.len()), Some(1));

        m.set_storage_type(StorageType::BinaryString);
        assert!(m.index().is_none());
        assert!(m.set_storage_metadata(Some(meta(LogicalType::String))).is_ok());

        m.set_storage_type(StorageType::Normal);
        assert!(m.storage_metadata().is_none());
    }

    #[test]
    fn test_native_type_name() {
        assert!(matches!(
            meta(LogicalType::None).native_type_name(),
            Err(MetaError::Unimplemented(_))
        ));
        assert_eq!(meta(LogicalType::Integer).native_type_name().unwrap(), "i64");
    }

    #[test]
    fn test_to_string_meta() {
        let mut m = meta(LogicalType::String);
        m.set_length(10);
        m.set_storage_type(StorageType::BinaryString);
        assert_eq!(m.to_string_meta(), "String(10)<binary-string>");
        assert_eq!(m.to_string(), "col String(10)<binary-string>");

        let mut m = meta(LogicalType::Number);
        m.set_length_and_precision(7, 2);
        assert_eq!(m.to_string_meta(), "Number(7, 2)");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut m = meta(LogicalType::Date);
        m.set_conversion_mask(Some("yyyy-MM-dd".to_string()));
        m.set_date_format_time_zone(Tz::Europe__Paris);
        m.set_comments(Some("birth date".to_string()));

        let json = m.to_json().unwrap();
        let restored = ValueMeta::from_json(&json).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn test_collator_strength_clamped() {
        let mut m = meta(LogicalType::String);
        m.set_collator_strength(7);
        assert_eq!(m.collator_strength(), 3);
        m.set_collator_strength(-2);
        assert_eq!(m.collator_strength(), 0);
    }
}
