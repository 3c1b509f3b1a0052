//! Process-wide conversion switches
//!
//! A [`ConversionConfig`] is copied into every value descriptor when it is
//! constructed. Installing a new global configuration afterwards does not
//! change descriptors that already exist.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property enabling the lenient string to number parser
pub const LENIENT_STRING_TO_NUMBER: &str = "ROWMETA_LENIENT_STRING_TO_NUMBER_CONVERSION";
/// Property making a null string convert to an empty string
pub const EMPTY_STRING_DIFFERS_FROM_NULL: &str = "ROWMETA_EMPTY_STRING_DIFFERS_FROM_NULL";
/// Property keeping null strings null even when empty strings differ from null
pub const DO_NOT_NORMALIZE_NULL_STRING_TO_EMPTY: &str =
    "ROWMETA_DO_NOT_NORMALIZE_NULL_STRING_TO_EMPTY";
/// Property keeping whitespace-only strings as they are
pub const DO_NOT_NORMALIZE_SPACES_ONLY_STRING_TO_EMPTY: &str =
    "ROWMETA_DO_NOT_NORMALIZE_SPACES_ONLY_STRING_TO_EMPTY";
/// Property binding dates without a timezone-aware calendar
pub const DB_IGNORE_TIMEZONE: &str = "ROWMETA_COMPATIBILITY_DB_IGNORE_TIMEZONE";
/// Property selecting how timestamps map to numbers
pub const TIMESTAMP_NUMBER_CONVERSION_MODE: &str = "ROWMETA_TIMESTAMP_NUMBER_CONVERSION_MODE";

static GLOBAL_CONFIG: RwLock<ConversionConfig> = parking_lot::const_rwlock(ConversionConfig::new());

/// How a timestamp is expressed as an integer or decimal magnitude
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampNumberMode {
    /// Milliseconds since the epoch
    #[default]
    Legacy,
    /// Milliseconds since the epoch
    Milliseconds,
    /// Nanoseconds since the epoch
    Nanoseconds,
}

impl TimestampNumberMode {
    /// Convert mode to its property value
    pub fn to_str(&self) -> &'static str {
        match self {
            TimestampNumberMode::Legacy => "LEGACY",
            TimestampNumberMode::Milliseconds => "MILLISECONDS",
            TimestampNumberMode::Nanoseconds => "NANOSECONDS",
        }
    }

    /// Parse a property value; anything unrecognized is legacy
    pub fn parse(s: &str) -> Self {
        match s {
            "MILLISECONDS" => TimestampNumberMode::Milliseconds,
            "NANOSECONDS" => TimestampNumberMode::Nanoseconds,
            _ => TimestampNumberMode::Legacy,
        }
    }

    /// Check if numbers are read as nanoseconds
    pub fn is_nanoseconds(&self) -> bool {
        matches!(self, TimestampNumberMode::Nanoseconds)
    }
}

impl std::fmt::Display for TimestampNumberMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Conversion switches snapshotted by each descriptor
///
/// # Example
///
/// ```
/// use rust_row_metadata::core::{ConversionConfig, TimestampNumberMode};
///
/// let config = ConversionConfig::new()
///     .lenient_string_to_number(true)
///     .timestamp_number_mode(TimestampNumberMode::Nanoseconds);
/// assert!(config.lenient_string_to_number);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub lenient_string_to_number: bool,
    pub empty_string_differs_from_null: bool,
    pub do_not_normalize_null_string_to_empty: bool,
    pub do_not_normalize_spaces_only_string_to_empty: bool,
    pub db_ignore_timezone: bool,
    pub timestamp_number_mode: TimestampNumberMode,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionConfig {
    /// Create a configuration with every switch off
    pub const fn new() -> Self {
        Self {
            lenient_string_to_number: false,
            empty_string_differs_from_null: false,
            do_not_normalize_null_string_to_empty: false,
            do_not_normalize_spaces_only_string_to_empty: false,
            db_ignore_timezone: false,
            timestamp_number_mode: TimestampNumberMode::Legacy,
        }
    }

    /// Set the lenient string to number switch
    pub fn lenient_string_to_number(mut self, enabled: bool) -> Self {
        self.lenient_string_to_number = enabled;
        self
    }

    /// Set the empty-string-differs-from-null switch
    pub fn empty_string_differs_from_null(mut self, enabled: bool) -> Self {
        self.empty_string_differs_from_null = enabled;
        self
    }

    /// Set the do-not-normalize-null-string-to-empty switch
    pub fn do_not_normalize_null_string_to_empty(mut self, enabled: bool) -> Self {
        self.do_not_normalize_null_string_to_empty = enabled;
        self
    }

    /// Set the do-not-normalize-spaces-only-string-to-empty switch
    pub fn do_not_normalize_spaces_only_string_to_empty(mut self, enabled: bool) -> Self {
        self.do_not_normalize_spaces_only_string_to_empty = enabled;
        self
    }

    /// Set the db-ignore-timezone compatibility switch
    pub fn db_ignore_timezone(mut self, enabled: bool) -> Self {
        self.db_ignore_timezone = enabled;
        self
    }

    /// Set the timestamp to number conversion mode
    pub fn timestamp_number_mode(mut self, mode: TimestampNumberMode) -> Self {
        self.timestamp_number_mode = mode;
        self
    }

    /// Whether a null string becomes `""` when converted to a String value
    pub fn null_string_becomes_empty(&self) -> bool {
        self.empty_string_differs_from_null && !self.do_not_normalize_null_string_to_empty
    }

    /// Build a configuration from a property lookup
    ///
    /// Flags are on only for the exact value `"Y"`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).as_deref() == Some("Y");
        Self {
            lenient_string_to_number: flag(LENIENT_STRING_TO_NUMBER),
            empty_string_differs_from_null: flag(EMPTY_STRING_DIFFERS_FROM_NULL),
            do_not_normalize_null_string_to_empty: flag(DO_NOT_NORMALIZE_NULL_STRING_TO_EMPTY),
            do_not_normalize_spaces_only_string_to_empty: flag(
                DO_NOT_NORMALIZE_SPACES_ONLY_STRING_TO_EMPTY,
            ),
            db_ignore_timezone: flag(DB_IGNORE_TIMEZONE),
            timestamp_number_mode: lookup(TIMESTAMP_NUMBER_CONVERSION_MODE)
                .map(|v| TimestampNumberMode::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Build a configuration from a property map
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| properties.get(key).cloned())
    }

    /// Build a configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot of the process-wide configuration
    pub fn current() -> Self {
        *GLOBAL_CONFIG.read()
    }

    /// Replace the process-wide configuration
    ///
    /// Only descriptors constructed afterwards observe the change.
    pub fn install(self) {
        tracing::debug!(config = ?self, "installing process-wide conversion config");
        *GLOBAL_CONFIG.write() = self;
    }
}
