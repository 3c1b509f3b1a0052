//! Number masks
//!
//! Patterns follow the familiar `#,##0.00;-#,##0.00` notation: `0` is a
//! mandatory digit, `#` an optional one, `,` marks the grouping size and `.`
//! the decimal separator. Text around the digits becomes a prefix or suffix;
//! `¤` stands for the currency symbol and `%` scales the value by 100.

use crate::core::error::{MetaError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Separator and currency symbols used by a [`NumberFormat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: char,
    pub grouping: char,
    pub currency: String,
}

impl Default for NumberSymbols {
    fn default() -> Self {
        Self {
            decimal: '.',
            grouping: ',',
            currency: "¤".to_string(),
        }
    }
}

/// Compiled number mask
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    positive_prefix: String,
    positive_suffix: String,
    negative_prefix: String,
    negative_suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping_size: usize,
    percent: bool,
    symbols: NumberSymbols,
}

/// Digits recognized by [`NumberFormat::parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    pub negative: bool,
    pub integer: String,
    pub fraction: String,
    pub exponent: i32,
    pub percent: bool,
    /// Number of characters consumed
    pub end: usize,
}

struct SubPattern {
    prefix: String,
    suffix: String,
    number: String,
    percent: bool,
}

impl NumberFormat {
    /// Compile a mask with the given symbols
    pub fn new(pattern: &str, symbols: NumberSymbols) -> Self {
        let mut parts = split_pattern(pattern);
        let positive = parse_sub_pattern(&parts.remove(0), &symbols);
        let negative = parts.first().map(|p| parse_sub_pattern(p, &symbols));

        let (int_part, frac_part) = match positive.number.find('.') {
            Some(i) => (&positive.number[..i], &positive.number[i + 1..]),
            None => (positive.number.as_str(), ""),
        };
        let grouping_size = match int_part.rfind(',') {
            Some(i) => int_part[i + 1..].len(),
            None => 0,
        };
        let min_int = int_part.chars().filter(|c| *c == '0').count();
        let min_frac = frac_part.chars().filter(|c| *c == '0').count();
        let max_frac = frac_part.chars().filter(|c| *c == '0' || *c == '#').count();

        let (negative_prefix, negative_suffix) = match negative {
            Some(n) => (n.prefix, n.suffix),
            None => (
                format!("-{}", positive.prefix),
                positive.suffix.clone(),
            ),
        };

        Self {
            positive_prefix: positive.prefix,
            positive_suffix: positive.suffix,
            negative_prefix,
            negative_suffix,
            min_int,
            min_frac,
            max_frac,
            grouping_size,
            percent: positive.percent,
            symbols,
        }
    }

    /// Same mask with grouping switched on and the given separators
    pub fn with_separators(&self, decimal: char, grouping: char) -> Self {
        let mut other = self.clone();
        other.symbols.decimal = decimal;
        other.symbols.grouping = grouping;
        if other.grouping_size == 0 {
            other.grouping_size = 3;
        }
        other
    }

    pub fn symbols(&self) -> &NumberSymbols {
        &self.symbols
    }

    pub fn max_fraction_digits(&self) -> usize {
        self.max_frac
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    /// Format a double, rounding half-even to the mask's fraction digits
    pub fn format_f64(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        let negative = value < 0.0;
        let mut abs = value.abs();
        if self.percent {
            abs *= 100.0;
        }
        if abs.is_infinite() {
            return self.wrap(negative, "∞");
        }
        let text = format!("{:.*}", self.max_frac, abs);
        let (int, frac) = split_digits(&text);
        self.assemble(negative, int, frac)
    }

    /// Format an integer
    pub fn format_i64(&self, value: i64) -> String {
        let negative = value < 0;
        let mut abs = (value as i128).abs();
        if self.percent {
            abs *= 100;
        }
        self.assemble(negative, &abs.to_string(), "")
    }

    /// Format a decimal, rounding half-even to the mask's fraction digits
    pub fn format_decimal(&self, value: &Decimal) -> String {
        let negative = value.is_sign_negative() && !value.is_zero();
        let mut abs = value.abs();
        if self.percent {
            abs = abs.checked_mul(Decimal::ONE_HUNDRED).unwrap_or(abs);
        }
        let rounded =
            abs.round_dp_with_strategy(self.max_frac as u32, RoundingStrategy::MidpointNearestEven);
        let text = rounded.to_string();
        let (int, frac) = split_digits(&text);
        self.assemble(negative, int, frac)
    }

    fn assemble(&self, negative: bool, int: &str, frac: &str) -> String {
        let mut int_digits = int.trim_start_matches('0').to_string();
        while int_digits.len() < self.min_int {
            int_digits.insert(0, '0');
        }
        let mut frac_digits = frac.to_string();
        while frac_digits.len() > self.min_frac && frac_digits.ends_with('0') {
            frac_digits.pop();
        }
        while frac_digits.len() < self.min_frac {
            frac_digits.push('0');
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            int_digits.push('0');
        }

        let mut body = self.group(&int_digits);
        if !frac_digits.is_empty() {
            body.push(self.symbols.decimal);
            body.push_str(&frac_digits);
        }

        let all_zero = int_digits.chars().chain(frac_digits.chars()).all(|c| c == '0');
        self.wrap(negative && !all_zero, &body)
    }

    fn group(&self, digits: &str) -> String {
        if self.grouping_size == 0 || digits.len() <= self.grouping_size {
            return digits.to_string();
        }
        let mut out = String::with_capacity(digits.len() + digits.len() / self.grouping_size);
        let first = digits.len() % self.grouping_size;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + self.grouping_size - first) % self.grouping_size == 0 {
                out.push(self.symbols.grouping);
            }
            out.push(c);
        }
        out
    }

    fn wrap(&self, negative: bool, body: &str) -> String {
        if negative {
            format!("{}{}{}", self.negative_prefix, body, self.negative_suffix)
        } else {
            format!("{}{}{}", self.positive_prefix, body, self.positive_suffix)
        }
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    /// Parse the longest numeric prefix of `text`
    ///
    /// Returns `None` when not even one digit could be read.
    pub fn parse(&self, text: &str) -> Option<ParsedNumber> {
        let chars: Vec<char> = text.chars().collect();

        let pos_match = starts_with_at(&chars, 0, &self.positive_prefix);
        let neg_match = starts_with_at(&chars, 0, &self.negative_prefix);
        let pos_len = self.positive_prefix.chars().count();
        let neg_len = self.negative_prefix.chars().count();
        let negative = match (pos_match, neg_match) {
            (true, true) => neg_len > pos_len,
            (false, true) => true,
            (true, false) => false,
            (false, false) => return None,
        };
        let mut pos = if negative { neg_len } else { pos_len };

        let mut integer = String::new();
        let mut fraction = String::new();
        let mut exponent = 0i32;
        let mut saw_decimal = false;
        let mut saw_digit = false;
        let mut backup: Option<usize> = None;

        while pos < chars.len() {
            let c = chars[pos];
            if c.is_ascii_digit() {
                backup = None;
                saw_digit = true;
                if saw_decimal {
                    fraction.push(c);
                } else {
                    integer.push(c);
                }
                pos += 1;
            } else if c == self.symbols.decimal && !saw_decimal {
                backup = None;
                saw_decimal = true;
                pos += 1;
            } else if self.grouping_size > 0 && c == self.symbols.grouping && !saw_decimal {
                if backup.is_some() {
                    break;
                }
                backup = Some(pos);
                pos += 1;
            } else if c == 'E' && saw_digit {
                if let Some((exp, next)) = parse_exponent(&chars, pos + 1) {
                    exponent = exp;
                    pos = next;
                }
                break;
            } else {
                break;
            }
        }
        if let Some(b) = backup {
            pos = b;
        }
        if !saw_digit {
            return None;
        }

        let suffix = if negative {
            &self.negative_suffix
        } else {
            &self.positive_suffix
        };
        if !suffix.is_empty() {
            if !starts_with_at(&chars, pos, suffix) {
                return None;
            }
            pos += suffix.chars().count();
        }

        Some(ParsedNumber {
            negative,
            integer,
            fraction,
            exponent,
            percent: self.percent,
            end: pos,
        })
    }
}

impl ParsedNumber {
    fn scientific(&self) -> String {
        let int = if self.integer.is_empty() { "0" } else { &self.integer };
        let frac = if self.fraction.is_empty() { "0" } else { &self.fraction };
        let sign = if self.negative { "-" } else { "" };
        let exp = if self.percent { self.exponent - 2 } else { self.exponent };
        format!("{}{}.{}e{}", sign, int, frac, exp)
    }

    /// Value as a double
    pub fn to_f64(&self) -> Result<f64> {
        let text = self.scientific();
        text.parse::<f64>()
            .map_err(|e| MetaError::conversion(format!("invalid number '{}': {}", text, e)))
    }

    /// Value as an integer, truncating any fraction
    pub fn to_i64(&self) -> Result<i64> {
        if self.fraction.is_empty() && self.exponent == 0 && !self.percent {
            let digits = if self.integer.is_empty() { "0" } else { &self.integer };
            let signed = if self.negative {
                format!("-{}", digits)
            } else {
                digits.to_string()
            };
            if let Ok(v) = signed.parse::<i64>() {
                return Ok(v);
            }
        }
        let v = self.to_f64()?.trunc();
        if v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(v as i64)
        } else {
            Err(MetaError::conversion(format!(
                "number {} is out of range for an integer",
                v
            )))
        }
    }

    /// Value as a decimal
    pub fn to_decimal(&self) -> Result<Decimal> {
        let text = self.scientific();
        Decimal::from_scientific(&text)
            .or_else(|_| Decimal::from_str(&text))
            .map(|d| d.normalize())
            .map_err(|e| MetaError::conversion(format!("invalid big number '{}': {}", text, e)))
    }
}

fn split_digits(text: &str) -> (&str, &str) {
    match text.find('.') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    }
}

fn starts_with_at(chars: &[char], pos: usize, needle: &str) -> bool {
    let mut i = pos;
    for n in needle.chars() {
        if i >= chars.len() || chars[i] != n {
            return false;
        }
        i += 1;
    }
    true
}

fn parse_exponent(chars: &[char], start: usize) -> Option<(i32, usize)> {
    let mut pos = start;
    let mut negative = false;
    if pos < chars.len() && (chars[pos] == '-' || chars[pos] == '+') {
        negative = chars[pos] == '-';
        pos += 1;
    }
    let digits_start = pos;
    let mut value: i32 = 0;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        value = value
            .saturating_mul(10)
            .saturating_add(chars[pos].to_digit(10)? as i32);
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    Some((if negative { -value } else { value }, pos))
}

// Split on ';' outside quotes.
fn split_pattern(pattern: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut quoted = false;
    for c in pattern.chars() {
        if c == '\'' {
            quoted = !quoted;
        }
        if c == ';' && !quoted {
            parts.push(String::new());
        } else if let Some(last) = parts.last_mut() {
            last.push(c);
        }
    }
    parts
}

fn parse_sub_pattern(pattern: &str, symbols: &NumberSymbols) -> SubPattern {
    let mut prefix = String::new();
    let mut suffix = String::new();
    let mut number = String::new();
    let mut percent = false;
    // 0 = prefix, 1 = number, 2 = suffix
    let mut phase = 0;
    let mut quoted = false;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                push_affix(phase, &mut prefix, &mut suffix, '\'');
            } else {
                quoted = !quoted;
            }
            continue;
        }
        if quoted {
            if phase == 1 {
                phase = 2;
            }
            push_affix(phase, &mut prefix, &mut suffix, c);
            continue;
        }
        let is_number_char = matches!(c, '#' | '0' | ',' | '.');
        if is_number_char && phase < 2 {
            phase = 1;
            number.push(c);
            continue;
        }
        if phase == 1 {
            phase = 2;
        }
        match c {
            '¤' => {
                let target = if phase == 0 { &mut prefix } else { &mut suffix };
                target.push_str(&symbols.currency);
            }
            '%' => {
                percent = true;
                push_affix(phase, &mut prefix, &mut suffix, '%');
            }
            _ => push_affix(phase, &mut prefix, &mut suffix, c),
        }
    }

    SubPattern {
        prefix,
        suffix,
        number,
        percent,
    }
}

fn push_affix(phase: i32, prefix: &mut String, suffix: &mut String, c: char) {
    if phase == 0 {
        prefix.push(c);
    } else {
        suffix.push(c);
    }
}

/// Convert a decimal to f64, failing when it does not fit
pub fn decimal_to_f64(value: &Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| MetaError::conversion(format!("big number {} does not fit a number", value)))
}
