//! Date masks
//!
//! Masks use the `yyyy/MM/dd HH:mm:ss.SSS` letter notation. Parsing reads a
//! prefix of the input: anything after the last mask field is ignored.

use crate::core::error::{MetaError, Result};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(char, usize),
}

/// Compiled date mask bound to a timezone
#[derive(Debug, Clone)]
pub struct DateFormat {
    pattern: String,
    tokens: Vec<Token>,
    lenient: bool,
    tz: Tz,
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    day_of_year: Option<i64>,
    hour_of_day: Option<i64>,
    hour_of_ampm: Option<i64>,
    pm: Option<bool>,
    minute: Option<i64>,
    second: Option<i64>,
    nanos: Option<i64>,
    offset: Option<FixedOffset>,
}

impl DateFormat {
    /// Compile a mask
    pub fn new(pattern: &str, tz: Tz, lenient: bool) -> Result<Self> {
        Ok(Self {
            pattern: pattern.to_string(),
            tokens: tokenize(pattern)?,
            lenient,
            tz,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Format an instant in the mask's timezone
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.tz);
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Field(c, n) => format_field(&mut out, *c, *n, &local),
            }
        }
        out
    }

    /// Parse the leading part of `text` matched by the mask
    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>> {
        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0usize;
        let mut fields = Fields::default();

        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Literal(lit) => {
                    for expected in lit.chars() {
                        if chars.get(pos) != Some(&expected) {
                            return Err(self.parse_error(text, pos));
                        }
                        pos += 1;
                    }
                }
                Token::Field(c, n) => {
                    let abutting = matches!(
                        self.tokens.get(i + 1),
                        Some(Token::Field(next, m)) if is_numeric_field(*next, *m)
                    );
                    pos = self
                        .parse_field(&chars, pos, *c, *n, abutting, &mut fields)
                        .ok_or_else(|| self.parse_error(text, pos))?;
                }
            }
        }

        self.resolve(&fields)
            .ok_or_else(|| self.parse_error(text, pos))
    }

    fn parse_error(&self, text: &str, pos: usize) -> MetaError {
        MetaError::conversion(format!(
            "couldn't convert string [{}] to a date using format [{}] on offset location {}",
            text, self.pattern, pos
        ))
    }

    fn parse_field(
        &self,
        chars: &[char],
        pos: usize,
        c: char,
        n: usize,
        abutting: bool,
        fields: &mut Fields,
    ) -> Option<usize> {
        let max_digits = if abutting { n } else { usize::MAX };
        match c {
            'y' => {
                let (v, next) = read_number(chars, pos, max_digits)?;
                let year = if n == 2 && next - pos == 2 {
                    two_digit_year(v)
                } else {
                    v
                };
                fields.year = Some(year);
                Some(next)
            }
            'M' if n >= 3 => {
                let (idx, next) = read_name(chars, pos, &MONTHS)?;
                fields.month = Some(idx as i64 + 1);
                Some(next)
            }
            'E' => {
                let (_, next) = read_name(chars, pos, &WEEKDAYS)?;
                Some(next)
            }
            'a' => {
                let rest: String = chars[pos..].iter().take(2).collect();
                match rest.to_uppercase().as_str() {
                    "AM" => fields.pm = Some(false),
                    "PM" => fields.pm = Some(true),
                    _ => return None,
                }
                Some(pos + 2)
            }
            'X' | 'Z' | 'z' => {
                let (offset, next) = read_offset(chars, pos)?;
                fields.offset = Some(offset);
                Some(next)
            }
            'S' => {
                let (v, next) = read_number(chars, pos, max_digits)?;
                let digits = (next - pos) as u32;
                let nanos = if n <= 3 {
                    v.checked_mul(1_000_000)?
                } else if digits <= 9 {
                    v.checked_mul(10i64.pow(9 - digits))?
                } else {
                    v / 10i64.checked_pow(digits - 9)?
                };
                fields.nanos = Some(nanos);
                Some(next)
            }
            _ => {
                let (v, next) = read_number(chars, pos, max_digits)?;
                match c {
                    'M' => fields.month = Some(v),
                    'd' => fields.day = Some(v),
                    'D' => fields.day_of_year = Some(v),
                    'H' => fields.hour_of_day = Some(v),
                    'k' => fields.hour_of_day = Some(if v == 24 { 0 } else { v }),
                    'h' => fields.hour_of_ampm = Some(if v == 12 { 0 } else { v }),
                    'K' => fields.hour_of_ampm = Some(v),
                    'm' => fields.minute = Some(v),
                    's' => fields.second = Some(v),
                    _ => return None,
                }
                Some(next)
            }
        }
    }

    fn resolve(&self, f: &Fields) -> Option<DateTime<Utc>> {
        let year = f.year.unwrap_or(1970);
        let month = f.month.unwrap_or(1);
        let day = f.day.unwrap_or(1);
        let hour = match (f.hour_of_ampm, f.hour_of_day) {
            (Some(h), _) => h.checked_add(if f.pm == Some(true) { 12 } else { 0 })?,
            (None, Some(h)) => h,
            (None, None) => 0,
        };
        let minute = f.minute.unwrap_or(0);
        let second = f.second.unwrap_or(0);
        let nanos = f.nanos.unwrap_or(0);

        let naive = if self.lenient {
            let date = match f.day_of_year {
                Some(doy) => NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?
                    .checked_add_signed(TimeDelta::try_days(doy.checked_sub(1)?)?)?,
                None => {
                    // Month 0 is December of the previous year, month 13 January of the next.
                    let total = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
                    let first = NaiveDate::from_ymd_opt(
                        i32::try_from(total.div_euclid(12)).ok()?,
                        u32::try_from(total.rem_euclid(12) + 1).ok()?,
                        1,
                    )?;
                    first.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)?
                }
            };
            date.and_hms_opt(0, 0, 0)?
                .checked_add_signed(TimeDelta::try_hours(hour)?)?
                .checked_add_signed(TimeDelta::try_minutes(minute)?)?
                .checked_add_signed(TimeDelta::try_seconds(second)?)?
                .checked_add_signed(TimeDelta::nanoseconds(nanos))?
        } else {
            let year = i32::try_from(year).ok()?;
            let date = match f.day_of_year {
                Some(doy) => NaiveDate::from_yo_opt(year, u32::try_from(doy).ok()?)?,
                None => NaiveDate::from_ymd_opt(
                    year,
                    u32::try_from(month).ok()?,
                    u32::try_from(day).ok()?,
                )?,
            };
            if f.hour_of_ampm.map(|h| h > 11).unwrap_or(false) {
                return None;
            }
            date.and_hms_nano_opt(
                u32::try_from(hour).ok()?,
                u32::try_from(minute).ok()?,
                u32::try_from(second).ok()?,
                u32::try_from(nanos).ok().filter(|n| *n < 1_000_000_000)?,
            )?
        };

        match f.offset {
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            None => localize(&self.tz, &naive),
        }
    }
}

/// Resolve a wall-clock time in `tz`, moving past DST gaps
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(*naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse common ISO-8601 shapes, with or without offset
pub fn parse_iso8601(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return localize(tz, &naive);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| localize(tz, &naive))
}

fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                literal.push('\'');
                continue;
            }
            for q in chars.by_ref() {
                if q == '\'' {
                    break;
                }
                literal.push(q);
            }
            continue;
        }
        if c.is_ascii_alphabetic() {
            if !"yMdHhkKmsSEaDXZz".contains(c) {
                return Err(MetaError::conversion(format!(
                    "illegal pattern character '{}' in date mask [{}]",
                    c, pattern
                )));
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            let mut count = 1;
            while chars.peek() == Some(&c) {
                chars.next();
                count += 1;
            }
            tokens.push(Token::Field(c, count));
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

fn is_numeric_field(c: char, n: usize) -> bool {
    match c {
        'M' => n < 3,
        'y' | 'd' | 'D' | 'H' | 'h' | 'k' | 'K' | 'm' | 's' | 'S' => true,
        _ => false,
    }
}

fn read_number(chars: &[char], pos: usize, max_digits: usize) -> Option<(i64, usize)> {
    let mut end = pos;
    let mut value: i64 = 0;
    while end < chars.len() && end - pos < max_digits {
        match chars[end].to_digit(10) {
            Some(d) => {
                value = value.checked_mul(10)?.checked_add(d as i64)?;
                end += 1;
            }
            None => break,
        }
    }
    if end == pos {
        None
    } else {
        Some((value, end))
    }
}

fn read_name(chars: &[char], pos: usize, names: &[&str]) -> Option<(usize, usize)> {
    let rest: String = chars[pos..].iter().collect::<String>().to_lowercase();
    for (i, name) in names.iter().enumerate() {
        if rest.starts_with(&name.to_lowercase()) {
            return Some((i, pos + name.chars().count()));
        }
    }
    for (i, name) in names.iter().enumerate() {
        let short: String = name.chars().take(3).collect::<String>().to_lowercase();
        if rest.starts_with(&short) {
            return Some((i, pos + 3));
        }
    }
    None
}

fn read_offset(chars: &[char], pos: usize) -> Option<(FixedOffset, usize)> {
    let mut p = pos;
    match chars.get(p) {
        Some('Z') => return Some((FixedOffset::east_opt(0)?, p + 1)),
        Some('G') | Some('U') => {
            let word: String = chars[p..].iter().take(3).collect();
            if word != "GMT" && word != "UTC" {
                return None;
            }
            p += 3;
            if !matches!(chars.get(p), Some('+') | Some('-')) {
                return Some((FixedOffset::east_opt(0)?, p));
            }
        }
        _ => {}
    }
    let sign = match chars.get(p) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return None,
    };
    p += 1;
    let (hours, next) = read_number(chars, p, 2)?;
    p = next;
    let mut minutes = 0;
    if chars.get(p) == Some(&':') {
        let (m, next) = read_number(chars, p + 1, 2)?;
        minutes = m;
        p = next;
    } else if let Some((m, next)) = read_number(chars, p, 2) {
        minutes = m;
        p = next;
    }
    let secs = sign * (hours * 3600 + minutes * 60);
    Some((FixedOffset::east_opt(i32::try_from(secs).ok()?)?, p))
}

fn two_digit_year(v: i64) -> i64 {
    let now = Utc::now().year() as i64;
    let start = now - 80;
    let century = start - start.rem_euclid(100);
    let candidate = century + v;
    if candidate < start {
        candidate + 100
    } else {
        candidate
    }
}

fn format_field(out: &mut String, c: char, n: usize, local: &DateTime<Tz>) {
    let pad = |out: &mut String, v: i64, width: usize| {
        out.push_str(&format!("{:0width$}", v, width = width));
    };
    match c {
        'y' => {
            let year = local.year() as i64;
            if n == 2 {
                pad(out, year.rem_euclid(100), 2);
            } else {
                pad(out, year, n);
            }
        }
        'M' => {
            let month = local.month() as usize;
            match n {
                1 | 2 => pad(out, month as i64, n),
                3 => out.push_str(&MONTHS[month - 1][..3]),
                _ => out.push_str(MONTHS[month - 1]),
            }
        }
        'd' => pad(out, local.day() as i64, n),
        'D' => pad(out, local.ordinal() as i64, n),
        'H' => pad(out, local.hour() as i64, n),
        'k' => {
            let h = local.hour() as i64;
            pad(out, if h == 0 { 24 } else { h }, n)
        }
        'h' => {
            let h = (local.hour() % 12) as i64;
            pad(out, if h == 0 { 12 } else { h }, n)
        }
        'K' => pad(out, (local.hour() % 12) as i64, n),
        'm' => pad(out, local.minute() as i64, n),
        's' => pad(out, local.second() as i64, n),
        'S' => {
            let nanos = local.nanosecond() % 1_000_000_000;
            if n < 3 {
                pad(out, (nanos / 1_000_000) as i64, n);
            } else {
                let digits = format!("{:09}", nanos);
                if n <= 9 {
                    out.push_str(&digits[..n]);
                } else {
                    out.push_str(&digits);
                    out.push_str(&"0".repeat(n - 9));
                }
            }
        }
        'E' => {
            let name = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
            if n >= 4 {
                out.push_str(name);
            } else {
                out.push_str(&name[..3]);
            }
        }
        'a' => out.push_str(if local.hour() < 12 { "AM" } else { "PM" }),
        'z' => out.push_str(&local.format("%Z").to_string()),
        'Z' => out.push_str(&local.format("%z").to_string()),
        'X' => {
            let secs = local.offset().fix().local_minus_utc();
            if secs == 0 {
                out.push('Z');
            } else {
                let sign = if secs < 0 { '-' } else { '+' };
                let abs = secs.abs();
                let (h, m) = (abs / 3600, (abs % 3600) / 60);
                match n {
                    1 => out.push_str(&format!("{}{:02}", sign, h)),
                    2 => out.push_str(&format!("{}{:02}{:02}", sign, h, m)),
                    _ => out.push_str(&format!("{}{:02}:{:02}", sign, h, m)),
                }
            }
        }
        _ => {}
    }
}
