//! Display helpers for dates, durations and padded identifiers.

use chrono::{Datelike, Local, NaiveDateTime, TimeZone, Timelike};
use std::collections::HashMap;

pub const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd hh:mm:ss";

/// Formats a timestamp with a compact pattern language.
///
/// `y` (1-4, trailing digits of the year), `M` month, `d` day, `h` hour (0-23),
/// `m` minute, `s` second, `q` quarter and `S` milliseconds. A single letter
/// prints the bare number, a doubled letter pads it to two digits. Only the
/// first run of each letter is substituted.
pub fn format_date(date: &NaiveDateTime, pattern: &str) -> String {
    let pattern = if pattern.is_empty() {
        DEFAULT_DATE_PATTERN
    } else {
        pattern
    };

    let mut out = pattern.to_string();

    if let Some((start, len)) = first_run(&out, 'y') {
        let year = format!("{:04}", date.year());
        let keep = len.min(year.len());
        let digits = year[year.len() - keep..].to_string();
        out.replace_range(start..start + len, &digits);
    }

    let fields = [
        ('M', date.month()),
        ('d', date.day()),
        ('h', date.hour()),
        ('m', date.minute()),
        ('s', date.second()),
        ('q', (date.month() + 2) / 3),
    ];
    for (letter, value) in fields {
        if let Some((start, len)) = first_run(&out, letter) {
            let text = if len == 1 {
                value.to_string()
            } else {
                format!("{:02}", value % 100)
            };
            out.replace_range(start..start + len, &text);
        }
    }

    if let Some(start) = out.find('S') {
        let millis = date.and_utc().timestamp_subsec_millis();
        out.replace_range(start..start + 1, &millis.to_string());
    }

    out
}

/// Formats epoch milliseconds in local time, or `-` when the timestamp is
/// zero or out of range.
pub fn format_timestamp_millis(millis: i64, pattern: &str) -> String {
    if millis == 0 {
        return "-".to_string();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => format_date(&dt.naive_local(), pattern),
        None => "-".to_string(),
    }
}

fn first_run(text: &str, letter: char) -> Option<(usize, usize)> {
    let start = text.find(letter)?;
    let len = text[start..].chars().take_while(|&c| c == letter).count();
    Some((start, len))
}

/// Renders a millisecond duration as `{hours}h{minutes}m{seconds}s`, leaving
/// out zero parts. Days are folded into hours; an empty result becomes `-`.
pub fn format_duration(millis: i64) -> String {
    const SECOND: i64 = 1000;
    const MINUTE: i64 = 60 * SECOND;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let days = millis / DAY;
    let hours = (millis % DAY) / HOUR;
    let minutes = (millis % HOUR) / MINUTE;
    let seconds = (millis % MINUTE) / SECOND;

    let mut out = String::new();
    if hours > 0 || days > 0 {
        out.push_str(&format!("{}h", days * 24 + hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }

    if out.is_empty() { "-".to_string() } else { out }
}

pub fn pad_left(s: &str, len: usize, ch: char) -> String {
    let width = s.chars().count();
    if width >= len {
        return s.to_string();
    }
    let mut out: String = std::iter::repeat_n(ch, len - width).collect();
    out.push_str(s);
    out
}

pub fn pad_right(s: &str, len: usize, ch: char) -> String {
    let width = s.chars().count();
    if width >= len {
        return s.to_string();
    }
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(ch, len - width));
    out
}

/// Zero-pads a numeric identifier, five digits unless `len` says otherwise.
pub fn format_id(id: impl ToString, len: Option<usize>) -> String {
    pad_left(&id.to_string(), len.unwrap_or(5), '0')
}

/// Replaces `{0}`, `{1}`, ... with the positional arguments.
pub fn format_template(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |acc, (i, arg)| {
            acc.replace(&format!("{{{}}}", i), arg)
        })
}

/// Replaces `{name}` placeholders with values from `args`.
pub fn format_named(template: &str, args: &HashMap<&str, String>) -> String {
    args.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 7, 2)
            .unwrap()
            .and_hms_milli_opt(8, 9, 4, 423)
            .unwrap()
    }

    #[test]
    fn test_format_date_padded() {
        assert_eq!(
            format_date(&sample(), "yyyy-MM-dd hh:mm:ss.S"),
            "2006-07-02 08:09:04.423"
        );
    }

    #[test]
    fn test_format_date_unpadded() {
        assert_eq!(format_date(&sample(), "yyyy-M-d h:m:s"), "2006-7-2 8:9:4");
    }

    #[test]
    fn test_format_date_short_year_and_quarter() {
        assert_eq!(format_date(&sample(), "yy/MM q"), "06/07 3");
    }

    #[test]
    fn test_format_date_default_pattern() {
        assert_eq!(format_date(&sample(), ""), "2006-07-02 08:09:04");
    }

    #[test]
    fn test_format_timestamp_zero() {
        assert_eq!(format_timestamp_millis(0, "yyyy"), "-");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3000), "3s");
        assert_eq!(format_duration(0), "-");
        assert_eq!(format_duration(500), "-");
        assert_eq!(format_duration(61_000), "1m1s");
        assert_eq!(format_duration(90 * 60 * 1000), "1h30m");
        assert_eq!(format_duration(26 * 60 * 60 * 1000 + 5000), "26h5s");
    }

    #[test]
    fn test_padding() {
        assert_eq!(pad_left("asd", 6, '0'), "000asd");
        assert_eq!(pad_right("asd", 6, '0'), "asd000");
        assert_eq!(pad_left("toolong", 3, '0'), "toolong");
        assert_eq!(format_id(42, None), "00042");
        assert_eq!(format_id(42, Some(3)), "042");
    }

    #[test]
    fn test_templates() {
        assert_eq!(format_template("test{0}test{1}", &["11", "22"]), "test11test22");

        let mut args = HashMap::new();
        args.insert("language", "rust".to_string());
        assert_eq!(format_named("test{language}", &args), "testrust");
    }
}
