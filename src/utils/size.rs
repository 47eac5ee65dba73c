use crate::error::UploadError;

const KB: f64 = 1024.0;

/// Parses a human-readable size such as `100MB`, `512kb` or `1.5g` into bytes.
///
/// Only digits, `.` and the unit letters `k`, `m`, `g`, `t` are significant;
/// anything else (including a trailing `b`) is ignored. A bare number is bytes.
pub fn parse_size(input: &str) -> Result<u64, UploadError> {
    let compact: String = input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | 'k' | 'm' | 'g' | 't'))
        .collect();

    let split = compact
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(compact.len());
    let (number, unit) = compact.split_at(split);

    let multiplier = match unit {
        "" => 1.0,
        "k" => KB,
        "m" => KB * KB,
        "g" => KB * KB * KB,
        "t" => KB * KB * KB * KB,
        _ => return Err(UploadError::Config(format!("Invalid size '{}'", input))),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| UploadError::Config(format!("Invalid size '{}'", input)))?;

    Ok((value * multiplier).floor() as u64)
}
