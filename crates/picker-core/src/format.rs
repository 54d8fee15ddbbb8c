//! Display formatting for durations, file sizes, dimensions and UI text.

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// `m:ss`, minutes unbounded (3661 -> "61:01").
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Binary-prefixed size with at most one decimal ("1.5 KB", "1 GB").
///
/// Sizes past the gigabyte range are still expressed in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;

    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, SIZE_UNITS[exponent])
    } else {
        format!("{:.1} {}", rounded, SIZE_UNITS[exponent])
    }
}

pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{} × {}", width, height)
}

/// Substitute `{key}` placeholders. Only the first occurrence of each key is
/// replaced; unknown placeholders are left as they are.
pub fn format_template(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replacen(&format!("{{{}}}", key), value, 1)
    })
}
