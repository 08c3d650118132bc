const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with base 1024 and up to two decimals, e.g. `1536 -> "1.5 KB"`.
///
/// Values below one byte (slow transfer rates) stay in `Bytes`; anything past
/// the gigabyte range is still expressed in `GB`.
pub fn format_file_size(bytes: f64) -> String {
    if bytes == 0.0 || !bytes.is_finite() {
        return "0 Bytes".to_string();
    }
    let mut value = bytes;
    let mut idx = 0;
    while value.abs() >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    format!("{} {}", trim_decimals(value), UNITS[idx])
}

/// Transfer rate label, e.g. `"1.5 KB/s"`.
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_file_size(bytes_per_sec))
}

/// One-decimal form used in server messages: `"512 B"`, `"1.5 KB"`, `"10.0 MB"`.
pub fn format_bytes_compact(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = b"KMGTPE"[exp] as char;
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

// Two decimals, then drop trailing zeros and a dangling point.
fn trim_decimals(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0.0), "0 Bytes");
        assert_eq!(format_file_size(1.0), "1 Bytes");
        assert_eq!(format_file_size(1023.0), "1023 Bytes");
        assert_eq!(format_file_size(1024.0), "1 KB");
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_file_size(1048576.0), "1 MB");
        assert_eq!(format_file_size(1073741824.0), "1 GB");
    }

    #[test]
    fn file_size_rounding() {
        // 1234567 / 1024^2 = 1.177...
        assert_eq!(format_file_size(1234567.0), "1.18 MB");
        assert_eq!(format_file_size(1024.0 * 1024.0 * 1024.0 * 2048.0), "2048 GB");
        assert_eq!(format_file_size(0.5), "0.5 Bytes");
    }

    #[test]
    fn rate_label() {
        assert_eq!(format_rate(2048.0), "2 KB/s");
    }

    #[test]
    fn compact_bytes() {
        assert_eq!(format_bytes_compact(0), "0 B");
        assert_eq!(format_bytes_compact(1023), "1023 B");
        assert_eq!(format_bytes_compact(1536), "1.5 KB");
        assert_eq!(format_bytes_compact(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_bytes_compact(1 << 40), "1.0 TB");
    }
}
