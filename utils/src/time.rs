//! Time formatting helpers.

/// Format a duration in milliseconds to a short human-readable string.
pub fn format_millis(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{}.{:01}s", ms / 1_000, (ms % 1_000) / 100)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_range() {
        assert_eq!(format_millis(500), "500ms");
        assert_eq!(format_millis(2_750), "2.7s");
        assert_eq!(format_millis(61_000), "1m 1s");
    }
}
