//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

/// Human-readable size helpers
pub struct SizeUtils;

impl SizeUtils
{
    /// Format a byte count as `0 B`, `512 B`, `1.5 KB`, `2.25 MB`, ...
    /// Two decimals at most, trailing zeros trimmed.
    pub fn format_bytes(bytes: u64) -> String
    {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        if bytes == 0
        {
            return "0 B".to_string();
        }

        // Pick the largest unit that keeps the value >= 1
        let mut unit = 0;
        let mut scaled = bytes as f64;
        while scaled >= 1024.0 && unit + 1 < UNITS.len()
        {
            scaled /= 1024.0;
            unit += 1;
        }

        // Round to two places, then drop redundant zeros
        let rounded = format!("{scaled:.2}");
        let trimmed = rounded
            .trim_end_matches('0')
            .trim_end_matches('.');

        format!("{trimmed} {}", UNITS[unit])
    }
}

/// UTF-8 safe text helpers
pub struct TextUtils;

impl TextUtils
{
    /// Cut `text` to at most `max_chars` characters, appending an
    /// ellipsis when anything was removed
    pub fn truncate_chars(
        text: &str,
        max_chars: usize,
    ) -> String
    {
        // Find the byte index of the first char past the limit
        match text
            .char_indices()
            .nth(max_chars)
        {
            Some((cut, _)) =>
            {
                let mut out = String::with_capacity(cut + 3);
                out.push_str(&text[..cut]);
                out.push('…');
                out
            }
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn format_bytes_picks_units()
    {
        assert_eq!(SizeUtils::format_bytes(0), "0 B");
        assert_eq!(SizeUtils::format_bytes(512), "512 B");
        assert_eq!(SizeUtils::format_bytes(1024), "1 KB");
        assert_eq!(SizeUtils::format_bytes(1536), "1.5 KB");
        assert_eq!(SizeUtils::format_bytes(3_000_000), "2.86 MB");
        assert_eq!(SizeUtils::format_bytes(1000), "1000 B");
        assert_eq!(SizeUtils::format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn format_bytes_caps_at_gigabytes()
    {
        assert_eq!(SizeUtils::format_bytes(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn truncate_keeps_short_text()
    {
        assert_eq!(TextUtils::truncate_chars("short", 50), "short");
        assert_eq!(TextUtils::truncate_chars(&"a".repeat(50), 50), "a".repeat(50));
    }

    #[test]
    fn truncate_counts_chars_not_bytes()
    {
        let s = "ż".repeat(60);
        let t = TextUtils::truncate_chars(&s, 50);
        assert_eq!(t.chars().count(), 51);
        assert!(t.ends_with('…'));
    }
}
