//! Display formatting helpers.

use jiff::{Timestamp, fmt::strtime, tz::TimeZone};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Error formatting a timestamp for display.
#[derive(Debug, Error)]
#[error("failed to format timestamp")]
pub struct DateFormatError(#[from] jiff::Error);

/// Styles for [`format_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `03/09/24`
    Short,
    /// `Mar 09, 2024`
    Medium,
    /// `March 09, 2024 at 02:30 PM`
    Long,
    /// `2024-03-09T14:30:00Z`
    Iso,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            Self::Short => "%m/%d/%y",
            Self::Medium => "%b %d, %Y",
            Self::Long => "%B %d, %Y at %I:%M %p",
            Self::Iso => "%Y-%m-%dT%H:%M:%SZ",
        }
    }
}

/// Format minor units as a currency string with symbol and separators.
#[must_use]
pub fn format_currency(minor: i64, currency: &'static iso::Currency) -> String {
    Money::from_minor(minor, currency).to_string()
}

/// Format a timestamp (in UTC) for display.
///
/// # Errors
///
/// Returns a [`DateFormatError`] if the timestamp cannot be rendered in
/// the requested style.
pub fn format_date(timestamp: Timestamp, style: DateStyle) -> Result<String, DateFormatError> {
    let zoned = timestamp.to_zoned(TimeZone::UTC);

    Ok(strtime::format(style.pattern(), &zoned)?)
}

/// Render a byte count as a human-readable size with one decimal place.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    #[expect(
        clippy::cast_precision_loss,
        reason = "display only; a fraction of a byte is invisible at these scales"
    )]
    let mut size = bytes as f64;

    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }

        size /= 1024.0;
    }

    format!("{size:.1} PB")
}

/// Turn text into a URL-friendly slug: lowercase, hyphens for whitespace,
/// everything else dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() {
            slug.push(c);
        }
    }

    slug.trim_matches('-').to_owned()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn currency_uses_symbols_and_separators() {
        assert_eq!(format_currency(123_456, iso::USD), "$1,234.56");
        assert_eq!(format_currency(0, iso::USD), "$0.00");
    }

    #[test]
    fn date_styles_render() -> TestResult {
        let ts: Timestamp = "2024-03-09T14:30:00Z".parse()?;

        assert_eq!(format_date(ts, DateStyle::Short)?, "03/09/24");
        assert_eq!(format_date(ts, DateStyle::Medium)?, "Mar 09, 2024");
        assert_eq!(
            format_date(ts, DateStyle::Long)?,
            "March 09, 2024 at 02:30 PM"
        );
        assert_eq!(format_date(ts, DateStyle::Iso)?, "2024-03-09T14:30:00Z");

        Ok(())
    }

    #[test]
    fn file_sizes_step_through_units() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn slugs_collapse_whitespace_and_symbols() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("  Fancy -- Product  "), "fancy-product");
        assert_eq!(slugify("Déjà vu"), "dj-vu");
    }
}
