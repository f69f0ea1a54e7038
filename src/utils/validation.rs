//! Input validation helpers.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+?\d{10,15}$").ok());

static POSTAL_US_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").ok());

static POSTAL_UK_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}\d[A-Z\d]? ?\d[A-Z]{2}$").ok());

static POSTAL_CA_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\d[A-Z] ?\d[A-Z]\d$").ok());

fn matches(re: &LazyLock<Option<Regex>>, input: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(input))
}

/// Validate an email address against a simplified RFC 5322 pattern.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    matches(&EMAIL_RE, email)
}

/// Validate a phone number. Accepts `+1234567890`, `123-456-7890` and
/// `(123) 456-7890` style inputs.
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    matches(&PHONE_RE, &cleaned)
}

/// Validate a postal code by country. Knows US (5 or 9 digit), UK and
/// Canadian formats; anything else falls back to the US pattern.
#[must_use]
pub fn validate_postal_code(postal_code: &str, country: &str) -> bool {
    let upper = postal_code.to_uppercase();

    let re = match country.to_uppercase().as_str() {
        "UK" => &POSTAL_UK_RE,
        "CA" => &POSTAL_CA_RE,
        _ => &POSTAL_US_RE,
    };

    matches(re, &upper)
}

/// Card brands the checker recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardBrand {
    /// The lowercase brand name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
        }
    }
}

/// Outcome of a credit card check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCheck {
    pub is_valid: bool,
    pub brand: Option<CardBrand>,
    /// Last four digits, present only for valid numbers.
    pub last_four: Option<String>,
}

/// Validate a credit card number with the Luhn algorithm and identify its
/// brand from the leading digits.
#[must_use]
pub fn validate_credit_card(number: &str) -> CardCheck {
    let cleaned: String = number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return CardCheck {
            is_valid: false,
            brand: None,
            last_four: None,
        };
    }

    let brand = card_brand(&cleaned);
    let is_valid = luhn_check(&cleaned);

    let last_four = is_valid.then(|| {
        cleaned
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    });

    CardCheck {
        is_valid,
        brand,
        last_four,
    }
}

fn card_brand(digits: &str) -> Option<CardBrand> {
    if digits.starts_with('4') {
        Some(CardBrand::Visa)
    } else if ["51", "52", "53", "54", "55"]
        .iter()
        .any(|prefix| digits.starts_with(prefix))
    {
        Some(CardBrand::Mastercard)
    } else if digits.starts_with("34") || digits.starts_with("37") {
        Some(CardBrand::Amex)
    } else if digits.starts_with("6011") {
        Some(CardBrand::Discover)
    } else {
        None
    }
}

fn luhn_check(digits: &str) -> bool {
    let total: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(position, digit)| {
            if position % 2 == 1 {
                let doubled = digit * 2;
                doubled / 10 + doubled % 10
            } else {
                digit
            }
        })
        .sum();

    total % 10 == 0
}

/// Password strength buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// The lowercase bucket name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

/// Outcome of a password strength check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReport {
    pub strength: PasswordStrength,
    /// How many of the five checks passed.
    pub score: u8,
    /// Names of the checks that failed.
    pub failed: Vec<&'static str>,
}

/// Score a password: length, upper, lower, digit and special-character
/// checks. Five passes is strong, three or four is medium.
#[must_use]
pub fn validate_password_strength(password: &str) -> PasswordReport {
    let checks: [(&'static str, bool); 5] = [
        ("min_length", password.chars().count() >= 8),
        ("has_uppercase", password.chars().any(char::is_uppercase)),
        ("has_lowercase", password.chars().any(char::is_lowercase)),
        ("has_digit", password.chars().any(|c| c.is_ascii_digit())),
        (
            "has_special",
            password
                .chars()
                .any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)),
        ),
    ];

    let score = checks.iter().filter(|(_, passed)| *passed).count();
    let failed = checks
        .iter()
        .filter(|(_, passed)| !passed)
        .map(|(name, _)| *name)
        .collect();

    let strength = match score {
        5 => PasswordStrength::Strong,
        3 | 4 => PasswordStrength::Medium,
        _ => PasswordStrength::Weak,
    };

    PasswordReport {
        strength,
        score: u8::try_from(score).unwrap_or(5),
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_validate() {
        assert!(validate_email("ada@example.com"));
        assert!(validate_email("first.last+tag@sub.example.co"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("missing@tld"));
    }

    #[test]
    fn phone_formats_are_normalised() {
        assert!(validate_phone("+12345678901"));
        assert!(validate_phone("123-456-7890"));
        assert!(validate_phone("(123) 456-7890"));
        assert!(!validate_phone("12345"));
        assert!(!validate_phone("phone home"));
    }

    #[test]
    fn postal_codes_per_country() {
        assert!(validate_postal_code("62704", "US"));
        assert!(validate_postal_code("62704-1234", "US"));
        assert!(validate_postal_code("SW1A 1AA", "UK"));
        assert!(validate_postal_code("K1A 0B1", "CA"));
        assert!(!validate_postal_code("62704", "CA"));
        // Unknown countries fall back to the US pattern.
        assert!(validate_postal_code("62704", "FR"));
    }

    #[test]
    fn luhn_accepts_known_test_numbers() {
        let check = validate_credit_card("4539 1488 0343 6467");

        assert!(check.is_valid);
        assert_eq!(check.brand, Some(CardBrand::Visa));
        assert_eq!(check.last_four.as_deref(), Some("6467"));
    }

    #[test]
    fn luhn_rejects_off_by_one() {
        let check = validate_credit_card("4539 1488 0343 6468");

        assert!(!check.is_valid);
        assert_eq!(check.last_four, None);
    }

    #[test]
    fn non_digits_invalidate_cards() {
        let check = validate_credit_card("4539-abcd-0343-6467");

        assert!(!check.is_valid);
        assert_eq!(check.brand, None);
    }

    #[test]
    fn brand_detection_reads_leading_digits() {
        assert_eq!(
            validate_credit_card("5500 0000 0000 0004").brand,
            Some(CardBrand::Mastercard)
        );
        assert_eq!(
            validate_credit_card("3400 0000 0000 009").brand,
            Some(CardBrand::Amex)
        );
        assert_eq!(
            validate_credit_card("6011 0000 0000 0004").brand,
            Some(CardBrand::Discover)
        );
    }

    #[test]
    fn password_strength_buckets() {
        assert_eq!(
            validate_password_strength("Tr0ub4dor&3").strength,
            PasswordStrength::Strong
        );
        assert_eq!(
            validate_password_strength("password1").strength,
            PasswordStrength::Medium
        );
        assert_eq!(
            validate_password_strength("abc").strength,
            PasswordStrength::Weak
        );
    }

    #[test]
    fn failed_checks_are_named() {
        let report = validate_password_strength("lowercaseonly");

        assert!(report.failed.contains(&"has_uppercase"));
        assert!(report.failed.contains(&"has_digit"));
        assert!(report.failed.contains(&"has_special"));
        assert_eq!(report.score, 2);
    }
}
