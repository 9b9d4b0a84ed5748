//! Password strength scoring for credential items.
//!
//! Advisory only: a weak password is reported, never rejected.

const MIN_LENGTH: usize = 8;
const STRONG_LENGTH: usize = 10;
const STRONG_SCORE: u8 = 4;
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";
const COMMON_PATTERNS: [&str; 5] = ["password", "123456", "qwerty", "admin", "welcome"];

/// Result of [`check_password`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrengthReport {
    pub is_strong: bool,
    /// 0..=5, one point per satisfied rule, minus one for a common pattern.
    pub score: u8,
    /// Unmet rules, in evaluation order. Empty for a strong password.
    pub reasons: Vec<&'static str>,
}

/// Scores a password on length, character classes and common patterns.
pub fn check_password(password: &str) -> StrengthReport {
    if password.is_empty() {
        return StrengthReport {
            is_strong: false,
            score: 0,
            reasons: vec!["Password is empty"],
        };
    }

    let length = password.chars().count();
    let mut reasons = Vec::new();
    let mut score: i8 = 0;

    let rules: [(bool, &'static str); 5] = [
        (
            length >= MIN_LENGTH,
            "Password should be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password should contain at least one uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password should contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password should contain at least one number",
        ),
        (
            password.chars().any(|c| SPECIAL_CHARS.contains(c)),
            "Password should contain at least one special character",
        ),
    ];
    for (passed, reason) in rules {
        if passed {
            score += 1;
        } else {
            reasons.push(reason);
        }
    }

    let lowered = password.to_lowercase();
    if COMMON_PATTERNS.iter().any(|p| lowered.contains(p)) {
        reasons.push("Password contains common patterns that are easy to guess");
        score -= 1;
    }

    let score = score.max(0) as u8;
    StrengthReport {
        is_strong: score >= STRONG_SCORE && length >= STRONG_LENGTH,
        score,
        reasons,
    }
}
