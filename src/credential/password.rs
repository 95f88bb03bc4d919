//! Password strength validation.

const MIN_LENGTH: usize = 12;

/// Substrings that disqualify a password outright.
const COMMON_PATTERNS: &[&str] = &[
    "password", "12345678", "123456", "qwerty", "admin", "letmein", "welcome", "iloveyou",
    "monkey", "dragon", "sunshine", "abc123",
];

/// Three-character ascending runs, alphabetic and numeric.
const SEQUENTIAL_PATTERNS: &[&str] = &[
    "abc", "bcd", "cde", "def", "efg", "fgh", "ghi", "hij", "ijk", "jkl", "klm", "lmn", "mno",
    "nop", "opq", "pqr", "qrs", "rst", "stu", "tuv", "uvw", "vwx", "wxy", "xyz", "012", "123",
    "234", "345", "456", "567", "678", "789",
];

/// Outcome of a strength check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordVerdict {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

/// Check a candidate password against the strength policy.
///
/// Every rule runs so the message enumerates all violated classes;
/// only the common-pattern and sequential scans stop at their first
/// hit, since one example each is enough.
pub fn validate_password_strength(password: &str) -> PasswordVerdict {
    let mut violations: Vec<String> = Vec::new();

    if password.chars().count() < MIN_LENGTH {
        violations.push(format!("must be at least {MIN_LENGTH} characters long"));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push("must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        violations.push("must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain at least one number".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push("must contain at least one special character".to_string());
    }

    let lowered = password.to_lowercase();
    if let Some(pattern) = COMMON_PATTERNS.iter().find(|p| lowered.contains(*p)) {
        violations.push(format!("must not contain the common pattern \"{pattern}\""));
    }
    if SEQUENTIAL_PATTERNS.iter().any(|p| lowered.contains(p)) {
        violations.push("must not contain sequential characters".to_string());
    }

    let chars: Vec<char> = password.chars().collect();
    if chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]) {
        violations.push("must not contain repeated characters".to_string());
    }

    if violations.is_empty() {
        PasswordVerdict {
            is_valid: true,
            error_message: None,
        }
    } else {
        PasswordVerdict {
            is_valid: false,
            error_message: Some(format!("Password {}", violations.join("; "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        let verdict = validate_password_strength("Ab1!Ab1!Ab1!");
        assert!(verdict.is_valid);
        assert_eq!(verdict.error_message, None);
    }

    #[test]
    fn test_common_pattern_is_rejected() {
        let verdict = validate_password_strength("password123");
        assert!(!verdict.is_valid);
        let message = verdict.error_message.unwrap();
        assert!(message.contains("common pattern"));
    }

    #[test]
    fn test_repeated_characters_are_rejected() {
        let verdict = validate_password_strength("Aaabbbccc111");
        assert!(!verdict.is_valid);
        let message = verdict.error_message.unwrap();
        assert!(message.contains("repeated characters"));
    }

    #[test]
    fn test_short_password_is_rejected() {
        let verdict = validate_password_strength("Short1!");
        assert!(!verdict.is_valid);
        let message = verdict.error_message.unwrap();
        assert!(message.contains("at least 12 characters"));
    }

    #[test]
    fn test_missing_classes_are_all_enumerated() {
        let verdict = validate_password_strength("tiny");
        assert!(!verdict.is_valid);
        let message = verdict.error_message.unwrap();
        assert!(message.starts_with("Password "));
        assert!(message.contains("at least 12 characters"));
        assert!(message.contains("uppercase letter"));
        assert!(message.contains("one number"));
        assert!(message.contains("special character"));
        // Lowercase is present, so that rule must not be listed.
        assert!(!message.contains("lowercase letter"));
    }

    #[test]
    fn test_sequential_run_is_rejected() {
        let verdict = validate_password_strength("Zz9?xyzXw$4m");
        assert!(!verdict.is_valid);
        let message = verdict.error_message.unwrap();
        assert!(message.contains("sequential characters"));
    }

    #[test]
    fn test_sequential_detection_ignores_case() {
        let verdict = validate_password_strength("Zz9?AbCdw$4m");
        assert!(!verdict.is_valid);
        assert!(verdict
            .error_message
            .unwrap()
            .contains("sequential characters"));
    }

    #[test]
    fn test_numeric_run_is_rejected() {
        let verdict = validate_password_strength("Zz9?w$4m5678");
        assert!(!verdict.is_valid);
        assert!(verdict
            .error_message
            .unwrap()
            .contains("sequential characters"));
    }
}
