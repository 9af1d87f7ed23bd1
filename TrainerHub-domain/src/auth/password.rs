/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Check the sign-up password rule
///
/// At least eight characters with an uppercase letter, a lowercase letter and a digit.
/// Returns every unmet requirement.
pub fn validate_password_strength(password: &str) -> Result<(), Vec<&'static str>> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        problems.push("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        problems.push("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain a digit");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
