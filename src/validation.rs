//! Local input checks that run before anything reaches the backend.

/// Minimum password length accepted at sign up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Input rejected locally, before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A list or item name was empty or whitespace only
    EmptyName,
    /// A quantity was zero or negative after parsing
    NonPositiveQuantity(i64),
    /// No email was given
    EmptyEmail,
    /// No password was given
    EmptyPassword,
    /// Password shorter than `MIN_PASSWORD_LEN`
    PasswordTooShort,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Name cannot be empty"),
            ValidationError::NonPositiveQuantity(q) => {
                write!(f, "Quantity must be a positive integer (got {})", q)
            }
            ValidationError::EmptyEmail => write!(f, "Email cannot be empty"),
            ValidationError::EmptyPassword => write!(f, "Password cannot be empty"),
            ValidationError::PasswordTooShort => write!(
                f,
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns the trimmed name, or `EmptyName` when nothing is left.
pub fn require_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Coerces user text into a quantity.
///
/// The leading integer of the text is used, so "3 kg" and "3.5" give 3.
/// Text without a leading integer, and zero, become 1. Negative values are
/// rejected.
pub fn parse_quantity(input: &str) -> Result<u32, ValidationError> {
    match leading_integer(input) {
        None | Some(0) => Ok(1),
        Some(q) if q < 0 => Err(ValidationError::NonPositiveQuantity(q)),
        Some(q) => Ok(u32::try_from(q).unwrap_or(u32::MAX)),
    }
}

/// Optional sign followed by digits, after leading whitespace.
fn leading_integer(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    // too many digits for i64: saturate
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Checks sign-in input and returns the trimmed email.
pub fn validate_sign_in(email: &str, password: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(email.to_string())
}

/// Checks sign-up input and returns the trimmed email.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, ValidationError> {
    let email = validate_sign_in(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(email)
}
