use std::borrow::Cow;
use validator::ValidationError;

/// Reject empty or whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("must not be empty"));
        return Err(error);
    }
    Ok(())
}

/// Numbers that can be checked for finiteness
pub trait FiniteValue {
    fn is_finite_value(&self) -> bool;
}

impl FiniteValue for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl<T: FiniteValue + ?Sized> FiniteValue for &T {
    fn is_finite_value(&self) -> bool {
        (**self).is_finite_value()
    }
}

impl<T: FiniteValue> FiniteValue for Option<T> {
    fn is_finite_value(&self) -> bool {
        self.as_ref().map_or(true, FiniteValue::is_finite_value)
    }
}

/// Reject NaN and infinities. Inclusive `range` bounds accept NaN.
pub fn finite<T: FiniteValue>(value: T) -> Result<(), ValidationError> {
    if !value.is_finite_value() {
        let mut error = ValidationError::new("finite");
        error.message = Some(Cow::Borrowed("must be a finite number"));
        return Err(error);
    }
    Ok(())
}

/// Email validation (shape only, the auth server has the final word)
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let valid = email.len() <= 255
        && email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);

    if !valid {
        let mut error = ValidationError::new("email");
        error.message = Some(Cow::Borrowed("Invalid email format"));
        return Err(error);
    }
    Ok(())
}

/// Password validation
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let message = if password.len() < 6 {
        "Password must be at least 6 characters long"
    } else if password.len() > 72 {
        "Password cannot be longer than 72 characters"
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("password");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}
