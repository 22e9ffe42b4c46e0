//! Input checks applied before a form is sent to the API

use thiserror::Error;

/// Collected rule failures for one input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {}", .errors.join("; "))]
pub struct ValidationError {
    pub field: String,
    pub errors: Vec<String>,
}

impl ValidationError {
    fn new(field: &str, errors: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            errors,
        }
    }

    /// First failure message, suitable for a form field hint
    pub fn first(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

fn finish(field: &str, errors: Vec<String>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(field, errors))
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain
pub fn email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|part| !part.is_empty())
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(
            "email",
            vec!["Please enter a valid email address".to_string()],
        ))
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit
pub fn password(value: &str) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if value.chars().count() < 8 {
        errors.push("Password must be at least 8 characters".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    finish("password", errors)
}

pub fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(
            field,
            vec![format!("{field} must not be empty")],
        ))
    } else {
        Ok(())
    }
}

pub fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            vec![format!("{field} must be a positive number")],
        ))
    }
}

/// Load in kilograms or pounds, 0 to 1000
pub fn weight(value: f64) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if value.is_nan() || value < 0.0 {
        errors.push("Weight must not be negative".to_string());
    } else if value > 1000.0 {
        errors.push("Weight is out of range".to_string());
    }
    finish("weight", errors)
}

pub fn reps(value: i64) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if value < 1 {
        errors.push("Reps must be at least 1".to_string());
    } else if value > 100 {
        errors.push("Reps is out of range".to_string());
    }
    finish("reps", errors)
}

pub fn rpe(value: Option<f64>) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    let mut errors = Vec::new();
    if value.is_nan() || value < 1.0 {
        errors.push("RPE must be at least 1".to_string());
    } else if value > 10.0 {
        errors.push("RPE must be at most 10".to_string());
    }
    finish("rpe", errors)
}
