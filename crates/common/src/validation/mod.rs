// Validation Module - Field-level validation framework
use std::fmt;

mod validators;

pub use validators::{EmailValidator, FieldValidator, StringValidator};

/// Type alias for validation results
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error with detailed field-level errors
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
    pub context: Option<ValidationContext>,
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationError {
    /// Create a new validation error
    pub fn new() -> Self {
        Self { errors: Vec::new(), context: None }
    }

    /// Create with a single field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add_field_error(field, message);
        err
    }

    /// Add a field-level error
    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(), message: message.into(), code: None });
    }

    /// Set validation context
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Get errors for a specific field
    pub fn field_errors(&self, field: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Merge another validation error into this one
    pub fn merge(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
        if self.context.is_none() {
            self.context = other.context;
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "Validation error with no specific field errors")?;
        } else if self.errors.len() == 1 {
            write!(f, "Validation failed: {}: {}", self.errors[0].field, self.errors[0].message)?;
        } else {
            write!(f, "Validation failed with {} errors: ", self.errors.len())?;
            for (i, error) in self.errors.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", error.field, error.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Individual field error
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: Option<String>,
}

impl FieldError {
    /// Create a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into(), code: None }
    }

    /// Set error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Validation context for tracking validation state
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub path: Vec<String>,
    pub stop_on_first: bool,
}

impl ValidationContext {
    /// Create a new validation context
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop on first error
    pub fn stop_on_first_error(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Add path segment for nested validation
    pub fn push_path(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    /// Remove last path segment
    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    /// Get current path as string
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }
}

/// Main validator struct for orchestrating validations
pub struct Validator {
    errors: ValidationError,
    context: ValidationContext,
    stopped: bool,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { errors: ValidationError::new(), context: ValidationContext::new(), stopped: false }
    }

    /// Create with context
    pub fn with_context(context: ValidationContext) -> Self {
        Self { errors: ValidationError::new(), context, stopped: false }
    }

    fn should_short_circuit(&self) -> bool {
        self.context.stop_on_first && self.stopped
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = if self.context.path.is_empty() {
            field.into()
        } else {
            format!("{}.{}", self.context.current_path(), field.into())
        };
        self.errors.add_field_error(field, message);

        if self.context.stop_on_first && !self.errors.is_empty() {
            self.stopped = true;
        }
    }

    /// Validate a field with a specific validator
    pub fn validate_field<T, V>(
        &mut self,
        field: &str,
        value: &T,
        validator: &V,
    ) -> ValidationResult<()>
    where
        V: FieldValidator<T> + ?Sized,
    {
        if self.should_short_circuit() {
            return Ok(());
        }

        if let Err(msg) = validator.validate(value) {
            self.add_error(field, msg);
        }
        Ok(())
    }

    /// Validate a numeric range
    pub fn validate_range<T>(
        &mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> ValidationResult<()>
    where
        T: PartialOrd + fmt::Display,
    {
        if self.should_short_circuit() {
            return Ok(());
        }

        if value < min || value > max {
            self.add_error(field, format!("must be between {min} and {max}"));
        }
        Ok(())
    }

    /// Validate string is not empty
    pub fn validate_not_empty(&mut self, field: &str, value: &str) -> ValidationResult<()> {
        if self.should_short_circuit() {
            return Ok(());
        }

        if value.trim().is_empty() {
            self.add_error(field, "cannot be empty");
        }
        Ok(())
    }

    /// Validate with nested context
    pub fn validate_nested<F>(&mut self, field: &str, f: F) -> ValidationResult<()>
    where
        F: FnOnce(&mut Validator),
    {
        if self.should_short_circuit() {
            return Ok(());
        }

        self.context.push_path(field);
        f(self);
        self.context.pop_path();
        Ok(())
    }

    /// Check if validation has errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.errors.error_count()
    }

    /// Finalize and return result
    pub fn finalize(self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.with_context(self.context))
        }
    }

    /// Get errors without consuming validator
    pub fn errors(&self) -> &ValidationError {
        &self.errors
    }

    /// Clear all errors
    pub fn clear(&mut self) {
        self.errors = ValidationError::new();
        self.stopped = false;
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
