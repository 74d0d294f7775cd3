//! Form validators
//!
//! Pure functions from raw field strings to a [`ValidationResult`]. They never
//! touch the store; uniqueness checks belong to the caller.

use miette::Diagnostic;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").expect("valid phone regex"));

/// Minimum digits in an identification number
pub const MIN_IDENTIFICATION_LEN: usize = 6;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Outcome of validating one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Field name to user-facing message
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    fn add(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    /// Turn a failed result into a reportable error
    pub fn into_result(self, form: &'static str) -> Result<(), FormError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(FormError {
            form,
            fields: self
                .errors
                .into_iter()
                .map(|(field, message)| FieldError { field, message })
                .collect(),
        })
    }
}

/// A form submission rejected by its validator
#[derive(Debug, Error, Diagnostic)]
#[error("invalid {form} form ({} field(s) rejected)", .fields.len())]
#[diagnostic(code(telconova::form::invalid))]
pub struct FormError {
    pub form: &'static str,

    #[related]
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

pub fn is_required(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_identification(identification: &str) -> bool {
    identification.len() >= MIN_IDENTIFICATION_LEN
        && identification.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_login_form(email: &str, password: &str) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !is_required(email) {
        result.add("email", "El email es requerido");
    } else if !is_valid_email(email) {
        result.add("email", "Email inválido");
    }

    if !is_required(password) {
        result.add("password", "La contraseña es requerida");
    }

    result
}

pub fn validate_register_form(
    name: &str,
    identification: &str,
    email: &str,
    password: &str,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !is_required(name) {
        result.add("name", "El nombre es requerido");
    }

    if !is_required(identification) {
        result.add("identification", "El número de identificación es requerido");
    } else if !is_valid_identification(identification) {
        result.add(
            "identification",
            "La identificación debe contener solo números y al menos 6 dígitos",
        );
    }

    if !is_required(email) {
        result.add("email", "El email es requerido");
    } else if !is_valid_email(email) {
        result.add("email", "Email inválido");
    }

    if !is_required(password) {
        result.add("password", "La contraseña es requerida");
    } else if !is_valid_password(password) {
        result.add("password", "La contraseña debe tener al menos 8 caracteres");
    }

    result
}

pub fn validate_client_form(
    name: &str,
    identification: &str,
    phone: &str,
    address: &str,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !is_required(name) {
        result.add("name", "El nombre es requerido");
    }

    if !is_required(identification) {
        result.add("identification", "La identificación es requerida");
    } else if !is_valid_identification(identification) {
        result.add(
            "identification",
            "La identificación debe contener solo números y al menos 6 dígitos",
        );
    }

    if !is_required(phone) {
        result.add("phone", "El teléfono es requerido");
    } else if !is_valid_phone(phone) {
        result.add("phone", "Formato de teléfono inválido");
    }

    if !is_required(address) {
        result.add("address", "La dirección es requerida");
    }

    result
}

pub fn validate_work_order_form(
    activity: &str,
    priority: &str,
    client_id: &str,
    description: &str,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !is_required(activity) {
        result.add("activity", "La actividad es requerida");
    }
    if !is_required(priority) {
        result.add("priority", "La prioridad es requerida");
    }
    if !is_required(client_id) {
        result.add("clientId", "Debe seleccionar un cliente");
    }
    if !is_required(description) {
        result.add("description", "La descripción es requerida");
    }

    result
}

/// An order edit must explain itself
pub fn validate_order_change(reason: &str) -> ValidationResult {
    let mut result = ValidationResult::default();
    if !is_required(reason) {
        result.add("reason", "Debe proporcionar una descripción del cambio");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("admin@telconova.co"));
        assert!(!is_valid_email("admin@telconova"));
        assert!(!is_valid_email("admin telconova.co"));
        assert!(!is_valid_email("a b@c.co"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+57 300 111 2222"));
        assert!(is_valid_phone("(601) 555-1234"));
        assert!(is_valid_phone("3001112222"));
        assert!(!is_valid_phone("300111222"));
        assert!(!is_valid_phone("300-ABC-2222"));
        assert!(!is_valid_phone("++573001112222"));
    }

    #[test]
    fn test_identification() {
        assert!(is_valid_identification("123456"));
        assert!(!is_valid_identification("12345"));
        assert!(!is_valid_identification("12345a"));
        assert!(!is_valid_identification("1234 56"));
    }

    #[test]
    fn test_password_counts_characters() {
        assert!(is_valid_password("contraseña"));
        assert!(!is_valid_password("ñññññññ"));
    }

    #[test]
    fn test_client_form_valid() {
        let result = validate_client_form(
            "María García López",
            "12345678",
            "+57 300 111 2222",
            "Calle 123 #45-67, Bogotá",
        );
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_client_form_is_idempotent() {
        let first = validate_client_form("Ana", "45678912", "3025556666", "Cali");
        let second = validate_client_form("Ana", "45678912", "3025556666", "Cali");
        assert_eq!(first, second);
        assert!(second.is_valid());
    }

    #[test]
    fn test_client_form_errors() {
        let result = validate_client_form("  ", "12ab", "123", "");
        assert!(!result.is_valid());
        assert_eq!(result.error("name"), Some("El nombre es requerido"));
        assert_eq!(
            result.error("identification"),
            Some("La identificación debe contener solo números y al menos 6 dígitos")
        );
        assert_eq!(result.error("phone"), Some("Formato de teléfono inválido"));
        assert_eq!(result.error("address"), Some("La dirección es requerida"));
    }

    #[test]
    fn test_required_takes_precedence_over_format() {
        let result = validate_client_form("Ana", "", "", "Cali");
        assert_eq!(result.error("identification"), Some("La identificación es requerida"));
        assert_eq!(result.error("phone"), Some("El teléfono es requerido"));
    }

    #[test]
    fn test_login_form() {
        assert!(validate_login_form("admin@telconova.co", "x").is_valid());
        let result = validate_login_form("bad", "");
        assert_eq!(result.error("email"), Some("Email inválido"));
        assert_eq!(result.error("password"), Some("La contraseña es requerida"));
    }

    #[test]
    fn test_register_form() {
        assert!(validate_register_form("Ana", "45678912", "ana@telconova.co", "Secreta123").is_valid());
        let result = validate_register_form("", "45-678", "ana@", "short");
        assert_eq!(result.errors.len(), 4);
        assert_eq!(
            result.error("password"),
            Some("La contraseña debe tener al menos 8 caracteres")
        );
    }

    #[test]
    fn test_work_order_form() {
        assert!(validate_work_order_form("Instalación", "Alta", "1", "Fibra").is_valid());
        let result = validate_work_order_form("", " ", "", "\n");
        assert_eq!(result.errors.len(), 4);
        assert_eq!(result.error("clientId"), Some("Debe seleccionar un cliente"));
    }

    #[test]
    fn test_order_change_requires_reason() {
        assert!(validate_order_change("Cliente reporta falla").is_valid());
        assert!(!validate_order_change("   ").is_valid());
    }

    #[test]
    fn test_into_result() {
        assert!(validate_order_change("ok").into_result("order").is_ok());
        let err = validate_client_form("", "", "", "").into_result("client").unwrap_err();
        assert_eq!(err.fields.len(), 4);
        assert!(err.to_string().contains("client"));
    }
}
