use std::sync::LazyLock;

use common::responses::FieldErrors;
use regex::Regex;

use super::payload::LeadForm;

pub const NAME_REQUIRED: &str = "Name is required.";
pub const EMAIL_REQUIRED: &str = "Valid email is required.";
pub const PHONE_REQUIRED: &str = "Phone is required.";

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

// dot-atom local part @ hostname with at least two labels, the last starting with a letter
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%\&'*+/=?\^_`\{|\}\~\-]+(?:\.[A-Za-z0-9!#$%\&'*+/=?\^_`\{|\}\~\-]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?\.)+",
        r"[A-Za-z](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?$",
    ))
    .expect("email pattern is valid")
});

/// Syntactic email check; says nothing about deliverability.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, _)) = value.rsplit_once('@') else {
        return false;
    };
    value.len() <= MAX_EMAIL_LEN && local.len() <= MAX_LOCAL_LEN && EMAIL.is_match(value)
}

/// Checks the required fields. Every rule runs, so the result lists all
/// violations at once.
pub fn validate(form: &LeadForm) -> Result<(), FieldErrors> {
    let errors = FieldErrors {
        name: form.name.is_empty().then(|| NAME_REQUIRED.to_string()),
        email: (!is_valid_email(&form.email)).then(|| EMAIL_REQUIRED.to_string()),
        phone: form.phone.is_empty().then(|| PHONE_REQUIRED.to_string()),
    };

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
