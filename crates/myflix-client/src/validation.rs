use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{NewUser, UserPatch};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Checks a registration form before it is sent.
pub fn validate_new_user(user: &NewUser) -> ApiResult<()> {
    let mut fields = FieldErrors::new();

    if let Some(msg) = check_username(&user.username) {
        fields.insert("Username".into(), msg);
    }
    if let Some(msg) = check_password(&user.password) {
        fields.insert("Password".into(), msg);
    }
    if let Some(msg) = check_email(&user.email) {
        fields.insert("Email".into(), msg);
    }
    if user.birthday.is_none() {
        fields.insert("Birthday".into(), "Birthday is required".into());
    }

    finish(fields)
}

/// Checks the fields of a profile edit.
pub fn validate_patch(patch: &UserPatch) -> ApiResult<()> {
    finish(patch_fields(patch)?)
}

/// Checks a profile edit form, where a new password has to be typed twice.
pub fn validate_patch_confirmed(patch: &UserPatch, confirm_password: Option<&str>) -> ApiResult<()> {
    let mut fields = patch_fields(patch)?;
    if let Some(password) = patch.password.as_deref() {
        if !fields.contains_key("password") && confirm_password != Some(password) {
            fields.insert("confirmPassword".into(), "Passwords do not match".into());
        }
    }
    finish(fields)
}

fn patch_fields(patch: &UserPatch) -> ApiResult<FieldErrors> {
    let mut fields = FieldErrors::new();

    if patch.is_empty() {
        return Err(ApiError::validation("Nothing to update", fields));
    }
    if let Some(msg) = patch.username.as_deref().and_then(check_username) {
        fields.insert("username".into(), msg);
    }
    if let Some(msg) = patch.email.as_deref().and_then(check_email) {
        fields.insert("email".into(), msg);
    }
    if let Some(msg) = patch.password.as_deref().and_then(check_password) {
        fields.insert("password".into(), msg);
    }
    Ok(fields)
}

fn finish(fields: FieldErrors) -> ApiResult<()> {
    match fields.values().next() {
        None => Ok(()),
        Some(first) => Err(ApiError::validation(first.clone(), fields)),
    }
}

fn check_username(username: &str) -> Option<String> {
    if username.trim().is_empty() {
        Some("Username is required".into())
    } else if username.chars().count() < MIN_USERNAME_LEN {
        Some(format!("Username must be at least {MIN_USERNAME_LEN} characters"))
    } else {
        None
    }
}

fn check_password(password: &str) -> Option<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Some(format!("Password must be at least {MIN_PASSWORD_LEN} characters"))
    } else {
        None
    }
}

fn check_email(email: &str) -> Option<String> {
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            None
        }
        _ => Some("Invalid email address".into()),
    }
}
