use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    validation::{check_length, finish, is_valid_email},
};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration input after normalization and checks.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();

        let mut errors = Vec::new();
        check_length(&mut errors, "name", &name, NAME_MIN, NAME_MAX);
        if !is_valid_email(&email) {
            errors.push("email must be a valid email address".into());
        }
        // Passwords are taken verbatim, including surrounding whitespace.
        let password_len = self.password.chars().count();
        if password_len < PASSWORD_MIN {
            errors.push(format!("password must be at least {PASSWORD_MIN} characters"));
        } else if password_len > PASSWORD_MAX {
            errors.push(format!("password must be at most {PASSWORD_MAX} characters"));
        }
        finish(errors)?;

        Ok(NewUser {
            name,
            email,
            password: self.password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub name: String,
}

/// Session status as seen by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}
