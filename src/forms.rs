use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    constants::{USERNAME_MAX_CHARS, USERNAME_REGEX},
    models::quotes::NewQuote,
};

const REQUIRED: &str = "Ce champ est obligatoire.";

/// validation messages keyed by form field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }

    value.to_string()
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub q: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddQuoteForm {
    pub author: String,
    pub context: String,
    pub content: String,
}

impl AddQuoteForm {
    pub fn validate(&self) -> Result<NewQuote, FieldErrors> {
        let mut errors = FieldErrors::default();

        let author = required(&mut errors, "author", &self.author);
        let content = required(&mut errors, "content", &self.content);
        let context = Some(self.context.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        errors.into_result(NewQuote {
            author,
            context,
            content,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    /// checks everything but username availability, which needs the database.
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let username = required(&mut errors, "username", &self.username);
        if !username.is_empty() {
            if username.chars().count() > USERNAME_MAX_CHARS {
                errors.add(
                    "username",
                    format!("Ce login doit faire au plus {USERNAME_MAX_CHARS} caractères."),
                );
            } else if !USERNAME_REGEX.is_match(&username).unwrap_or_else(|e| {
                tracing::warn!(err = ?e, "an error occurred when matching username");
                false
            }) {
                errors.add("username", "Ce login n'est pas valide.");
            }
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "Les mots de passe ne correspondent pas.");
        }

        errors.into_result(Registration {
            username,
            password: self.password1.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::default();

        let username = required(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result((username, self.password.clone()))
    }
}

/// keeps redirects on this site: only absolute paths, never `//host`.
pub fn safe_next(next: &str, default: &str) -> String {
    if next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\") {
        next.to_string()
    } else {
        default.to_string()
    }
}
