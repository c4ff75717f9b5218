//! Client-side input validation.
//!
//! Every validator is a pure function over a structured input record and
//! returns every failing field in field order, so a form can mark all of
//! them at once. Nothing here touches the network.

use serde::{Deserialize, Serialize};

use crate::types::{BookInput, BookPatch, Credentials, Registration};

pub const MIN_PASSWORD_LEN: usize = 4;
pub const MIN_BLOG_CONTENT_LEN: usize = 25;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Non-empty list of field errors produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Blog submission form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub author: String,
    pub email: String,
    pub content: String,
    pub category: String,
    pub agreed_to_terms: bool,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Loose shape check: something before an `@`, and a dot somewhere.
fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    value
        .split_once('@')
        .is_some_and(|(local, _)| !local.is_empty())
        && value.contains('.')
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if is_blank(email) {
        errors.push(FieldError::new("email", "Please enter email"));
    } else if !looks_like_email(email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
}

pub fn validate_book(input: &BookInput) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if is_blank(&input.title) {
        errors.push(FieldError::new("title", "Please enter a book title"));
    }
    if is_blank(&input.author) {
        errors.push(FieldError::new("author", "Please enter author name"));
    }
    ValidationErrors::into_result(errors)
}

pub fn validate_patch(patch: &BookPatch) -> Result<(), ValidationErrors> {
    if patch.is_empty() {
        return Err(ValidationErrors(vec![FieldError::new(
            "book",
            "Nothing to update",
        )]));
    }
    let mut errors = Vec::new();
    if patch.title.as_deref().is_some_and(is_blank) {
        errors.push(FieldError::new("title", "Please enter a book title"));
    }
    if patch.author.as_deref().is_some_and(is_blank) {
        errors.push(FieldError::new("author", "Please enter author name"));
    }
    ValidationErrors::into_result(errors)
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    check_email(&mut errors, &credentials.email);
    if credentials.password.is_empty() {
        errors.push(FieldError::new("password", "Please enter password"));
    }
    ValidationErrors::into_result(errors)
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if is_blank(&registration.name) {
        errors.push(FieldError::new("name", "Please enter your name"));
    }
    check_email(&mut errors, &registration.email);
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    ValidationErrors::into_result(errors)
}

pub fn validate_blog_post(post: &BlogPost) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if is_blank(&post.title) {
        errors.push(FieldError::new("title", "Please enter a blog title"));
    }
    if is_blank(&post.author) {
        errors.push(FieldError::new("author", "Please enter author name"));
    }
    check_email(&mut errors, &post.email);
    if post.content.trim().chars().count() <= MIN_BLOG_CONTENT_LEN {
        errors.push(FieldError::new(
            "content",
            format!("Blog content should be more than {MIN_BLOG_CONTENT_LEN} characters"),
        ));
    }
    if post.category.is_empty() {
        errors.push(FieldError::new("category", "Please select a category"));
    }
    if !post.agreed_to_terms {
        errors.push(FieldError::new(
            "terms",
            "You must agree to the terms and conditions",
        ));
    }
    ValidationErrors::into_result(errors)
}
