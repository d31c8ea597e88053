//! Form rules, declared on the form structs and checked before anything is
//! sent to the backend.

use std::borrow::Cow;
use std::fmt;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Validate)]
pub struct CommentForm<'a> {
    #[validate(
        custom(function = "comment_required"),
        length(min = 2, message = "최소 2글자 이상 입력해주세요.")
    )]
    pub content: &'a str,
}

#[derive(Debug, Validate)]
pub struct PostForm<'a> {
    #[validate(custom(function = "title_required"))]
    pub title: &'a str,
    #[validate(custom(function = "content_required"))]
    pub content: &'a str,
}

#[derive(Debug, Validate)]
pub struct RegisterForm<'a> {
    #[validate(custom(function = "email_required"))]
    pub email: &'a str,
    #[validate(
        custom(function = "password_required"),
        length(min = 6, message = "비밀번호는 6자 이상이어야 합니다.")
    )]
    pub password: &'a str,
}

#[derive(Debug, Validate)]
pub struct LoginForm<'a> {
    #[validate(custom(function = "email_required"))]
    pub email: &'a str,
    #[validate(custom(function = "password_required"))]
    pub password: &'a str,
}

fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::new("required").with_message(Cow::Borrowed(message)))
    } else {
        Ok(())
    }
}

fn comment_required(value: &str) -> Result<(), ValidationError> {
    required(value, messages::COMMENT_REQUIRED)
}

fn title_required(value: &str) -> Result<(), ValidationError> {
    required(value, messages::TITLE_REQUIRED)
}

fn content_required(value: &str) -> Result<(), ValidationError> {
    required(value, messages::CONTENT_REQUIRED)
}

fn email_required(value: &str) -> Result<(), ValidationError> {
    required(value, messages::EMAIL_REQUIRED)
}

fn password_required(value: &str) -> Result<(), ValidationError> {
    required(value, messages::PASSWORD_REQUIRED)
}

/// One error per field, in form order. An empty field reports that it is
/// required rather than too short.
fn field_errors(errors: &ValidationErrors, fields: &[&'static str]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .filter_map(|&field| {
            let list = by_field.get(field)?;
            let error = list
                .iter()
                .find(|e| e.code == "required")
                .or_else(|| list.first())?;
            let message = match &error.message {
                Some(Cow::Borrowed(message)) => *message,
                _ => messages::INVALID_INPUT,
            };
            Some(FieldError { field, message })
        })
        .collect()
}

fn run(form: &impl Validate, fields: &[&'static str]) -> Result<(), Vec<FieldError>> {
    form.validate()
        .map_err(|errors| field_errors(&errors, fields))
}

pub fn validate_comment(content: &str) -> Result<(), FieldError> {
    run(&CommentForm { content }, &["content"]).map_err(|errors| {
        errors.into_iter().next().unwrap_or(FieldError {
            field: "content",
            message: messages::INVALID_INPUT,
        })
    })
}

/// Returns every failing field, so forms can mark all of them at once.
pub fn validate_post(title: &str, content: &str) -> Result<(), Vec<FieldError>> {
    run(&PostForm { title, content }, &["title", "content"])
}

pub fn validate_registration(email: &str, password: &str) -> Result<(), Vec<FieldError>> {
    run(&RegisterForm { email, password }, &["email", "password"])
}

pub fn validate_login(email: &str, password: &str) -> Result<(), Vec<FieldError>> {
    run(&LoginForm { email, password }, &["email", "password"])
}

/// Message for `field` in a list of errors, if any.
pub fn message_for(errors: &[FieldError], field: &str) -> Option<&'static str> {
    errors.iter().find(|e| e.field == field).map(|e| e.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_needs_two_characters() {
        assert_eq!(
            validate_comment("").unwrap_err().message,
            messages::COMMENT_REQUIRED
        );
        assert_eq!(
            validate_comment("a").unwrap_err().message,
            messages::COMMENT_TOO_SHORT
        );
        assert!(validate_comment("ab").is_ok());
    }

    #[test]
    fn comment_length_counts_characters_not_bytes() {
        // one hangul syllable is three bytes in utf-8
        assert!(validate_comment("좋").is_err());
        assert!(validate_comment("좋아").is_ok());
    }

    #[test]
    fn post_reports_every_missing_field() {
        let errors = validate_post("", "").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(message_for(&errors, "title"), Some(messages::TITLE_REQUIRED));
        assert_eq!(message_for(&errors, "content"), Some(messages::CONTENT_REQUIRED));
        assert!(validate_post("title", "body").is_ok());
    }

    #[test]
    fn registration_password_minimum() {
        let errors = validate_registration("a@b.c", "12345").unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError {
                field: "password",
                message: messages::PASSWORD_TOO_SHORT
            }]
        );
        assert!(validate_registration("a@b.c", "123456").is_ok());
        assert_eq!(
            message_for(&validate_registration("", "").unwrap_err(), "email"),
            Some(messages::EMAIL_REQUIRED)
        );
    }

    #[test]
    fn login_only_requires_both_fields() {
        assert!(validate_login("a@b.c", "x").is_ok());
        assert_eq!(validate_login("", "").unwrap_err().len(), 2);
    }

    #[test]
    fn length_messages_match_shared_strings() {
        let err = validate_comment("a").unwrap_err();
        assert_eq!(err.message, messages::COMMENT_TOO_SHORT);
        let errors = validate_registration("a@b.c", "abc").unwrap_err();
        assert_eq!(message_for(&errors, "password"), Some(messages::PASSWORD_TOO_SHORT));
    }

    #[test]
    fn empty_password_is_required_not_short() {
        let errors = validate_registration("a@b.c", "").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, messages::PASSWORD_REQUIRED);
    }

    #[test]
    fn forms_validate_directly() {
        assert!(CommentForm { content: "좋아요" }.validate().is_ok());
        let errors = PostForm { title: "", content: "body" }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(!errors.field_errors().contains_key("content"));
    }
}
