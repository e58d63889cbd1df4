// src/utils/validate.rs
//
// Field validators shared by the request DTOs.
//
// Each function has the shape `validator`'s `custom(function = ...)` expects,
// so they plug straight into `#[derive(Validate)]`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]{1,64}@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,63}$")
        .expect("email regex is valid")
});

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]{3,20}$").expect("username regex is valid"));

pub const TITLE_LEN: (usize, usize) = (4, 30);
pub const POST_TEXT_LEN: (usize, usize) = (4, 600);
pub const COMMENT_LEN: (usize, usize) = (4, 200);

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Printable ASCII plus newline and tab.
pub fn is_forum_ascii(text: &str) -> bool {
    text.chars()
        .all(|ch| matches!(ch, ' '..='~' | '\n' | '\t'))
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(invalid("email", "Invalid email address"))
    }
}

/// At least 8 characters with an upper-case letter, a lower-case letter and a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(invalid(
            "password",
            "Password must be at least 8 characters and contain upper-case, lower-case and a digit",
        ))
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(invalid(
            "username",
            "Username must be 3-20 characters of letters, digits, '_', '.' or '-'",
        ))
    }
}

pub fn validate_post_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if !is_forum_ascii(title) {
        return Err(invalid("title_ascii", "Title is not in ASCII"));
    }
    if title.len() < TITLE_LEN.0 || title.len() > TITLE_LEN.1 {
        return Err(invalid(
            "title_length",
            "Length of title should be between 4 and 30",
        ));
    }
    Ok(())
}

pub fn validate_post_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if !is_forum_ascii(text) {
        return Err(invalid("text_ascii", "Text is not in ASCII"));
    }
    if text.len() < POST_TEXT_LEN.0 || text.len() > POST_TEXT_LEN.1 {
        return Err(invalid(
            "text_length",
            "Length of text should be between 4 and 600",
        ));
    }
    Ok(())
}

pub fn validate_comment_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid("comment_empty", "Comment is empty"));
    }
    if text.len() < COMMENT_LEN.0 || text.len() > COMMENT_LEN.1 {
        return Err(invalid(
            "comment_length",
            "Length of comment should be between 4 and 200",
        ));
    }
    if !is_forum_ascii(text) {
        return Err(invalid("comment_ascii", "Comment is not in ASCII"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.co.uk").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn passwords_need_all_three_classes() {
        assert!(validate_password("Passw0rd").is_ok());
        assert!(validate_password("Pa0").is_err());
        assert!(validate_password("password1").is_err());
        assert!(validate_password("PASSWORD1").is_err());
        assert!(validate_password("Password").is_err());
    }

    #[test]
    fn usernames() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("john_doe.99-x").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("this_name_is_way_too_long").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn titles_are_trimmed_before_length_check() {
        assert!(validate_post_title("  Rust  ").is_ok());
        assert!(validate_post_title("  ab  ").is_err());
        assert!(validate_post_title(&"x".repeat(31)).is_err());
        assert!(validate_post_title("Привет мир").is_err());
    }

    #[test]
    fn post_text_allows_newlines_and_tabs() {
        assert!(validate_post_text("line one\n\tline two").is_ok());
        assert!(validate_post_text("abc").is_err());
        assert!(validate_post_text(&"y".repeat(601)).is_err());
        assert!(validate_post_text("caf\u{e9} au lait").is_err());
    }

    #[test]
    fn comments() {
        assert!(validate_comment_text("Nice post!").is_ok());
        let empty = validate_comment_text("   ").unwrap_err();
        assert_eq!(empty.code, "comment_empty");
        assert!(validate_comment_text("abc").is_err());
        assert!(validate_comment_text(&"z".repeat(201)).is_err());
        assert!(validate_comment_text("emoji \u{1F600} here").is_err());
    }
}
