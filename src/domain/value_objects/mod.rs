//! Value Objects for checkout

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shipping phone number, normalized to an optional leading `+` followed by digits only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 10;
    pub const MAX_DIGITS: usize = 15;

    /// Strips separators, keeps a leading `+` (or rewrites a leading `00` to `+`)
    /// and enforces the digit count.
    pub fn parse(raw: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { return Err(PhoneNumberError::Empty); }

        let (mut normalized, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (String::from("+"), rest),
            None => match trimmed.strip_prefix("00") {
                Some(rest) => (String::from("+"), rest),
                None => (String::new(), trimmed),
            },
        };

        let mut digits = 0usize;
        for c in rest.chars() {
            match c {
                '0'..='9' => { normalized.push(c); digits += 1; }
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneNumberError::InvalidCharacter(other)),
            }
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneNumberError::Length(digits));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneNumberError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("phone number must have 10 to 15 digits, got {0}")]
    Length(usize),
}

/// Client-supplied checkout token. Expected to be UUID-shaped but only bounded here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub const MAX_LEN: usize = 128;

    pub fn new(value: impl Into<String>) -> Result<Self, IdempotencyKeyError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(IdempotencyKeyError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(IdempotencyKeyError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyKeyError {
    #[error("idempotency key is empty")]
    Empty,
    #[error("idempotency key is longer than 128 characters")]
    TooLong,
}
