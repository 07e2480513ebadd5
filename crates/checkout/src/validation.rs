//! Validation helpers for the checkout guards

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ValidationError;

static CVV_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3,4}$").expect("Valid card security code pattern"));

const MIN_CARD_DIGITS: usize = 12;
const MAX_CARD_DIGITS: usize = 19;

/// Card security code must be three or four digits
pub fn validate_cvv(cvv: &str) -> Result<(), ValidationError> {
    if CVV_PATTERN.is_match(cvv) {
        Ok(())
    } else {
        Err(ValidationError::Cvv)
    }
}

/// Luhn checksum of a card number. Spaces and dashes are ignored.
pub fn luhn_check(card_number: &str) -> bool {
    let mut digits = Vec::with_capacity(MAX_CARD_DIGITS);
    for c in card_number.chars() {
        match c {
            ' ' | '-' => continue,
            c => match c.to_digit(10) {
                Some(digit) => digits.push(digit),
                None => return false,
            },
        }
    }

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// Card number must pass [`luhn_check`].
///
/// For forms that add a new card. Checkout itself only selects saved cards
/// and never sees a card number.
pub fn validate_card_number(card_number: &str) -> Result<(), ValidationError> {
    if luhn_check(card_number) {
        Ok(())
    } else {
        Err(ValidationError::CardNumber)
    }
}

/// Field must not be blank
pub fn require_field<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::RequiredField(name.to_string())),
    }
}

/// Trimmed promo code, which must not be blank
pub fn validate_promo_code(code: &str) -> Result<&str, ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::PromoCodeEmpty);
    }
    Ok(code)
}
