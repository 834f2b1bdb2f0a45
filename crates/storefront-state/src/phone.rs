//! Canonical Russian mobile numbers behind a `+7 (XXX) XXX-XX-XX` mask.

use std::rc::Rc;

use storefront_core::{State, Storage};

use crate::error::ValidationError;
use crate::persistent::PersistentKeyedState;

pub const PHONE_STORAGE_KEY: &str = "phone";

/// Length of a complete canonical number.
pub const PHONE_DIGITS: usize = 11;

/// Turns whatever the visitor typed into canonical digits: empty, or up to
/// eleven digits starting with `7`. A leading `8` becomes `7`.
pub fn normalize_phone_input(raw: &str) -> String {
    if raw.is_empty() || raw == "+" {
        return String::new();
    }
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return digits;
    }
    if digits.starts_with('8') {
        digits.replace_range(..1, "7");
    }
    if !digits.starts_with('7') {
        digits.insert(0, '7');
    }
    digits.truncate(PHONE_DIGITS);
    digits
}

/// Masked display of canonical digits, revealing separators as digits
/// arrive: `"7999"` renders as `"+7 (999) "`.
pub fn format_phone(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }
    let len = digits.len();
    let slice = |from: usize, to: usize| digits.get(from..to.min(len)).unwrap_or("");
    let mut display = String::from("+7");
    if len > 1 {
        display.push_str(" (");
        display.push_str(slice(1, 4));
    }
    if len >= 4 {
        display.push_str(") ");
        display.push_str(slice(4, 7));
    }
    if len >= 7 {
        display.push('-');
        display.push_str(slice(7, 9));
    }
    if len >= 9 {
        display.push('-');
        display.push_str(slice(9, 11));
    }
    display
}

/// Input-mask form with `_` for every digit still missing.
pub fn placeholder_mask(digits: &str) -> String {
    let mut rest = digits.chars().skip(1);
    let mut display = String::with_capacity(18);
    for slot in "+7 (___) ___-__-__".chars() {
        if slot == '_' {
            display.push(rest.next().unwrap_or('_'));
        } else {
            display.push(slot);
        }
    }
    display
}

/// The checkout phone field. Holds canonical digits only and persists them
/// under the `phone` key; the display string is always derived.
#[derive(Clone)]
pub struct PhoneInputController {
    digits: Rc<PersistentKeyedState<String>>,
}

impl PhoneInputController {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self::with_key(storage, PHONE_STORAGE_KEY)
    }

    pub fn with_key(storage: Rc<dyn Storage>, key: &str) -> Self {
        let digits = PersistentKeyedState::new(storage, key, String::new());
        digits.update_if(|stored| {
            let canonical = normalize_phone_input(stored);
            if canonical == *stored {
                return false;
            }
            *stored = canonical;
            true
        });
        Self {
            digits: Rc::new(digits),
        }
    }

    pub fn on_input(&self, raw: &str) {
        let canonical = normalize_phone_input(raw);
        self.digits.update_if(|digits| {
            if *digits == canonical {
                return false;
            }
            *digits = canonical;
            true
        });
    }

    pub fn digits(&self) -> String {
        self.digits.get()
    }

    pub fn display(&self) -> String {
        self.digits.with(|digits| format_phone(digits))
    }

    pub fn placeholder(&self) -> String {
        self.digits.with(|digits| placeholder_mask(digits))
    }

    pub fn is_complete(&self) -> bool {
        self.digits.with(|digits| digits.len() == PHONE_DIGITS)
    }

    /// The canonical number, if it is complete.
    pub fn validate(&self) -> Result<String, ValidationError> {
        self.digits.with(|digits| {
            if digits.len() == PHONE_DIGITS {
                Ok(digits.clone())
            } else {
                Err(ValidationError::IncompletePhone {
                    digits: digits.len(),
                })
            }
        })
    }

    pub fn reset(&self) {
        self.digits.set(String::new());
    }

    pub fn state(&self) -> State<String> {
        self.digits.as_state()
    }
}

#[cfg(test)]
#[path = "tests/phone_tests.rs"]
mod tests;
