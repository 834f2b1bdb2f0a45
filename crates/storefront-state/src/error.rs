pub const PHONE_FORMAT_MESSAGE: &str =
    "Введите корректный номер телефона в формате +7 (XXX) XXX-XX-XX";

/// Shown after a failed order; cart and phone are kept for another attempt.
pub const ORDER_RETRY_MESSAGE: &str = "Ошибка при отправке заказа. Попробуйте ещё раз.";

/// Local input problems caught before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Введите корректный номер телефона в формате +7 (XXX) XXX-XX-XX")]
    IncompletePhone { digits: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_phone_displays_format_hint() {
        let err = ValidationError::IncompletePhone { digits: 4 };
        assert_eq!(err.to_string(), PHONE_FORMAT_MESSAGE);
    }
}
