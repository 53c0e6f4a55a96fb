//! Checkout form validation.
//!
//! Checks run in a fixed order and stop at the first failure, so the caller
//! always gets the single most relevant message.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone regex"));
static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("valid card number regex"));
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}$").expect("valid expiry regex"));
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("valid cvv regex"));

/// A rejected checkout form. The display text is shown to the shopper as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Card number is required")]
    CardNumberRequired,
    #[error("Cardholder name is required")]
    CardholderNameRequired,
    #[error("Expiry date is required")]
    ExpiryRequired,
    #[error("CVV is required")]
    CvvRequired,
    #[error("Please enter a valid 16-digit card number")]
    InvalidCardNumber,
    #[error("Please enter a valid expiry date (MM/YY)")]
    InvalidExpiry,
    #[error("Please enter a valid CVV")]
    InvalidCvv,
}

/// Payer contact details sent to the hosted payment gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl ContactDetails {
    /// # Errors
    ///
    /// Returns the first failing check: required fields in form order, then
    /// the email format, then the phone format (whitespace ignored).
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.first_name, ValidationError::FirstNameRequired)?;
        require(&self.last_name, ValidationError::LastNameRequired)?;
        require(&self.phone, ValidationError::PhoneRequired)?;
        require(&self.email, ValidationError::EmailRequired)?;
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !PHONE_RE.is_match(&strip_whitespace(&self.phone)) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }
}

/// Card details for a local card payment. Never logged or persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub name: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    /// # Errors
    ///
    /// Returns the first failing check: required fields in form order, then
    /// the card number (16 digits, whitespace ignored), expiry (`MM/YY`) and
    /// CVV (3 or 4 digits) formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.number, ValidationError::CardNumberRequired)?;
        require(&self.name, ValidationError::CardholderNameRequired)?;
        require(&self.expiry, ValidationError::ExpiryRequired)?;
        require(&self.cvv, ValidationError::CvvRequired)?;
        if !CARD_NUMBER_RE.is_match(&strip_whitespace(&self.number)) {
            return Err(ValidationError::InvalidCardNumber);
        }
        if !EXPIRY_RE.is_match(&self.expiry) {
            return Err(ValidationError::InvalidExpiry);
        }
        if !CVV_RE.is_match(&self.cvv) {
            return Err(ValidationError::InvalidCvv);
        }
        Ok(())
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("name", &self.name)
            .field("number", &"[redacted]")
            .field("expiry", &"[redacted]")
            .field("cvv", &"[redacted]")
            .finish()
    }
}

fn require(value: &str, err: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

fn strip_whitespace(value: &str) -> String {
    value.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Abebe".to_owned(),
            last_name: "Bikila".to_owned(),
            phone: "0912 345 678".to_owned(),
            email: "abebe@example.com".to_owned(),
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            number: "4242 4242 4242 4242".to_owned(),
            name: "Abebe Bikila".to_owned(),
            expiry: "12/29".to_owned(),
            cvv: "123".to_owned(),
        }
    }

    #[test]
    fn valid_contact_passes() {
        assert_eq!(contact().validate(), Ok(()));
        let international = ContactDetails {
            phone: "+251912345678".to_owned(),
            ..contact()
        };
        assert_eq!(international.validate(), Ok(()));
    }

    #[test]
    fn blank_fields_are_reported_in_form_order() {
        let blank = ContactDetails::default();
        assert_eq!(blank.validate(), Err(ValidationError::FirstNameRequired));

        let missing_last = ContactDetails {
            last_name: "   ".to_owned(),
            phone: String::new(),
            ..contact()
        };
        assert_eq!(missing_last.validate(), Err(ValidationError::LastNameRequired));

        let missing_phone = ContactDetails {
            phone: String::new(),
            email: String::new(),
            ..contact()
        };
        assert_eq!(missing_phone.validate(), Err(ValidationError::PhoneRequired));

        let missing_email = ContactDetails {
            email: " ".to_owned(),
            ..contact()
        };
        assert_eq!(missing_email.validate(), Err(ValidationError::EmailRequired));
    }

    #[test]
    fn email_format_is_checked_before_phone() {
        let details = ContactDetails {
            email: "not-an-email".to_owned(),
            phone: "12".to_owned(),
            ..contact()
        };
        let err = details.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");
    }

    #[test]
    fn phone_must_have_10_to_15_digits() {
        for bad in ["123456789", "1234567890123456", "09-1234-5678", "phone number"] {
            let details = ContactDetails {
                phone: bad.to_owned(),
                ..contact()
            };
            assert_eq!(
                details.validate(),
                Err(ValidationError::InvalidPhone),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn valid_card_passes() {
        assert_eq!(card().validate(), Ok(()));
    }

    #[test]
    fn card_required_fields() {
        assert_eq!(
            CardDetails::default().validate(),
            Err(ValidationError::CardNumberRequired)
        );
        let no_name = CardDetails {
            name: String::new(),
            ..card()
        };
        assert_eq!(no_name.validate(), Err(ValidationError::CardholderNameRequired));
        let no_expiry = CardDetails {
            expiry: String::new(),
            ..card()
        };
        assert_eq!(no_expiry.validate(), Err(ValidationError::ExpiryRequired));
        let no_cvv = CardDetails {
            cvv: String::new(),
            ..card()
        };
        assert_eq!(no_cvv.validate(), Err(ValidationError::CvvRequired));
    }

    #[test]
    fn card_formats() {
        let short = CardDetails {
            number: "4242 4242".to_owned(),
            ..card()
        };
        assert_eq!(
            short.validate().unwrap_err().to_string(),
            "Please enter a valid 16-digit card number"
        );

        let expiry = CardDetails {
            expiry: "1229".to_owned(),
            ..card()
        };
        assert_eq!(expiry.validate(), Err(ValidationError::InvalidExpiry));

        let cvv = CardDetails {
            cvv: "12345".to_owned(),
            ..card()
        };
        assert_eq!(cvv.validate(), Err(ValidationError::InvalidCvv));

        let amex_cvv = CardDetails {
            cvv: "1234".to_owned(),
            ..card()
        };
        assert_eq!(amex_cvv.validate(), Ok(()));
    }

    #[test]
    fn card_debug_hides_sensitive_fields() {
        let rendered = format!("{:?}", card());
        assert!(!rendered.contains("4242"));
        assert!(!rendered.contains("123"));
        assert!(rendered.contains("Abebe Bikila"));
    }
}
