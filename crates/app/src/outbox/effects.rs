//! Side effects committed alongside domain state.

use serde::{Deserialize, Serialize};

use crate::domain::notifications::data::NewNotification;

/// An email to deliver. The sending address is added by the [`EmailSender`].
///
/// [`EmailSender`]: crate::outbox::EmailSender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Work to perform once the unit of work that produced it has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    Email(EmailMessage),
    Notification(NewNotification),
}

impl SideEffect {
    /// Value of the outbox `kind` column.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Notification(_) => "notification",
        }
    }

    #[must_use]
    pub fn as_email(&self) -> Option<&EmailMessage> {
        match self {
            Self::Email(email) => Some(email),
            Self::Notification(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn emails_are_tagged_in_the_payload() -> Result<(), serde_json::Error> {
        let effect = SideEffect::Email(EmailMessage {
            to: "buyer@example.com".to_string(),
            subject: "Order Shipped".to_string(),
            html: "Your Order has been shipped.".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&effect)?,
            json!({
                "type": "email",
                "to": "buyer@example.com",
                "subject": "Order Shipped",
                "html": "Your Order has been shipped.",
            })
        );

        Ok(())
    }
}
