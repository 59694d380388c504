//! Shipping status state machine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment progress of an order.
///
/// `pending → approved → shipped → delivered` is the happy path. Pending and approved
/// orders can be cancelled; approved, shipped and delivered orders can be refunded.
/// Cancelled and refunded are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    Pending,
    Approved,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl ShippingStatus {
    /// Every status, in state machine order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Approved,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    /// Statuses an order may move to from `self`.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Cancelled],
            Self::Approved => &[Self::Shipped, Self::Cancelled, Self::Refunded],
            Self::Shipped => &[Self::Delivered, Self::Refunded],
            Self::Delivered => &[Self::Refunded],
            Self::Cancelled | Self::Refunded => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_targets().contains(&next)
    }

    /// Cancelled and refunded orders never move again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Whether an order in this status contributes to revenue.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown shipping status: {0}")]
pub struct UnknownShippingStatus(pub String);

impl FromStr for ShippingStatus {
    type Err = UnknownShippingStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownShippingStatus(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ShippingStatus::{Approved, Cancelled, Delivered, Pending, Refunded, Shipped};
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn exceptional_paths_are_allowed() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Refunded));
        assert!(Shipped.can_transition_to(Refunded));
        assert!(Delivered.can_transition_to(Refunded));
    }

    #[test]
    fn shipped_cannot_move_backwards() {
        assert!(!Shipped.can_transition_to(Approved));
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn same_status_is_never_a_transition() {
        for status in ShippingStatus::ALL {
            assert!(
                !status.can_transition_to(status),
                "{status} must not transition to itself"
            );
        }
    }

    #[test]
    fn cancelled_and_refunded_are_terminal() {
        for status in ShippingStatus::ALL {
            assert!(!Cancelled.can_transition_to(status));
            assert!(!Refunded.can_transition_to(status));
        }

        assert!(Cancelled.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(!Delivered.is_terminal());
    }

    #[test]
    fn nothing_returns_to_pending() {
        for status in ShippingStatus::ALL {
            assert!(!status.can_transition_to(Pending));
        }
    }

    #[test]
    fn parses_storage_names() {
        for status in ShippingStatus::ALL {
            assert_eq!(status.as_str().parse::<ShippingStatus>().ok(), Some(status));
        }

        assert!("lost".parse::<ShippingStatus>().is_err());
    }
}
