//! Inventory Records

/// Result of an attempted stock cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCut {
    /// Stock was decremented and the sold amount incremented by the same quantity.
    Applied { available_stock: u64, sold_amount: u64 },

    /// Not enough stock; nothing was written.
    Insufficient { available_stock: u64 },
}

impl StockCut {
    /// Whether stock was actually taken.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
