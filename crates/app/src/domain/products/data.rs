//! Products Data

use crate::domain::products::records::{ProductStatus, ProductUuid};

/// Shortest product title a seller may publish.
pub const MIN_TITLE_CHARS: usize = 3;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub base_price: u64,
    pub available_stock: u64,
    pub status: ProductStatus,
}

/// Product Update Data
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<u64>,
    pub status: Option<ProductStatus>,
}

pub(crate) fn valid_title(title: &str) -> bool {
    title.trim().chars().count() >= MIN_TITLE_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_need_three_visible_characters() {
        assert!(valid_title("Mug"));
        assert!(valid_title("Çay"));
        assert!(!valid_title(" ab "));
    }
}
