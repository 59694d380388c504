//! Reviews Data

use crate::domain::reviews::records::ReviewUuid;

/// Reviews per listing page.
pub const PAGE_SIZE: u32 = 10;

/// How many recent reviews a product summary keeps.
pub const RECENT_REVIEWS: u32 = 10;

/// Longest review comment accepted.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Characters of the author's name left readable in listings.
const VISIBLE_NAME_CHARS: usize = 3;

/// New Review Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub uuid: ReviewUuid,
    pub rating: u8,
    pub comment: String,
}

/// Review Update Data
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

pub(crate) fn valid_rating(rating: u8) -> bool {
    (1..=5).contains(&rating)
}

pub(crate) fn valid_comment(comment: &str) -> bool {
    !comment.trim().is_empty() && comment.chars().count() <= MAX_COMMENT_CHARS
}

/// Keep the first few characters of a name and star out the rest.
pub(crate) fn mask_name(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(index, ch)| if index < VISIBLE_NAME_CHARS { ch } else { '*' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_run_from_one_to_five() {
        assert!(valid_rating(1));
        assert!(valid_rating(5));
        assert!(!valid_rating(0));
        assert!(!valid_rating(6));
    }

    #[test]
    fn comments_need_visible_text_within_the_limit() {
        assert!(valid_comment("Lovely lamp"));
        assert!(!valid_comment("   "));
        assert!(!valid_comment(&"x".repeat(MAX_COMMENT_CHARS + 1)));
    }

    #[test]
    fn names_keep_three_characters() {
        assert_eq!(mask_name("Margaret"), "Mar*****");
        assert_eq!(mask_name("Çağla"), "Çağ**");
        assert_eq!(mask_name("Al"), "Al");
        assert_eq!(mask_name(""), "");
    }
}
