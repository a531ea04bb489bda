// src/reviews/validators.rs

use super::models::{InsertReviewRequest, ReviewDraft};
use crate::common::{ValidationResult, Validator};

// Title and rating bounds are checked on both sides of the wire; the
// client controller and the endpoint must agree on these four numbers.
pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 40;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

fn validate_review_fields(
    result: &mut ValidationResult,
    rating: i64,
    title: &str,
    description: &str,
) {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        result.add_error("rating", "Rating must be between 1 and 5.");
    }

    let title_len = title.chars().count();
    if title.is_empty() {
        result.add_error("title", "Title is required.");
    } else if title_len < TITLE_MIN || title_len > TITLE_MAX {
        result.add_error("title", "Title must be between 5 and 40 characters.");
    }

    if description.is_empty() {
        result.add_error("description", "Description is required.");
    }
}

pub struct ReviewValidator;

impl Validator<InsertReviewRequest> for ReviewValidator {
    fn validate(&self, data: &InsertReviewRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_review_fields(&mut result, data.rating, &data.title, &data.description);
        result
    }
}

impl Validator<ReviewDraft> for ReviewValidator {
    fn validate(&self, data: &ReviewDraft) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_review_fields(&mut result, data.rating, &data.title, &data.description);
        result
    }
}
