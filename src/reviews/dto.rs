use serde::Deserialize;

use crate::{error::ApiError, extract::Validate};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub film_id: i64,
    pub review: String,
}

impl Validate for CreateReviewRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.film_id <= 0 || self.review.is_empty() {
            return Err(ApiError::invalid_body());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub id: i64,
    pub review: String,
}

impl Validate for UpdateReviewRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.id <= 0 || self.review.is_empty() {
            return Err(ApiError::invalid_body());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteReviewRequest {
    pub id: i64,
}

impl Validate for DeleteReviewRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.id <= 0 {
            return Err(ApiError::invalid_body());
        }
        Ok(())
    }
}
