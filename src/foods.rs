//! Foods

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ids::TypedId, prices::Price};

/// Food identifier, issued by the backend catalog.
pub type FoodId = TypedId<Food>;

/// Errors raised when a rating falls outside the star scale.
#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    /// Ratings must lie within `0..=5`.
    #[error("rating {0} is outside the range 0 to 5")]
    OutOfRange(Decimal),
}

/// Average star rating of a food, on a `0..=5` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rating(Decimal);

impl Rating {
    /// Highest possible rating.
    pub const MAX: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

    /// The rating as a decimal.
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Rating {
    type Error = RatingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value < Decimal::ZERO || value > Self::MAX {
            return Err(RatingError::OutOfRange(value));
        }

        Ok(Rating(value))
    }
}

impl From<Rating> for Decimal {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A catalog item that can be added to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    /// Food identifier
    pub id: FoodId,

    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Menu category (e.g. "Momo")
    pub category: String,

    /// Image reference, as served by the backend
    pub image: Option<String>,

    /// Average rating
    pub rating: Option<Rating>,
}

impl Food {
    /// Creates a food with the given identity and price and no optional details.
    pub fn new(id: impl Into<FoodId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            image: None,
            rating: None,
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rating_accepts_bounds() -> TestResult {
        assert_eq!(Rating::try_from(Decimal::ZERO)?.value(), Decimal::ZERO);
        assert_eq!(Rating::try_from(Decimal::new(5, 0))?.value(), Decimal::new(5, 0));

        Ok(())
    }

    #[test]
    fn rating_rejects_out_of_range() {
        let result = Rating::try_from(Decimal::new(51, 1));

        assert_eq!(result, Err(RatingError::OutOfRange(Decimal::new(51, 1))));
    }

    #[test]
    fn rating_deserialization_validates() {
        let ok: Result<Rating, _> = serde_json::from_str("4.5");
        let err: Result<Rating, _> = serde_json::from_str("7");

        assert!(ok.is_ok());
        assert!(err.is_err());
    }
}
