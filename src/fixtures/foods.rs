//! Food Fixtures

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    foods::{Food, Rating},
    prices::parse_price,
};

/// Wrapper for foods in YAML
#[derive(Debug, Deserialize)]
pub struct MenuFile {
    /// Foods in menu order
    pub foods: Vec<FoodFixture>,
}

/// Food fixture from YAML
#[derive(Debug, Deserialize)]
pub struct FoodFixture {
    /// Food id
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Price with currency (e.g. "150.00 NPR")
    pub price: String,

    /// Menu category
    #[serde(default)]
    pub category: String,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Average rating
    #[serde(default)]
    pub rating: Option<Decimal>,
}

impl FoodFixture {
    /// Convert to a [`Food`] and the currency it is priced in
    ///
    /// # Errors
    ///
    /// Returns an error if the price or rating is invalid.
    pub fn try_into_food(self) -> Result<(Food, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price).map_err(|source| FixtureError::Price {
            food: self.id.clone(),
            source,
        })?;

        let rating = self
            .rating
            .map(Rating::try_from)
            .transpose()
            .map_err(|source| FixtureError::Rating {
                food: self.id.clone(),
                source,
            })?;

        let food = Food {
            id: self.id.into(),
            name: self.name,
            description: self.description,
            price,
            category: self.category,
            image: self.image,
            rating,
        };

        Ok((food, currency))
    }
}
