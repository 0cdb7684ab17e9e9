//! Fixtures

use std::{
    fs,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::Cart,
    fixtures::foods::MenuFile,
    foods::{Food, RatingError},
    prices::PriceError,
};

pub mod foods;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price
    #[error("Invalid price for {food}: {source}")]
    Price {
        /// Food being loaded
        food: String,
        /// Underlying error
        #[source]
        source: PriceError,
    },

    /// Invalid rating
    #[error("Invalid rating for {food}: {source}")]
    Rating {
        /// Food being loaded
        food: String,
        /// Underlying error
        #[source]
        source: RatingError,
    },

    /// Currency mismatch between foods
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The same id appears twice
    #[error("Duplicate food id: {0}")]
    DuplicateFood(String),

    /// Food not found
    #[error("Food not found: {0}")]
    FoodNotFound(String),

    /// Menu has no foods
    #[error("Menu has no foods; currency unknown")]
    Empty,
}

/// A menu loaded from `fixtures/menus/<name>.yml`.
#[derive(Debug)]
pub struct MenuFixture {
    foods: Vec<Food>,
    index: FxHashMap<String, usize>,
    currency: &'static Currency,
}

impl MenuFixture {
    /// Load a menu from the crate's `fixtures` directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"), name)
    }

    /// Load a menu from `<base_path>/menus/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        Self::from_file(base_path.as_ref().join("menus").join(format!("{name}.yml")))
    }

    /// Load a menu from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, FixtureError> {
        let path = path.into();
        let contents =
            fs::read_to_string(&path).map_err(|source| FixtureError::Io { path, source })?;

        Self::from_yaml(&contents)
    }

    /// Parse a menu from YAML
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, a price or rating is out of
    /// range, ids repeat, or foods are priced in different currencies.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let file: MenuFile = serde_norway::from_str(contents)?;

        let mut foods = Vec::with_capacity(file.foods.len());
        let mut index = FxHashMap::default();
        let mut currency: Option<&'static Currency> = None;

        for fixture in file.foods {
            let (food, food_currency) = fixture.try_into_food()?;

            match currency {
                Some(existing) if existing != food_currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        food_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(food_currency),
            }

            if index.insert(food.id.to_string(), foods.len()).is_some() {
                return Err(FixtureError::DuplicateFood(food.id.to_string()));
            }

            foods.push(food);
        }

        Ok(Self {
            foods,
            index,
            currency: currency.ok_or(FixtureError::Empty)?,
        })
    }

    /// Foods in file order
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    /// Get a food by id
    ///
    /// # Errors
    ///
    /// Returns an error if the food is not found.
    pub fn food(&self, id: &str) -> Result<&Food, FixtureError> {
        self.index
            .get(id)
            .and_then(|index| self.foods.get(*index))
            .ok_or_else(|| FixtureError::FoodNotFound(id.to_string()))
    }

    /// Currency of every price in the menu
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Empty cart in the menu's currency
    pub fn cart(&self) -> Cart {
        Cart::new(self.currency)
    }

    /// Cart holding `quantity` of each listed food, added one at a time
    ///
    /// # Errors
    ///
    /// Returns an error if a food is not found.
    pub fn cart_with(&self, picks: &[(&str, u32)]) -> Result<Cart, FixtureError> {
        let mut cart = self.cart();

        for (id, quantity) in picks {
            let food = self.food(id)?;

            for _ in 0..*quantity {
                cart.add_item(food);
            }
        }

        Ok(cart)
    }
}
