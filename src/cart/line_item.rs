//! Line items

use std::num::NonZeroU32;

use crate::{
    foods::{Food, FoodId},
    prices::Price,
};

/// One food entry in a cart, with its quantity.
///
/// The quantity is always at least one; a line that would drop to zero is
/// removed from its cart instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    id: FoodId,
    name: String,
    unit_price: Price,
    image: Option<String>,
    quantity: NonZeroU32,
}

impl LineItem {
    /// Creates a line for a single unit of the given food.
    #[must_use]
    pub fn from_food(food: &Food) -> Self {
        Self::new(
            food.id.clone(),
            food.name.clone(),
            food.price,
            food.image.clone(),
            NonZeroU32::MIN,
        )
    }

    /// Creates a line with an explicit quantity.
    #[must_use]
    pub fn new(
        id: FoodId,
        name: String,
        unit_price: Price,
        image: Option<String>,
        quantity: NonZeroU32,
    ) -> Self {
        Self {
            id,
            name,
            unit_price,
            image,
            quantity,
        }
    }

    /// Returns the food identifier.
    #[must_use]
    pub fn id(&self) -> &FoodId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Returns the image reference.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns the quantity.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Returns `quantity × unit price`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity.get())
    }

    pub(super) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub(super) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}
