//! Catalog

use serde::{Deserialize, Serialize};

use crate::{ids::TypedUuid, prices::Price};

pub mod trees;

/// Product id
pub type ProductId = TypedUuid<Product>;

/// Event service id
pub type EventServiceId = TypedUuid<EventService>;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ornaments, baubles and other loose decorations.
    Decorations,

    /// Ribbons sold by the roll.
    Ribbons,

    /// Rental trees, customised through the tree wizard.
    Trees,

    /// Table centrepieces.
    Centrepieces,
}

impl Category {
    /// Whether products in this category are booked as a scheduled rental.
    pub const fn is_rental(self) -> bool {
        matches!(self, Category::Trees)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Display title
    pub title: String,

    /// Base price
    pub price: Price,

    /// Product category
    pub category: Category,

    /// Available colours
    #[serde(default)]
    pub colors: Vec<String>,

    /// Whether the product ships already decorated
    #[serde(default)]
    pub decorated: bool,

    /// Public image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

/// Event service offered for booking (installations at venues, corporate events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventService {
    /// Event service id
    pub id: EventServiceId,

    /// Display title
    pub title: String,

    /// Base price
    pub price: Price,

    /// Whether the service can currently be booked
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_trees_are_rentals() {
        assert!(Category::Trees.is_rental());
        assert!(!Category::Decorations.is_rental());
        assert!(!Category::Ribbons.is_rental());
        assert!(!Category::Centrepieces.is_rental());
    }

    #[test]
    fn product_defaults_optional_fields() -> anyhow::Result<()> {
        let product: Product = serde_norway::from_str(
            "id: 0190b6a4-5c4e-7cc2-9a3c-1f2e3d4c5b6a\ntitle: Gold Bauble Set\nprice: 2500\ncategory: decorations\n",
        )?;

        assert_eq!(product.price, Price::new(2_500));
        assert!(product.colors.is_empty());
        assert!(!product.decorated);

        Ok(())
    }
}
