//! Tree customisation options

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prices::Price;

/// Errors raised while customising a tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeOptionsError {
    /// The rental period is not one of the offered periods.
    #[error("Rental period of {0} days is not available")]
    InvalidRentalPeriod(u16),

    /// The decoration level is not one of the offered levels.
    #[error("Decoration level of {0}% is not available")]
    InvalidDecorLevel(u8),

    /// The height is not in the size table.
    #[error("Tree height {0} is not available")]
    UnknownSize(String),

    /// The tree type is not in the type table.
    #[error("Tree type {0} is not available")]
    UnknownType(String),

    /// Event sizing only applies to fully decorated trees.
    #[error("Event size can only be chosen with 100% decoration")]
    EventSizeRequiresFullDecor,
}

/// Paired height and width labels for a tree size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSize {
    /// Height label
    pub height: &'static str,

    /// Width label, fixed by the height
    pub width: &'static str,
}

/// Sizes offered by the tree wizard.
pub const TREE_SIZES: [TreeSize; 6] = [
    TreeSize {
        height: "6ft",
        width: "3.5ft",
    },
    TreeSize {
        height: "7ft",
        width: "4ft",
    },
    TreeSize {
        height: "8ft",
        width: "4.5ft",
    },
    TreeSize {
        height: "9ft",
        width: "5ft",
    },
    TreeSize {
        height: "10ft",
        width: "5.5ft",
    },
    TreeSize {
        height: "12ft",
        width: "6.5ft",
    },
];

/// Tree types offered by the tree wizard.
pub const TREE_TYPES: [&str; 4] = ["Nordmann Fir", "Noble Fir", "Fraser Fir", "Frosted Pine"];

/// Look up a size by its height label.
pub fn tree_size(height: &str) -> Option<&'static TreeSize> {
    TREE_SIZES
        .iter()
        .find(|size| size.height.eq_ignore_ascii_case(height.trim()))
}

/// Rental period offered for trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RentalPeriod {
    /// 45 days
    Days45,

    /// 60 days
    Days60,

    /// 90 days
    Days90,
}

impl RentalPeriod {
    /// Look up a period by its length in days.
    pub const fn from_days(days: u16) -> Option<Self> {
        match days {
            45 => Some(RentalPeriod::Days45),
            60 => Some(RentalPeriod::Days60),
            90 => Some(RentalPeriod::Days90),
            _ => None,
        }
    }

    /// Length in days.
    pub const fn days(self) -> u16 {
        match self {
            RentalPeriod::Days45 => 45,
            RentalPeriod::Days60 => 60,
            RentalPeriod::Days90 => 90,
        }
    }

    /// Surcharge over the base rental price.
    pub const fn surcharge(self) -> Price {
        match self {
            RentalPeriod::Days45 => Price::ZERO,
            RentalPeriod::Days60 => Price::from_major(100),
            RentalPeriod::Days90 => Price::from_major(200),
        }
    }
}

impl TryFrom<u16> for RentalPeriod {
    type Error = TreeOptionsError;

    fn try_from(days: u16) -> Result<Self, Self::Error> {
        RentalPeriod::from_days(days).ok_or(TreeOptionsError::InvalidRentalPeriod(days))
    }
}

impl From<RentalPeriod> for u16 {
    fn from(period: RentalPeriod) -> Self {
        period.days()
    }
}

/// Share of the tree surface covered in ornaments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DecorLevel {
    /// 50%
    Half,

    /// 75%
    ThreeQuarters,

    /// 100%
    Full,
}

impl DecorLevel {
    /// Coverage percentage.
    pub const fn percent(self) -> u8 {
        match self {
            DecorLevel::Half => 50,
            DecorLevel::ThreeQuarters => 75,
            DecorLevel::Full => 100,
        }
    }
}

impl TryFrom<u8> for DecorLevel {
    type Error = TreeOptionsError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        match percent {
            50 => Ok(DecorLevel::Half),
            75 => Ok(DecorLevel::ThreeQuarters),
            100 => Ok(DecorLevel::Full),
            other => Err(TreeOptionsError::InvalidDecorLevel(other)),
        }
    }
}

impl From<DecorLevel> for u8 {
    fn from(level: DecorLevel) -> Self {
        level.percent()
    }
}

/// Size of the event a fully decorated tree is dressed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSize {
    /// Small gatherings
    Small,

    /// Medium events
    Medium,

    /// Large events
    Large,
}

/// Options chosen in the tree customisation wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOptions {
    height: String,
    width: String,
    tree_type: String,
    rental_period: Option<RentalPeriod>,
    decor_level: Option<DecorLevel>,
    event_size: Option<EventSize>,
}

impl TreeOptions {
    /// Start a customisation for a size and type from the fixed tables.
    ///
    /// # Errors
    ///
    /// - [`TreeOptionsError::UnknownSize`]: the height is not in [`TREE_SIZES`].
    /// - [`TreeOptionsError::UnknownType`]: the type is not in [`TREE_TYPES`].
    pub fn new(height: &str, tree_type: &str) -> Result<Self, TreeOptionsError> {
        let size =
            tree_size(height).ok_or_else(|| TreeOptionsError::UnknownSize(height.to_string()))?;

        let tree_type = TREE_TYPES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(tree_type.trim()))
            .ok_or_else(|| TreeOptionsError::UnknownType(tree_type.to_string()))?;

        Ok(Self {
            height: size.height.to_string(),
            width: size.width.to_string(),
            tree_type: (*tree_type).to_string(),
            rental_period: None,
            decor_level: None,
            event_size: None,
        })
    }

    /// Height label
    pub fn height(&self) -> &str {
        &self.height
    }

    /// Width label
    pub fn width(&self) -> &str {
        &self.width
    }

    /// Tree type
    pub fn tree_type(&self) -> &str {
        &self.tree_type
    }

    /// Selected rental period
    pub fn rental_period(&self) -> Option<RentalPeriod> {
        self.rental_period
    }

    /// Selected decoration level
    pub fn decor_level(&self) -> Option<DecorLevel> {
        self.decor_level
    }

    /// Selected event size
    pub fn event_size(&self) -> Option<EventSize> {
        self.event_size
    }

    /// Select the rental period.
    pub fn set_rental_period(&mut self, period: RentalPeriod) {
        self.rental_period = Some(period);
    }

    /// Select the decoration level. Dropping below 100% clears the event size.
    pub fn set_decor_level(&mut self, level: DecorLevel) {
        self.decor_level = Some(level);

        if level != DecorLevel::Full {
            self.event_size = None;
        }
    }

    /// Select the event size.
    ///
    /// # Errors
    ///
    /// Returns [`TreeOptionsError::EventSizeRequiresFullDecor`] unless the
    /// decoration level is 100%.
    pub fn set_event_size(&mut self, size: Option<EventSize>) -> Result<(), TreeOptionsError> {
        if size.is_some() && self.decor_level != Some(DecorLevel::Full) {
            return Err(TreeOptionsError::EventSizeRequiresFullDecor);
        }

        self.event_size = size;

        Ok(())
    }
}
