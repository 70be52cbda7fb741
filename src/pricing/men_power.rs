//! Men power tiers

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{prices::Price, pricing::PricingError};

/// One tier of the men power table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenPowerTier {
    /// Smallest crew size this tier applies to
    pub min_workers: u8,

    /// Surcharge for crews in this tier
    pub surcharge: Price,
}

/// Tiered installation crew surcharges, ordered by crew size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MenPowerTier>", into = "Vec<MenPowerTier>")]
pub struct MenPowerTiers {
    tiers: SmallVec<[MenPowerTier; 4]>,
}

impl MenPowerTiers {
    /// Build a tier table.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidMenPowerTiers`] when the table is empty,
    /// does not start at one worker, or repeats a crew size.
    pub fn new(tiers: impl IntoIterator<Item = MenPowerTier>) -> Result<Self, PricingError> {
        let mut tiers: SmallVec<[MenPowerTier; 4]> = tiers.into_iter().collect();

        tiers.sort_by_key(|tier| tier.min_workers);

        if tiers.first().map(|tier| tier.min_workers) != Some(1) {
            return Err(PricingError::InvalidMenPowerTiers(
                "the first tier must start at 1 worker",
            ));
        }

        if tiers
            .windows(2)
            .any(|pair| matches!(pair, [a, b] if a.min_workers == b.min_workers))
        {
            return Err(PricingError::InvalidMenPowerTiers(
                "each tier needs a distinct crew size",
            ));
        }

        Ok(Self { tiers })
    }

    /// Surcharge for a crew of `workers`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidMenPower`] for a crew of zero.
    pub fn surcharge(&self, workers: u8) -> Result<Price, PricingError> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| workers >= tier.min_workers)
            .map(|tier| tier.surcharge)
            .ok_or(PricingError::InvalidMenPower(workers))
    }

    /// Tiers in ascending crew size.
    pub fn tiers(&self) -> &[MenPowerTier] {
        &self.tiers
    }
}

impl Default for MenPowerTiers {
    /// 1-2 workers are included, 3-4 cost $120 and 5 or more cost $250.
    fn default() -> Self {
        Self {
            tiers: smallvec![
                MenPowerTier {
                    min_workers: 1,
                    surcharge: Price::ZERO,
                },
                MenPowerTier {
                    min_workers: 3,
                    surcharge: Price::from_major(120),
                },
                MenPowerTier {
                    min_workers: 5,
                    surcharge: Price::from_major(250),
                },
            ],
        }
    }
}

impl TryFrom<Vec<MenPowerTier>> for MenPowerTiers {
    type Error = PricingError;

    fn try_from(tiers: Vec<MenPowerTier>) -> Result<Self, Self::Error> {
        MenPowerTiers::new(tiers)
    }
}

impl From<MenPowerTiers> for Vec<MenPowerTier> {
    fn from(tiers: MenPowerTiers) -> Self {
        tiers.tiers.into_vec()
    }
}
