use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ResourceKind;

/// Gold, food and faith counters. Used both for holdings and for partial
/// offers, where a zero entry means the resource is not named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceBundle {
    counts: [u32; ResourceKind::ALL.len()],
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self::zero()
    }
}

impl ResourceBundle {
    pub const fn new(gold: u32, food: u32, faith: u32) -> Self {
        Self {
            counts: [gold, food, faith],
        }
    }

    pub const fn zero() -> Self {
        Self {
            counts: [0; ResourceKind::ALL.len()],
        }
    }

    pub const fn gold(amount: u32) -> Self {
        Self::new(amount, 0, 0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| v as u64).sum()
    }

    pub fn add(&mut self, resource: ResourceKind, amount: u32) {
        let idx = resource_index(resource);
        self.counts[idx] = self.counts[idx].saturating_add(amount);
    }

    pub fn add_bundle(&mut self, other: &ResourceBundle) {
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] = self.counts[idx].saturating_add(*value);
        }
    }

    pub fn subtract(&mut self, resource: ResourceKind, amount: u32) -> Result<(), ResourceError> {
        let idx = resource_index(resource);
        if self.counts[idx] < amount {
            return Err(ResourceError::Insufficient {
                resource,
                available: self.counts[idx],
                requested: amount,
            });
        }
        self.counts[idx] -= amount;
        Ok(())
    }

    pub fn subtract_bundle(&mut self, other: &ResourceBundle) -> Result<(), ResourceError> {
        self.check_afford(other)?;
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] -= *value;
        }
        Ok(())
    }

    pub fn can_afford(&self, other: &ResourceBundle) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(have, need)| have >= need)
    }

    /// Like [`can_afford`](Self::can_afford) but names the first shortfall.
    pub fn check_afford(&self, other: &ResourceBundle) -> Result<(), ResourceError> {
        for (resource, need) in other.iter() {
            let have = self.get(resource);
            if have < need {
                return Err(ResourceError::Insufficient {
                    resource,
                    available: have,
                    requested: need,
                });
            }
        }
        Ok(())
    }

    /// Multiplies every counter, or `None` on overflow.
    pub fn checked_scale(&self, factor: u32) -> Option<ResourceBundle> {
        let mut counts = [0; ResourceKind::ALL.len()];
        for (idx, value) in self.counts.iter().enumerate() {
            counts[idx] = value.checked_mul(factor)?;
        }
        Some(ResourceBundle { counts })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&value| value == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.counts[resource_index(resource)]
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        for (resource, amount) in self.iter() {
            if amount > 0 {
                parts.push(format!("{amount} {resource}"));
            }
        }
        if parts.is_empty() {
            return write!(f, "nothing");
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("insufficient {resource}: have {available}, need {requested}")]
    Insufficient {
        resource: ResourceKind,
        available: u32,
        requested: u32,
    },
    #[error("cost overflows resource counters")]
    CostOverflow,
}

const fn resource_index(resource: ResourceKind) -> usize {
    match resource {
        ResourceKind::Gold => 0,
        ResourceKind::Food => 1,
        ResourceKind::Faith => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_bundle_is_all_or_nothing() {
        let mut held = ResourceBundle::new(10, 5, 0);
        let err = held
            .subtract_bundle(&ResourceBundle::new(5, 6, 0))
            .unwrap_err();
        assert_eq!(
            err,
            ResourceError::Insufficient {
                resource: ResourceKind::Food,
                available: 5,
                requested: 6,
            }
        );
        assert_eq!(held, ResourceBundle::new(10, 5, 0));

        held.subtract_bundle(&ResourceBundle::new(10, 5, 0)).unwrap();
        assert!(held.is_empty());
    }

    #[test]
    fn zero_entries_are_always_affordable() {
        let held = ResourceBundle::zero();
        assert!(held.can_afford(&ResourceBundle::zero()));
        assert!(!held.can_afford(&ResourceBundle::gold(1)));
    }

    #[test]
    fn checked_scale_detects_overflow() {
        assert_eq!(
            ResourceBundle::new(10, 2, 0).checked_scale(3),
            Some(ResourceBundle::new(30, 6, 0))
        );
        assert_eq!(ResourceBundle::new(10, 2, 0).checked_scale(u32::MAX), None);
    }

    #[test]
    fn display_lists_named_resources_only() {
        assert_eq!(ResourceBundle::gold(30).to_string(), "30 gold");
        assert_eq!(ResourceBundle::zero().to_string(), "nothing");
    }
}
