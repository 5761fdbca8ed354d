//! Redeemable rewards and their per-type terms

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::balance::CreditKind;
use super::error::EconomyError;

/// Rewards a user can buy with kudos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardType {
    Voice,
    NaturalLanguage,
    Group,
    Integration,
    Analytics,
}

/// What a reward costs and pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTerms {
    /// Kudos spent per redemption
    pub kudos_cost: u64,
    /// Credit kind granted and how many; `None` for rewards that grant none
    pub payout: Option<(CreditKind, u64)>,
    /// Disabled rewards are listed but cannot be redeemed
    pub available: bool,
}

impl RewardType {
    pub const ALL: [RewardType; 5] = [
        RewardType::Voice,
        RewardType::NaturalLanguage,
        RewardType::Group,
        RewardType::Integration,
        RewardType::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Voice => "voice",
            RewardType::NaturalLanguage => "naturalLanguage",
            RewardType::Group => "group",
            RewardType::Integration => "integration",
            RewardType::Analytics => "analytics",
        }
    }

    /// Per-type cost and payout table
    pub fn terms(&self) -> RewardTerms {
        match self {
            RewardType::Voice => RewardTerms {
                kudos_cost: 12,
                payout: Some((CreditKind::Voice, 2)),
                available: true,
            },
            RewardType::NaturalLanguage => RewardTerms {
                kudos_cost: 12,
                payout: Some((CreditKind::NaturalLanguage, 2)),
                available: true,
            },
            RewardType::Group => RewardTerms {
                kudos_cost: 12,
                payout: Some((CreditKind::Group, 1)),
                available: true,
            },
            RewardType::Analytics => RewardTerms {
                kudos_cost: 12,
                payout: Some((CreditKind::Analytics, 1)),
                available: true,
            },
            // Integration unlocks are not credit-backed yet.
            RewardType::Integration => RewardTerms {
                kudos_cost: 12,
                payout: None,
                available: false,
            },
        }
    }
}

impl FromStr for RewardType {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RewardType::ALL
            .iter()
            .copied()
            .find(|reward| reward.as_str() == s)
            .ok_or_else(|| EconomyError::invalid_reward(s))
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
