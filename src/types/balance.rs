//! Currency kinds, counters and conditional counter updates
//!
//! Credit and kudos kinds are closed enumerations: an unknown kind is rejected
//! when it is parsed, never discovered by a failed lookup later on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EconomyError;

/// Stable identifier of the user that owns a balance record
///
/// Authentication happens upstream; the engine trusts whatever identifier the
/// caller resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

/// A closed set of counter names inside one currency
pub trait CounterKind: Copy + Ord + fmt::Debug + 'static {
    /// Every member of the set, in declaration order
    const ALL: &'static [Self];

    /// Wire name of the kind (the document field name)
    fn as_str(&self) -> &'static str;
}

/// Consumable entitlement units, one counter per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditKind {
    Voice,
    Blueprint,
    Group,
    Analytics,
    NaturalLanguage,
}

impl CounterKind for CreditKind {
    const ALL: &'static [Self] = &[
        CreditKind::Voice,
        CreditKind::Blueprint,
        CreditKind::Group,
        CreditKind::Analytics,
        CreditKind::NaturalLanguage,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CreditKind::Voice => "voice",
            CreditKind::Blueprint => "blueprint",
            CreditKind::Group => "group",
            CreditKind::Analytics => "analytics",
            CreditKind::NaturalLanguage => "naturalLanguage",
        }
    }
}

impl CreditKind {
    /// Starter balance granted at registration
    pub fn starter_balance(&self) -> u64 {
        match self {
            CreditKind::Voice => 10,
            CreditKind::Blueprint => 5,
            CreditKind::Group => 3,
            CreditKind::Analytics => 0,
            CreditKind::NaturalLanguage => 0,
        }
    }
}

impl FromStr for CreditKind {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CreditKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EconomyError::invalid_argument(format!("unknown credit kind '{s}'")))
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social currency earned by sending encouragements and congratulations
///
/// The two kinds are distinct signals and are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KudosKind {
    Encouragements,
    Congratulations,
}

impl CounterKind for KudosKind {
    const ALL: &'static [Self] = &[KudosKind::Encouragements, KudosKind::Congratulations];

    fn as_str(&self) -> &'static str {
        match self {
            KudosKind::Encouragements => "encouragements",
            KudosKind::Congratulations => "congratulations",
        }
    }
}

impl FromStr for KudosKind {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KudosKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EconomyError::invalid_kudos_kind(s))
    }
}

impl fmt::Display for KudosKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two currencies held in a balance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Credits,
    Kudos,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Credits => f.write_str("credits"),
            Currency::Kudos => f.write_str("kudos"),
        }
    }
}

/// Address of a single counter inside a balance record
///
/// Displays as the document field path, e.g. `credits.voice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "currency", content = "kind", rename_all = "lowercase")]
pub enum Counter {
    #[serde(rename = "credits")]
    Credit(CreditKind),
    Kudos(KudosKind),
}

impl Counter {
    pub fn currency(&self) -> Currency {
        match self {
            Counter::Credit(_) => Currency::Credits,
            Counter::Kudos(_) => Currency::Kudos,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Counter::Credit(kind) => kind.as_str(),
            Counter::Kudos(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.currency(), self.kind_str())
    }
}

impl From<CreditKind> for Counter {
    fn from(kind: CreditKind) -> Self {
        Counter::Credit(kind)
    }
}

impl From<KudosKind> for Counter {
    fn from(kind: KudosKind) -> Self {
        Counter::Kudos(kind)
    }
}

/// Mapping from kind to non-negative balance
///
/// Missing kinds read as zero, so records written before a kind existed stay
/// valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counters<K: Ord>(BTreeMap<K, u64>);

impl<K: CounterKind> Counters<K> {
    /// Every kind present with a zero balance
    pub fn zeroed() -> Self {
        Counters(K::ALL.iter().map(|kind| (*kind, 0)).collect())
    }

    pub fn from_fn(f: impl Fn(K) -> u64) -> Self {
        Counters(K::ALL.iter().map(|kind| (*kind, f(*kind))).collect())
    }

    pub fn get(&self, kind: K) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: K, value: u64) {
        self.0.insert(kind, value);
    }

    /// Apply a signed delta, returning the new value
    ///
    /// `None` when the result would be negative or overflow; the counter is
    /// left untouched in that case.
    pub fn checked_apply(&mut self, kind: K, delta: i64) -> Option<u64> {
        let current = self.get(kind);
        let next = if delta >= 0 {
            current.checked_add(delta.unsigned_abs())?
        } else {
            current.checked_sub(delta.unsigned_abs())?
        };
        self.0.insert(kind, next);
        Some(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, u64)> + '_ {
        K::ALL.iter().map(|kind| (*kind, self.get(*kind)))
    }
}

impl<K: CounterKind> Default for Counters<K> {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Both currencies of one user, as seen after a store operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub credits: Counters<CreditKind>,
    pub kudos: Counters<KudosKind>,
}

impl Balances {
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Credit(kind) => self.credits.get(kind),
            Counter::Kudos(kind) => self.kudos.get(kind),
        }
    }

    pub fn checked_apply(&mut self, counter: Counter, delta: i64) -> Option<u64> {
        match counter {
            Counter::Credit(kind) => self.credits.checked_apply(kind, delta),
            Counter::Kudos(kind) => self.kudos.checked_apply(kind, delta),
        }
    }
}

/// One signed change to a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub counter: Counter,
    pub delta: i64,
}

/// A conditional, multi-counter update against one user document
///
/// Every debit doubles as a guard: the whole update applies only when each
/// debited counter holds at least the debited amount. Stores must apply it as
/// one atomic step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterUpdate {
    deltas: Vec<CounterDelta>,
}

impl CounterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarded decrement by `amount`
    ///
    /// The sign of `amount` is ignored; `i64::MIN` saturates to `i64::MAX`.
    pub fn debit(mut self, counter: impl Into<Counter>, amount: i64) -> Self {
        self.deltas.push(CounterDelta {
            counter: counter.into(),
            delta: -amount.saturating_abs(),
        });
        self
    }

    /// Unconditional increment by `amount`
    pub fn credit(mut self, counter: impl Into<Counter>, amount: i64) -> Self {
        self.deltas.push(CounterDelta {
            counter: counter.into(),
            delta: amount.saturating_abs(),
        });
        self
    }

    pub fn deltas(&self) -> &[CounterDelta] {
        &self.deltas
    }

    /// Counters that must hold at least the given amount
    pub fn guards(&self) -> impl Iterator<Item = (Counter, u64)> + '_ {
        self.deltas
            .iter()
            .filter(|d| d.delta < 0)
            .map(|d| (d.counter, d.delta.unsigned_abs()))
    }

    /// Amount the update needs from `counter`, zero if it is not debited
    pub fn required(&self, counter: Counter) -> u64 {
        self.guards()
            .filter(|(c, _)| *c == counter)
            .fold(0u64, |total, (_, amount)| total.saturating_add(amount))
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Apply against `balances`, all or nothing
    ///
    /// On a failed guard returns the offending counter and leaves `balances`
    /// unchanged.
    pub fn apply_to(&self, balances: &mut Balances) -> Result<(), UpdateFailure> {
        for (counter, _) in self.guards() {
            if balances.get(counter) < self.required(counter) {
                return Err(UpdateFailure::Guard(counter));
            }
        }

        let mut next = balances.clone();
        for delta in &self.deltas {
            next.checked_apply(delta.counter, delta.delta)
                .ok_or(UpdateFailure::Overflow(delta.counter))?;
        }
        *balances = next;
        Ok(())
    }
}

/// Why a counter update could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFailure {
    /// A debited counter held less than required
    Guard(Counter),
    /// An increment would overflow
    Overflow(Counter),
}
