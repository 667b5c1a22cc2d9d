//! Symbol kinds, rarity weights and payout multipliers

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Smallest match count that can ever pay
pub const MIN_MATCH_COUNT: u8 = 3;

/// Symbol kind shown on the reels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolKind {
    Cherry = 0,
    Lemon = 1,
    Orange = 2,
    Plum = 3,
    Grape = 4,
    Watermelon = 5,
    Bell = 6,
    Seven = 7,
}

impl SymbolKind {
    /// Every kind, in catalog order
    pub const ALL: [SymbolKind; 8] = [
        SymbolKind::Cherry,
        SymbolKind::Lemon,
        SymbolKind::Orange,
        SymbolKind::Plum,
        SymbolKind::Grape,
        SymbolKind::Watermelon,
        SymbolKind::Bell,
        SymbolKind::Seven,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cherry => "Cherry",
            Self::Lemon => "Lemon",
            Self::Orange => "Orange",
            Self::Plum => "Plum",
            Self::Grape => "Grape",
            Self::Watermelon => "Watermelon",
            Self::Bell => "Bell",
            Self::Seven => "Seven",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-kind rarity and paytable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Which kind this entry describes
    pub kind: SymbolKind,
    /// Display name
    pub name: String,
    /// Relative draw weight (not normalized)
    pub rarity: f64,
    /// Match count → bet multiplier
    #[serde(default)]
    pub payout_multipliers: BTreeMap<u8, f64>,
}

impl SymbolConfig {
    /// Create an entry named after its kind
    pub fn new(kind: SymbolKind, rarity: f64, pays: &[(u8, f64)]) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            rarity,
            payout_multipliers: pays.iter().copied().collect(),
        }
    }

    /// Multiplier for a match count, if the paytable lists one
    pub fn multiplier(&self, match_count: u8) -> Option<f64> {
        if match_count < MIN_MATCH_COUNT {
            return None;
        }
        self.payout_multipliers.get(&match_count).copied()
    }

    fn validate(&self) -> SlotResult<()> {
        let invalid = |reason: String| SlotError::InvalidSymbol {
            kind: self.kind,
            reason,
        };

        if !self.rarity.is_finite() || self.rarity <= 0.0 {
            return Err(invalid(format!("rarity must be positive, got {}", self.rarity)));
        }

        for (&count, &multiplier) in &self.payout_multipliers {
            if count < MIN_MATCH_COUNT {
                return Err(invalid(format!(
                    "match count {} is below the minimum of {}",
                    count, MIN_MATCH_COUNT
                )));
            }
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(invalid(format!(
                    "multiplier for {} of a kind must be >= 0, got {}",
                    count, multiplier
                )));
            }
        }

        // Anything that pays at all has to pay from three upward
        if !self.payout_multipliers.is_empty()
            && !self.payout_multipliers.contains_key(&MIN_MATCH_COUNT)
        {
            return Err(invalid("missing 3-of-a-kind multiplier".into()));
        }

        Ok(())
    }
}

/// Immutable symbol table, one entry per kind, in fixed draw order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolCatalog {
    entries: Vec<SymbolConfig>,
}

impl SymbolCatalog {
    /// Build and validate a catalog
    pub fn new(entries: Vec<SymbolConfig>) -> SlotResult<Self> {
        if entries.is_empty() {
            return Err(SlotError::EmptyCatalog("symbols"));
        }

        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if entries[..i].iter().any(|e| e.kind == entry.kind) {
                return Err(SlotError::InvalidSymbol {
                    kind: entry.kind,
                    reason: "listed more than once".into(),
                });
            }
        }

        let catalog = Self { entries };
        let total = catalog.total_rarity();
        if !total.is_finite() {
            return Err(SlotError::InvalidConfig(format!(
                "total symbol rarity must be finite, got {}",
                total
            )));
        }
        Ok(catalog)
    }

    /// The eight fruit symbols
    ///
    /// Common fruit pay little, the bell and seven are rare and pay big.
    pub fn standard() -> Self {
        Self {
            entries: standard_symbols(),
        }
    }

    pub fn get(&self, kind: SymbolKind) -> Option<&SymbolConfig> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Entry at a draw-order index
    pub fn at(&self, index: usize) -> Option<&SymbolConfig> {
        self.entries.get(index)
    }

    /// Multiplier for `kind` at `match_count`; `None` if it doesn't pay
    pub fn multiplier(&self, kind: SymbolKind, match_count: u8) -> Option<f64> {
        self.get(kind).and_then(|e| e.multiplier(match_count))
    }

    pub fn entries(&self) -> &[SymbolConfig] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolConfig> {
        self.entries.iter()
    }

    pub fn kinds(&self) -> Vec<SymbolKind> {
        self.entries.iter().map(|e| e.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all rarity weights
    pub fn total_rarity(&self) -> f64 {
        self.entries.iter().map(|e| e.rarity).sum()
    }

    /// Expected draw probability of a kind (`rarity / Σrarity`)
    pub fn probability(&self, kind: SymbolKind) -> f64 {
        let total = self.total_rarity();
        match self.get(kind) {
            Some(entry) if total > 0.0 => entry.rarity / total,
            _ => 0.0,
        }
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Default symbol table entries
pub fn standard_symbols() -> Vec<SymbolConfig> {
    vec![
        SymbolConfig::new(SymbolKind::Cherry, 25.0, &[(3, 1.0), (4, 2.0), (5, 4.0)]),
        SymbolConfig::new(SymbolKind::Lemon, 20.0, &[(3, 1.5), (4, 3.0), (5, 6.0)]),
        SymbolConfig::new(SymbolKind::Orange, 18.0, &[(3, 2.0), (4, 4.0), (5, 8.0)]),
        SymbolConfig::new(SymbolKind::Plum, 14.0, &[(3, 2.5), (4, 5.0), (5, 10.0)]),
        SymbolConfig::new(SymbolKind::Grape, 10.0, &[(3, 3.0), (4, 6.0), (5, 12.0)]),
        SymbolConfig::new(SymbolKind::Watermelon, 7.0, &[(3, 5.0), (4, 10.0), (5, 20.0)]),
        SymbolConfig::new(SymbolKind::Bell, 4.0, &[(3, 8.0), (4, 20.0), (5, 40.0)]),
        SymbolConfig::new(SymbolKind::Seven, 2.0, &[(3, 20.0), (4, 50.0), (5, 100.0)]),
    ]
}
