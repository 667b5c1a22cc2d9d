//! Payline definitions and the validated payline catalog

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::grid::{GridPosition, GridSpec};

/// A fixed path visiting every reel once, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylineDefinition {
    /// Stable, unique id
    pub id: u32,
    /// Display name
    pub name: String,
    /// One position per reel, in reel order
    pub positions: Vec<GridPosition>,
}

impl PaylineDefinition {
    /// Build from one row index per reel (e.g. `[0, 1, 2, 1, 0]` for a V)
    pub fn from_rows(id: u32, name: impl Into<String>, rows: &[u8]) -> Self {
        Self {
            id,
            name: name.into(),
            positions: rows
                .iter()
                .enumerate()
                .map(|(reel, &row)| GridPosition::new(reel as u8, row))
                .collect(),
        }
    }

    /// Straight line along one row
    pub fn straight(id: u32, name: impl Into<String>, row: u8, reel_count: u8) -> Self {
        Self::from_rows(id, name, &vec![row; reel_count as usize])
    }

    /// Row index per reel
    pub fn rows(&self) -> Vec<u8> {
        self.positions.iter().map(|p| p.row).collect()
    }

    /// Check geometry against a grid
    pub fn validate(&self, spec: GridSpec) -> SlotResult<()> {
        let invalid = |reason: String| SlotError::InvalidPayline {
            id: self.id,
            reason,
        };

        if self.positions.len() != spec.reels as usize {
            return Err(invalid(format!(
                "expected {} positions, got {}",
                spec.reels,
                self.positions.len()
            )));
        }

        for (index, position) in self.positions.iter().enumerate() {
            if position.reel as usize != index {
                return Err(invalid(format!(
                    "position {} is on reel {}, expected reel {}",
                    index, position.reel, index
                )));
            }
            if !spec.contains(*position) {
                return Err(invalid(format!(
                    "position ({}, {}) is outside the {}x{} grid",
                    position.reel, position.row, spec.reels, spec.rows
                )));
            }
        }

        Ok(())
    }
}

/// Validated set of paylines for one grid geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaylineCatalog {
    spec: GridSpec,
    paylines: Vec<PaylineDefinition>,
}

impl PaylineCatalog {
    /// Validate every payline once, at load time
    pub fn new(paylines: Vec<PaylineDefinition>, spec: GridSpec) -> SlotResult<Self> {
        spec.validate()?;
        if paylines.is_empty() {
            return Err(SlotError::EmptyCatalog("paylines"));
        }

        for (i, payline) in paylines.iter().enumerate() {
            payline.validate(spec)?;
            if paylines[..i].iter().any(|p| p.id == payline.id) {
                return Err(SlotError::DuplicatePayline(payline.id));
            }
        }

        log::debug!(
            "[PaylineCatalog] loaded {} paylines for {}x{}",
            paylines.len(),
            spec.reels,
            spec.rows
        );
        Ok(Self { spec, paylines })
    }

    /// The 25-line catalog for a 5×3 grid
    pub fn standard() -> Self {
        Self {
            spec: GridSpec::standard_5x3(),
            paylines: standard_25_paylines(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&PaylineDefinition> {
        self.paylines.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaylineDefinition> {
        self.paylines.iter()
    }

    pub fn paylines(&self) -> &[PaylineDefinition] {
        &self.paylines
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn len(&self) -> usize {
        self.paylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paylines.is_empty()
    }
}

impl Default for PaylineCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Standard payline patterns for a 5×3 grid
pub fn standard_25_paylines() -> Vec<PaylineDefinition> {
    let line = PaylineDefinition::from_rows;
    vec![
        // Straight lines
        PaylineDefinition::straight(1, "Middle", 1, 5),
        PaylineDefinition::straight(2, "Top", 0, 5),
        PaylineDefinition::straight(3, "Bottom", 2, 5),
        // V shapes
        line(4, "V", &[0, 1, 2, 1, 0]),
        line(5, "Inverted V", &[2, 1, 0, 1, 2]),
        // Zigzag
        line(6, "Step Down", &[0, 0, 1, 2, 2]),
        line(7, "Step Up", &[2, 2, 1, 0, 0]),
        line(8, "Upper U", &[1, 0, 0, 0, 1]),
        line(9, "Lower U", &[1, 2, 2, 2, 1]),
        // W shapes
        line(10, "Upper W", &[0, 1, 0, 1, 0]),
        line(11, "Lower W", &[2, 1, 2, 1, 2]),
        // Shallow arcs
        line(12, "Upper Arc", &[0, 1, 1, 1, 0]),
        line(13, "Lower Arc", &[2, 1, 1, 1, 2]),
        // Bumps
        line(14, "Middle Peak", &[1, 1, 0, 1, 1]),
        line(15, "Middle Dip", &[1, 1, 2, 1, 1]),
        // Complex
        line(16, "Upper Zigzag", &[0, 2, 0, 2, 0]),
        line(17, "Lower Zigzag", &[2, 0, 2, 0, 2]),
        line(18, "Upper Saw", &[1, 0, 1, 0, 1]),
        line(19, "Lower Saw", &[1, 2, 1, 2, 1]),
        line(20, "Top Drop", &[0, 0, 2, 0, 0]),
        line(21, "Bottom Jump", &[2, 2, 0, 2, 2]),
        line(22, "Top Notch", &[0, 0, 1, 0, 0]),
        line(23, "Bottom Notch", &[2, 2, 1, 2, 2]),
        line(24, "Wave", &[1, 0, 1, 2, 1]),
        line(25, "Inverted Wave", &[1, 2, 1, 0, 1]),
    ]
}
