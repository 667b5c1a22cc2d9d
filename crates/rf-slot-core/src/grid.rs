//! Grid geometry and resolved symbol grids

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::generator::SymbolGenerator;
use crate::symbols::SymbolKind;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    pub fn new(reels: u8, rows: u8) -> Self {
        Self { reels, rows }
    }

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { reels: 5, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }

    /// Whether a position lies inside this grid
    pub fn contains(&self, position: GridPosition) -> bool {
        position.reel < self.reels && position.row < self.rows
    }

    pub fn validate(&self) -> SlotResult<()> {
        if self.reels == 0 || self.rows == 0 {
            return Err(SlotError::InvalidGrid(format!(
                "grid must have at least one reel and one row, got {}x{}",
                self.reels, self.rows
            )));
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// A cell on the grid, `(reel, row)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub reel: u8,
    pub row: u8,
}

impl GridPosition {
    pub const fn new(reel: u8, row: u8) -> Self {
        Self { reel, row }
    }
}

/// A fully resolved spin, indexed `[reel][row]`
///
/// Handed to the evaluator once per spin and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct SymbolGrid {
    reels: Vec<Vec<SymbolKind>>,
}

/// Wire shape of [`SymbolGrid`]; deserialization goes through [`SymbolGrid::new`]
#[derive(Deserialize)]
struct GridRepr {
    reels: Vec<Vec<SymbolKind>>,
}

impl TryFrom<GridRepr> for SymbolGrid {
    type Error = SlotError;

    fn try_from(repr: GridRepr) -> SlotResult<Self> {
        Self::new(repr.reels)
    }
}

impl SymbolGrid {
    /// Build from reel columns (top to bottom per reel)
    pub fn new(reels: Vec<Vec<SymbolKind>>) -> SlotResult<Self> {
        let rows = reels.first().map(Vec::len).unwrap_or(0);
        if rows == 0 {
            return Err(SlotError::InvalidGrid("grid has no cells".into()));
        }
        if reels.len() > u8::MAX as usize || rows > u8::MAX as usize {
            return Err(SlotError::InvalidGrid(format!(
                "grid too large: {}x{}",
                reels.len(),
                rows
            )));
        }
        if let Some(bad) = reels.iter().position(|reel| reel.len() != rows) {
            return Err(SlotError::InvalidGrid(format!(
                "reel {} has {} rows, expected {}",
                bad,
                reels[bad].len(),
                rows
            )));
        }
        Ok(Self { reels })
    }

    /// Build from visual rows (left to right per row), as a grid reads on screen
    pub fn from_rows(rows: &[Vec<SymbolKind>]) -> SlotResult<Self> {
        let reel_count = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|row| row.len() != reel_count) {
            return Err(SlotError::InvalidGrid(format!(
                "row {} has {} symbols, expected {}",
                bad,
                rows[bad].len(),
                reel_count
            )));
        }
        let reels = (0..reel_count)
            .map(|reel| rows.iter().map(|row| row[reel]).collect())
            .collect();
        Self::new(reels)
    }

    /// Fill a grid reel by reel, one draw per cell
    pub fn generate(generator: &mut SymbolGenerator, spec: GridSpec) -> Self {
        let reels = (0..spec.reels)
            .map(|_| (0..spec.rows).map(|_| generator.draw()).collect())
            .collect();
        Self { reels }
    }

    pub fn get(&self, position: GridPosition) -> Option<SymbolKind> {
        self.reels
            .get(position.reel as usize)
            .and_then(|reel| reel.get(position.row as usize))
            .copied()
    }

    /// Symbols on one reel, top to bottom
    pub fn reel(&self, index: usize) -> Option<&[SymbolKind]> {
        self.reels.get(index).map(Vec::as_slice)
    }

    pub fn reels(&self) -> &[Vec<SymbolKind>] {
        &self.reels
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn row_count(&self) -> usize {
        self.reels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn spec(&self) -> GridSpec {
        GridSpec::new(self.reel_count() as u8, self.row_count() as u8)
    }
}
