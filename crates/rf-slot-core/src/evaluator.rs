//! Win evaluation and overlap removal

use serde::{Deserialize, Serialize};

use crate::grid::{GridPosition, SymbolGrid};
use crate::paylines::{PaylineCatalog, PaylineDefinition};
use crate::symbols::{MIN_MATCH_COUNT, SymbolCatalog, SymbolKind};

/// A win on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinResult {
    /// Payline id
    pub payline_id: u32,
    /// Matched symbols (length = match count)
    pub symbols: Vec<SymbolKind>,
    /// Paytable multiplier
    pub multiplier: f64,
    /// `multiplier × bet`
    pub win_amount: f64,
    /// Winning prefix of the payline (length = match count)
    pub positions: Vec<GridPosition>,
}

impl WinResult {
    pub fn match_count(&self) -> usize {
        self.symbols.len()
    }

    /// The symbol that won
    pub fn symbol(&self) -> Option<SymbolKind> {
        self.symbols.first().copied()
    }

    /// Every cell of `self` also appears in `other`
    pub fn is_subset_of(&self, other: &WinResult) -> bool {
        self.positions.iter().all(|p| other.positions.contains(p))
    }
}

/// Resolved grid plus the wins found on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub grid: SymbolGrid,
    pub bet: f64,
    pub wins: Vec<WinResult>,
    pub total_win: f64,
}

impl SpinResult {
    /// Losing spin with no wins
    pub fn losing(grid: SymbolGrid, bet: f64) -> Self {
        Self {
            grid,
            bet,
            wins: Vec::new(),
            total_win: 0.0,
        }
    }

    pub fn has_wins(&self) -> bool {
        !self.wins.is_empty() && self.total_win > 0.0
    }

    /// Win-to-bet ratio
    pub fn win_ratio(&self) -> f64 {
        if self.bet > 0.0 {
            self.total_win / self.bet
        } else {
            0.0
        }
    }
}

/// Evaluates paylines against a symbol grid
#[derive(Debug, Clone)]
pub struct WinEvaluator {
    symbols: SymbolCatalog,
    paylines: PaylineCatalog,
}

impl WinEvaluator {
    /// Both catalogs are already validated by their constructors
    pub fn new(symbols: SymbolCatalog, paylines: PaylineCatalog) -> Self {
        Self { symbols, paylines }
    }

    /// Standard symbols on the 25-line 5×3 catalog
    pub fn standard() -> Self {
        Self::new(SymbolCatalog::standard(), PaylineCatalog::standard())
    }

    pub fn symbols(&self) -> &SymbolCatalog {
        &self.symbols
    }

    pub fn paylines(&self) -> &PaylineCatalog {
        &self.paylines
    }

    /// Evaluate every payline, then drop wins dominated by larger ones
    pub fn evaluate(&self, grid: &SymbolGrid, bet: f64) -> Vec<WinResult> {
        if grid.spec() != self.paylines.spec() {
            log::error!(
                "[WinEvaluator] grid is {}x{} but paylines expect {}x{}",
                grid.reel_count(),
                grid.row_count(),
                self.paylines.spec().reels,
                self.paylines.spec().rows
            );
            return Vec::new();
        }

        let candidates: Vec<WinResult> = self
            .paylines
            .iter()
            .filter_map(|payline| self.evaluate_line(payline, grid, bet))
            .collect();

        let candidate_count = candidates.len();
        let wins = remove_overlapping(candidates);

        for win in &wins {
            debug_assert!(
                self.validate(win, grid),
                "evaluator produced a win that does not match its grid: {:?}",
                win
            );
        }

        log::debug!(
            "[WinEvaluator] {} candidate wins, {} after overlap removal, total {}",
            candidate_count,
            wins.len(),
            total_win(&wins)
        );
        wins
    }

    /// Evaluate and bundle with the grid
    pub fn evaluate_spin(&self, grid: SymbolGrid, bet: f64) -> SpinResult {
        let wins = self.evaluate(&grid, bet);
        let total_win = total_win(&wins);
        SpinResult {
            grid,
            bet,
            wins,
            total_win,
        }
    }

    /// Evaluate one payline on its own, without overlap removal
    pub fn evaluate_single(&self, payline_id: u32, grid: &SymbolGrid, bet: f64) -> Option<WinResult> {
        let payline = self.paylines.get(payline_id)?;
        self.evaluate_line(payline, grid, bet)
    }

    fn evaluate_line(
        &self,
        payline: &PaylineDefinition,
        grid: &SymbolGrid,
        bet: f64,
    ) -> Option<WinResult> {
        let line_symbols: Vec<SymbolKind> = payline
            .positions
            .iter()
            .map(|&p| grid.get(p))
            .collect::<Option<_>>()?;

        let first = *line_symbols.first()?;

        // Left-anchored and contiguous: the first mismatch ends the run
        let match_count = line_symbols.iter().take_while(|&&s| s == first).count();
        if match_count < MIN_MATCH_COUNT as usize {
            return None;
        }

        let multiplier = self.symbols.multiplier(first, match_count as u8)?;
        if multiplier <= 0.0 {
            return None;
        }

        Some(WinResult {
            payline_id: payline.id,
            symbols: line_symbols[..match_count].to_vec(),
            multiplier,
            win_amount: multiplier * bet,
            positions: payline.positions[..match_count].to_vec(),
        })
    }

    /// Check that a win really derives from `grid`
    ///
    /// For tests and debug builds; a `false` here is a programming error.
    pub fn validate(&self, win: &WinResult, grid: &SymbolGrid) -> bool {
        let Some(payline) = self.paylines.get(win.payline_id) else {
            return false;
        };
        let Some(symbol) = win.symbol() else {
            return false;
        };

        let count = win.match_count();
        if count < MIN_MATCH_COUNT as usize
            || win.positions.len() != count
            || !payline.positions.starts_with(&win.positions)
        {
            return false;
        }

        let cells_match = win
            .positions
            .iter()
            .zip(&win.symbols)
            .all(|(&p, &s)| s == symbol && grid.get(p) == Some(s));

        cells_match && self.symbols.multiplier(symbol, count as u8) == Some(win.multiplier)
    }

    /// See [`SpinResult::has_wins`]
    pub fn has_wins(result: &SpinResult) -> bool {
        result.has_wins()
    }
}

impl Default for WinEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sum of win amounts
pub fn total_win(wins: &[WinResult]) -> f64 {
    wins.iter().map(|w| w.win_amount).sum()
}

/// Largest single win (first one on ties)
pub fn highest_win(wins: &[WinResult]) -> Option<&WinResult> {
    wins.iter().reduce(|best, w| {
        if w.win_amount > best.win_amount {
            w
        } else {
            best
        }
    })
}

/// Drop wins whose cells are covered by a bigger win
///
/// Candidates are visited by descending amount (stable, so equal amounts keep
/// payline order). A candidate contained in a kept win is discarded; a
/// candidate containing kept wins replaces them; otherwise both stay.
pub fn remove_overlapping(mut candidates: Vec<WinResult>) -> Vec<WinResult> {
    candidates.sort_by(|a, b| b.win_amount.total_cmp(&a.win_amount));

    let mut kept: Vec<WinResult> = Vec::with_capacity(candidates.len());
    for win in candidates {
        if let Some(cover) = kept.iter().find(|k| win.is_subset_of(k)) {
            log::trace!(
                "[WinEvaluator] payline {} covered by payline {}",
                win.payline_id,
                cover.payline_id
            );
            continue;
        }
        kept.retain(|k| !k.is_subset_of(&win));
        kept.push(win);
    }
    kept
}
