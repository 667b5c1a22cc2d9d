//! Symbol generator — weighted-random or cyclic draws

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::symbols::{SymbolCatalog, SymbolKind};

/// How the next symbol is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Draw proportionally to rarity
    #[default]
    Weighted,
    /// Walk the catalog in order, wrapping around
    Cyclic,
}

/// Produces symbols one at a time for the reel fill
///
/// All state (draw counter, RNG, logging toggle) lives on the instance, so
/// independent generators can run side by side.
#[derive(Debug, Clone)]
pub struct SymbolGenerator {
    catalog: SymbolCatalog,
    mode: GenerationMode,
    rng: StdRng,
    counter: u64,
    draw_logging: bool,
}

impl SymbolGenerator {
    /// Weighted generator seeded from the OS
    pub fn new(catalog: SymbolCatalog) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    /// Weighted generator with a fixed seed
    pub fn with_seed(catalog: SymbolCatalog, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: SymbolCatalog, rng: StdRng) -> Self {
        Self {
            catalog,
            mode: GenerationMode::Weighted,
            rng,
            counter: 0,
            draw_logging: false,
        }
    }

    /// Draw the next symbol
    pub fn draw(&mut self) -> SymbolKind {
        let kind = match self.mode {
            GenerationMode::Weighted => self.draw_weighted(),
            GenerationMode::Cyclic => self.draw_cyclic(),
        };

        if self.draw_logging {
            log::trace!("[SymbolGenerator] {:?} draw -> {}", self.mode, kind);
        }
        kind
    }

    fn draw_weighted(&mut self) -> SymbolKind {
        let total = self.catalog.total_rarity();
        let mut remaining = self.rng.random::<f64>() * total;

        for entry in self.catalog.iter() {
            remaining -= entry.rarity;
            if remaining <= 0.0 {
                return entry.kind;
            }
        }

        // Only reachable through float drift on the last subtraction
        log::warn!(
            "[SymbolGenerator] weighted draw fell through (remainder {}), using first symbol",
            remaining
        );
        self.first_kind()
    }

    fn draw_cyclic(&mut self) -> SymbolKind {
        let len = self.catalog.len().max(1) as u64;
        let index = (self.counter % len) as usize;
        self.counter = self.counter.wrapping_add(1);
        self.catalog
            .at(index)
            .map(|e| e.kind)
            .unwrap_or_else(|| self.first_kind())
    }

    fn first_kind(&self) -> SymbolKind {
        self.catalog
            .at(0)
            .map(|e| e.kind)
            .unwrap_or(SymbolKind::Cherry)
    }

    /// Switch policy; switching to deterministic restarts the cycle
    pub fn set_mode(&mut self, deterministic: bool) {
        if deterministic {
            self.mode = GenerationMode::Cyclic;
            self.counter = 0;
        } else {
            self.mode = GenerationMode::Weighted;
        }
        log::debug!("[SymbolGenerator] mode set to {:?}", self.mode);
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn is_deterministic(&self) -> bool {
        self.mode == GenerationMode::Cyclic
    }

    /// Restart the cyclic sequence at the first catalog entry
    pub fn reset_counter(&mut self) {
        self.counter = 0;
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Reseed the weighted RNG
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Log every draw at trace level
    pub fn set_draw_logging(&mut self, enabled: bool) {
        self.draw_logging = enabled;
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }
}

/// Endless stream of draws
impl Iterator for SymbolGenerator {
    type Item = SymbolKind;

    fn next(&mut self) -> Option<SymbolKind> {
        Some(self.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolConfig;

    #[test]
    fn test_weighted_draw_fidelity() {
        const DRAWS: usize = 100_000;
        let catalog = SymbolCatalog::standard();
        let mut generator = SymbolGenerator::with_seed(catalog.clone(), 0xC0FFEE);

        let mut counts = [0usize; SymbolKind::ALL.len()];
        for _ in 0..DRAWS {
            counts[generator.draw() as usize] += 1;
        }

        for kind in catalog.kinds() {
            let observed = counts[kind as usize] as f64 / DRAWS as f64;
            let expected = catalog.probability(kind);
            assert!(
                (observed - expected).abs() < 0.02,
                "{}: observed {:.4}, expected {:.4}",
                kind,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_cyclic_sequence() {
        let catalog = SymbolCatalog::standard();
        let mut generator = SymbolGenerator::with_seed(catalog.clone(), 1);
        generator.set_mode(true);

        let kinds = catalog.kinds();
        let drawn: Vec<SymbolKind> = generator.by_ref().take(kinds.len() * 2 + 3).collect();
        for (i, kind) in drawn.iter().enumerate() {
            assert_eq!(*kind, kinds[i % kinds.len()]);
        }
    }

    #[test]
    fn test_switching_to_cyclic_resets_counter() {
        let mut generator = SymbolGenerator::with_seed(SymbolCatalog::standard(), 1);
        generator.set_mode(true);
        generator.draw();
        generator.draw();
        assert_eq!(generator.counter(), 2);

        generator.set_mode(true);
        assert_eq!(generator.counter(), 0);
        assert_eq!(generator.draw(), SymbolKind::Cherry);

        generator.reset_counter();
        assert_eq!(generator.draw(), SymbolKind::Cherry);
        assert_eq!(generator.draw(), SymbolKind::Lemon);
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = SymbolGenerator::with_seed(SymbolCatalog::standard(), 99);
        let mut b = SymbolGenerator::with_seed(SymbolCatalog::standard(), 99);
        for _ in 0..64 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_single_entry_catalog_always_draws_it() {
        let catalog =
            SymbolCatalog::new(vec![SymbolConfig::new(SymbolKind::Seven, 0.5, &[(3, 1.0)])])
                .unwrap();
        let mut generator = SymbolGenerator::with_seed(catalog, 3);
        assert!(generator.by_ref().take(100).all(|k| k == SymbolKind::Seven));
        assert!(!generator.is_deterministic());
    }
}
