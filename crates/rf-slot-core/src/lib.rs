//! # rf-slot-core — Spin resolution for a five-reel payline slot
//!
//! Everything needed to turn a spin into a list of wins: the symbol table,
//! the symbol generator that fills the grid, the payline catalog and the
//! evaluator that scores paylines and removes overlapping wins.
//!
//! ## Architecture
//!
//! ```text
//! SymbolCatalog ──► SymbolGenerator ──► SymbolGrid
//!       │                                   │
//!       └──────► WinEvaluator ◄── PaylineCatalog
//!                     │
//!                     v
//!           SpinResult { wins, total_win }
//! ```
//!
//! Catalogs are validated once when they are built; a malformed table is a
//! [`SlotError`] at startup, never a failure mid-game.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod grid;
pub mod paylines;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use evaluator::*;
pub use generator::*;
pub use grid::*;
pub use paylines::*;
pub use symbols::*;
pub use timing::*;
