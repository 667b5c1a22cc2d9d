//! SlotStage — semantic moments of a round, pushed to an injected sink
//!
//! A stage is not an animation and not a state. It is the meaning of a
//! moment in the round, for whoever reacts to it (audio, overlays, logs).

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use rf_slot_core::SymbolKind;

/// Canonical round stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotStage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, bet deducted
    SpinStart {
        bet: f64,
        /// Balance after the deduction
        balance: f64,
    },

    /// Every reel has landed
    ReelsResolved {
        /// Symbols per reel, top to bottom
        reels: Vec<Vec<SymbolKind>>,
    },

    /// Paylines are being scored
    EvaluateWins,

    /// Round over, machine back to idle
    SpinEnd {
        balance: f64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Win presentation starting; balance already credited
    WinPresent {
        win_amount: f64,
        line_count: u8,
    },

    /// One winning line highlighted
    WinLineShow {
        /// Position in the presentation order
        line_index: u8,
        payline_id: u32,
        line_amount: f64,
    },

    /// Highlighted lines removed from the grid
    WinLinesCleared,

    /// Win presentation finished
    CelebrationEnd {
        /// Ended by a skip request rather than running to completion
        #[serde(default)]
        skipped: bool,
    },
}

impl SlotStage {
    /// Stable snake_case name, same as the serde tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart { .. } => "spin_start",
            Self::ReelsResolved { .. } => "reels_resolved",
            Self::EvaluateWins => "evaluate_wins",
            Self::SpinEnd { .. } => "spin_end",
            Self::WinPresent { .. } => "win_present",
            Self::WinLineShow { .. } => "win_line_show",
            Self::WinLinesCleared => "win_lines_cleared",
            Self::CelebrationEnd { .. } => "celebration_end",
        }
    }

    pub fn is_win_stage(&self) -> bool {
        matches!(
            self,
            Self::WinPresent { .. }
                | Self::WinLineShow { .. }
                | Self::WinLinesCleared
                | Self::CelebrationEnd { .. }
        )
    }
}

/// Receiver of round stages
///
/// Called synchronously from the round driver; implementations must not block.
pub trait StageSink: Send + Sync {
    fn emit(&self, stage: SlotStage);
}

/// Drops every stage
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StageSink for NullSink {
    fn emit(&self, _stage: SlotStage) {}
}

/// Logs every stage at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StageSink for LogSink {
    fn emit(&self, stage: SlotStage) {
        log::debug!("[Stage] {:?}", stage);
    }
}

/// Keeps every stage in order, for tests and trace export
#[derive(Debug, Default)]
pub struct RecordingSink {
    stages: Mutex<Vec<SlotStage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<SlotStage> {
        self.stages.lock().clone()
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.stages.lock().iter().map(SlotStage::type_name).collect()
    }

    /// Drain recorded stages
    pub fn take(&self) -> Vec<SlotStage> {
        std::mem::take(&mut *self.stages.lock())
    }

    pub fn len(&self) -> usize {
        self.stages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.lock().is_empty()
    }

    /// Export recorded stages as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.stages.lock())
    }
}

impl StageSink for RecordingSink {
    fn emit(&self, stage: SlotStage) {
        self.stages.lock().push(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tag_matches_type_name() {
        let stages = vec![
            SlotStage::SpinStart {
                bet: 10.0,
                balance: 990.0,
            },
            SlotStage::EvaluateWins,
            SlotStage::WinLineShow {
                line_index: 0,
                payline_id: 4,
                line_amount: 80.0,
            },
            SlotStage::CelebrationEnd { skipped: true },
        ];

        for stage in stages {
            let value = serde_json::to_value(&stage).unwrap();
            assert_eq!(value["type"], stage.type_name());
            let back: SlotStage = serde_json::from_value(value).unwrap();
            assert_eq!(back, stage);
        }
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.emit(SlotStage::EvaluateWins);
        sink.emit(SlotStage::WinLinesCleared);
        assert_eq!(sink.type_names(), vec!["evaluate_wins", "win_lines_cleared"]);
        assert!(sink.to_json().unwrap().contains("win_lines_cleared"));

        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_win_stage_category() {
        assert!(SlotStage::WinLinesCleared.is_win_stage());
        assert!(!SlotStage::EvaluateWins.is_win_stage());
    }
}
