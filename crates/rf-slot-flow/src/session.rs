//! SlotSession — plays complete rounds
//!
//! Owns the generator, evaluator and both state machines and runs
//! SPIN → grid → SPIN_COMPLETE → animate wins → WIN_CELEBRATION_COMPLETE,
//! emitting a [`SlotStage`] at each step.

use std::sync::Arc;

use serde::Serialize;

use rf_slot_core::{
    GridSpec, SlotConfig, SpinResult, SymbolGenerator, SymbolGrid, WinEvaluator, WinResult,
};

use crate::FlowResult;
use crate::animation::{AnimationOutcome, PaylineAnimator, WinDisplayCallback};
use crate::game::{GameEvent, GameMachine, GameState};
use crate::stage::{NullSink, SlotStage, StageSink};

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub skipped_presentations: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    fn record(&mut self, result: &SpinResult, outcome: AnimationOutcome) {
        self.total_spins += 1;
        self.total_bet += result.bet;
        self.total_win += result.total_win;
        if result.has_wins() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        if outcome.is_skipped() {
            self.skipped_presentations += 1;
        }
        self.max_win_ratio = self.max_win_ratio.max(result.win_ratio());
    }

    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// One played round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// 1-based round number within the session
    pub round: u64,
    pub bet: f64,
    pub grid: SymbolGrid,
    pub wins: Vec<WinResult>,
    pub total_win: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    #[serde(skip)]
    pub presentation: AnimationOutcome,
}

impl RoundReport {
    pub fn is_win(&self) -> bool {
        !self.wins.is_empty() && self.total_win > 0.0
    }

    pub fn was_skipped(&self) -> bool {
        self.presentation.is_skipped()
    }
}

/// Headless driver for complete rounds
pub struct SlotSession {
    generator: SymbolGenerator,
    evaluator: WinEvaluator,
    machine: GameMachine,
    animator: PaylineAnimator,
    sink: Arc<dyn StageSink>,
    /// Display callback the animator carried before the session wrapped it
    display: Option<WinDisplayCallback>,
    stats: SessionStats,
    grid_spec: GridSpec,
}

impl SlotSession {
    /// Session over a validated config, generator seeded from the OS
    pub fn new(config: &SlotConfig) -> FlowResult<Self> {
        let generator = SymbolGenerator::new(config.symbol_catalog()?);
        Self::build(config, generator)
    }

    /// Reproducible session
    pub fn with_seed(config: &SlotConfig, seed: u64) -> FlowResult<Self> {
        let generator = SymbolGenerator::with_seed(config.symbol_catalog()?, seed);
        Self::build(config, generator)
    }

    fn build(config: &SlotConfig, generator: SymbolGenerator) -> FlowResult<Self> {
        let machine = GameMachine::from_config(config)?;
        let animator = PaylineAnimator::with_speed(config.timing.clone(), config.speed())?;
        let session = Self::from_parts(generator, config.evaluator()?, machine, animator);
        log::info!(
            "[SlotSession] '{}' ready: {} paylines, {:?} timing",
            config.name,
            session.evaluator.paylines().len(),
            config.timing_profile
        );
        Ok(session)
    }

    /// Assemble from prebuilt parts
    ///
    /// A display callback already registered on `animator` keeps receiving
    /// frames; the session forwards them to its stage sink as well.
    pub fn from_parts(
        generator: SymbolGenerator,
        evaluator: WinEvaluator,
        machine: GameMachine,
        animator: PaylineAnimator,
    ) -> Self {
        let grid_spec = evaluator.paylines().spec();
        let display = animator.win_display();
        let mut session = Self {
            generator,
            evaluator,
            machine,
            animator,
            sink: Arc::new(NullSink),
            display,
            stats: SessionStats::default(),
            grid_spec,
        };
        session.install_display();
        session
    }

    /// Route stages to `sink` instead of dropping them
    pub fn with_sink(mut self, sink: Arc<dyn StageSink>) -> Self {
        self.sink = sink;
        self.install_display();
        self
    }

    fn install_display(&self) {
        let sink = Arc::clone(&self.sink);
        let inner = self.display.clone();
        self.animator.on_win_display(move |wins, index| {
            if let Some(inner) = &inner {
                inner(wins, index);
            }
            match (wins, index) {
                ([], _) => sink.emit(SlotStage::WinLinesCleared),
                ([win], Some(index)) => sink.emit(SlotStage::WinLineShow {
                    line_index: index.min(u8::MAX as usize) as u8,
                    payline_id: win.payline_id,
                    line_amount: win.win_amount,
                }),
                _ => {}
            }
        });
    }

    /// Generate a grid and play it
    ///
    /// Returns `None` when the machine rejects the spin.
    pub async fn play_round(&mut self) -> Option<RoundReport> {
        if !self.machine.can_spin() {
            log::debug!("[SlotSession] spin not possible, skipping grid generation");
            return None;
        }
        let grid = SymbolGrid::generate(&mut self.generator, self.grid_spec);
        self.play_grid(grid).await
    }

    /// Play a round on an externally resolved grid
    pub async fn play_grid(&mut self, grid: SymbolGrid) -> Option<RoundReport> {
        let balance_before = self.machine.balance();
        let bet = self.machine.current_bet();

        if self.machine.send(GameEvent::Spin) != GameState::Spinning {
            log::debug!("[SlotSession] spin rejected at balance {}", balance_before);
            return None;
        }
        self.sink.emit(SlotStage::SpinStart {
            bet,
            balance: self.machine.balance(),
        });
        self.sink.emit(SlotStage::ReelsResolved {
            reels: grid.reels().to_vec(),
        });

        self.sink.emit(SlotStage::EvaluateWins);
        let result = self.evaluator.evaluate_spin(grid, bet);
        let state = self.machine.send(GameEvent::SpinComplete(result.clone()));

        let presentation = if state == GameState::Celebrating {
            self.sink.emit(SlotStage::WinPresent {
                win_amount: result.total_win,
                line_count: result.wins.len().min(u8::MAX as usize) as u8,
            });
            let outcome = self.animator.set_wins_and_animate(result.wins.clone()).await;
            self.sink.emit(SlotStage::CelebrationEnd {
                skipped: outcome.is_skipped(),
            });
            // No-op if the celebration timeout already fired
            self.machine.send(GameEvent::WinCelebrationComplete);
            outcome
        } else {
            AnimationOutcome::NoWins
        };

        let balance_after = self.machine.balance();
        self.sink.emit(SlotStage::SpinEnd {
            balance: balance_after,
        });
        self.stats.record(&result, presentation);

        let report = RoundReport {
            round: self.stats.total_spins,
            bet,
            grid: result.grid,
            wins: result.wins,
            total_win: result.total_win,
            balance_before,
            balance_after,
            presentation,
        };
        log::debug!(
            "[SlotSession] round {} bet {} won {} balance {}",
            report.round,
            report.bet,
            report.total_win,
            report.balance_after
        );
        Some(report)
    }

    /// Play up to `rounds` rounds, stopping early when a spin is rejected
    pub async fn play_rounds(&mut self, rounds: u64) -> Vec<RoundReport> {
        let mut reports = Vec::new();
        for _ in 0..rounds {
            match self.play_round().await {
                Some(report) => reports.push(report),
                None => {
                    log::info!("[SlotSession] stopped after {} rounds", reports.len());
                    break;
                }
            }
        }
        reports
    }

    pub fn machine(&self) -> &GameMachine {
        &self.machine
    }

    /// Clone of the animator handle, for skipping from another task
    pub fn animator(&self) -> PaylineAnimator {
        self.animator.clone()
    }

    pub fn evaluator(&self) -> &WinEvaluator {
        &self.evaluator
    }

    pub fn generator_mut(&mut self) -> &mut SymbolGenerator {
        &mut self.generator
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }
}
