//! Payline animation state machine
//!
//! Sequences the reveal of already-evaluated wins:
//!
//! ```text
//! idle ─► evaluation_complete ─┬─ 0 wins ──────────────────────────────► idle
//!                              ├─ 1 win ─► single_win_animation ───┐
//!                              └─ N wins ► showing_all_wins        │
//!                                              │                   v
//!                                  animating_individual_wins ─► complete ─► idle
//! ```
//!
//! A skip request cuts every pending wait short and ends the cycle through
//! `on_skipped` instead of `on_end`. Exactly one of the two fires per
//! non-empty sequence.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use rf_slot_core::{AnimationTiming, WinResult};

use crate::delay::{DelayOutcome, SkipSignal, skippable_delay};
use crate::{FlowError, FlowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    #[default]
    Idle,
    /// Transient dispatch on the number of wins
    EvaluationComplete,
    SingleWinAnimation,
    /// Every win drawn at once, statically
    ShowingAllWins,
    AnimatingIndividualWins,
    /// Transient; always falls through to `Idle`
    Complete,
}

/// How a call to [`PaylineAnimator::set_wins_and_animate`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// Empty win list; display cleared, no callbacks
    NoWins,
    /// Every win shown; `on_end` fired
    Completed,
    /// Cut short by a skip; `on_skipped` fired
    Skipped,
    /// Another sequence was running; nothing happened
    AlreadyAnimating,
}

impl AnimationOutcome {
    pub fn is_skipped(self) -> bool {
        self == Self::Skipped
    }
}

/// Animation state owned by the animator
#[derive(Debug, Clone, PartialEq)]
pub struct PaylineAnimationContext {
    pub win_results: Vec<WinResult>,
    pub current_win_index: usize,
    pub is_animating: bool,
    pub skip_requested: bool,
    /// Divides every duration; 3.0 for instant play
    pub animation_speed_multiplier: f64,
}

impl PaylineAnimationContext {
    /// Back to rest, keeping the speed
    fn reset(&mut self) {
        self.win_results.clear();
        self.current_win_index = 0;
        self.is_animating = false;
        self.skip_requested = false;
    }
}

impl Default for PaylineAnimationContext {
    fn default() -> Self {
        Self {
            win_results: Vec::new(),
            current_win_index: 0,
            is_animating: false,
            skip_requested: false,
            animation_speed_multiplier: 1.0,
        }
    }
}

pub type AnimationCallback = Arc<dyn Fn() + Send + Sync>;

/// Receives what should be on screen: the wins to draw and, when a single
/// line is highlighted, its index. An empty slice clears the display.
pub type WinDisplayCallback = Arc<dyn Fn(&[WinResult], Option<usize>) + Send + Sync>;

/// Lifecycle callbacks
#[derive(Clone, Default)]
pub struct AnimationCallbacks {
    pub on_start: Option<AnimationCallback>,
    pub on_end: Option<AnimationCallback>,
    pub on_skipped: Option<AnimationCallback>,
}

impl AnimationCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(f));
        self
    }

    pub fn on_skipped(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_skipped = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for AnimationCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_skipped", &self.on_skipped.is_some())
            .finish()
    }
}

fn fire(callback: &Option<AnimationCallback>) {
    if let Some(callback) = callback {
        callback();
    }
}

fn show(display: &Option<WinDisplayCallback>, wins: &[WinResult], index: Option<usize>) {
    if let Some(display) = display {
        display(wins, index);
    }
}

struct AnimatorState {
    phase: AnimationPhase,
    context: PaylineAnimationContext,
    callbacks: AnimationCallbacks,
    display: Option<WinDisplayCallback>,
}

/// Everything a running sequence needs, captured at start
struct Sequence {
    wins: Vec<WinResult>,
    timing: AnimationTiming,
    callbacks: AnimationCallbacks,
    display: Option<WinDisplayCallback>,
}

/// Thread-safe handle to the payline animation machine
///
/// Clones share state, so one task can await
/// [`set_wins_and_animate`](Self::set_wins_and_animate) while another calls
/// [`skip_animation`](Self::skip_animation).
#[derive(Clone)]
pub struct PaylineAnimator {
    state: Arc<Mutex<AnimatorState>>,
    skip: SkipSignal,
    /// Durations at speed 1.0
    timing: AnimationTiming,
}

impl PaylineAnimator {
    pub fn new(timing: AnimationTiming) -> Self {
        Self {
            state: Arc::new(Mutex::new(AnimatorState {
                phase: AnimationPhase::Idle,
                context: PaylineAnimationContext::default(),
                callbacks: AnimationCallbacks::default(),
                display: None,
            })),
            skip: SkipSignal::new(),
            timing,
        }
    }

    /// Animator at an initial speed
    pub fn with_speed(timing: AnimationTiming, speed: f64) -> FlowResult<Self> {
        let animator = Self::new(timing);
        animator.set_speed(speed)?;
        Ok(animator)
    }

    /// Set the speed multiplier; takes effect from the next sequence
    pub fn set_speed(&self, multiplier: f64) -> FlowResult<()> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(FlowError::InvalidSpeed(multiplier));
        }
        self.state.lock().context.animation_speed_multiplier = multiplier;
        log::debug!("[PaylineAnimator] speed set to {}", multiplier);
        Ok(())
    }

    pub fn speed(&self) -> f64 {
        self.state.lock().context.animation_speed_multiplier
    }

    pub fn set_callbacks(&self, callbacks: AnimationCallbacks) {
        self.state.lock().callbacks = callbacks;
    }

    /// Replace the display callback
    pub fn on_win_display(&self, f: impl Fn(&[WinResult], Option<usize>) + Send + Sync + 'static) {
        self.state.lock().display = Some(Arc::new(f));
    }

    /// Currently registered display callback
    pub fn win_display(&self) -> Option<WinDisplayCallback> {
        self.state.lock().display.clone()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.state.lock().phase
    }

    pub fn context(&self) -> PaylineAnimationContext {
        self.state.lock().context.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.state.lock().context.is_animating
    }

    /// Base durations, before speed scaling
    pub fn timing(&self) -> &AnimationTiming {
        &self.timing
    }

    /// Request early termination of the running sequence
    ///
    /// Ignored when nothing is animating.
    pub fn skip_animation(&self) {
        let mut state = self.state.lock();
        match state.phase {
            AnimationPhase::SingleWinAnimation
            | AnimationPhase::ShowingAllWins
            | AnimationPhase::AnimatingIndividualWins => {
                state.context.skip_requested = true;
                self.skip.request();
                log::debug!("[PaylineAnimator] skip requested in {:?}", state.phase);
            }
            phase => {
                log::debug!("[PaylineAnimator] skip ignored in {:?}", phase);
            }
        }
    }

    /// Reveal `wins` and resolve when the sequence is over
    ///
    /// A call made while another sequence runs is a no-op returning
    /// [`AnimationOutcome::AlreadyAnimating`]. Dropping the future mid-sequence
    /// resets the animator without firing `on_end` or `on_skipped`.
    pub async fn set_wins_and_animate(&self, wins: Vec<WinResult>) -> AnimationOutcome {
        let sequence = {
            let mut state = self.state.lock();
            if state.context.is_animating {
                log::debug!(
                    "[PaylineAnimator] already animating, ignoring {} wins",
                    wins.len()
                );
                return AnimationOutcome::AlreadyAnimating;
            }

            state.phase = AnimationPhase::EvaluationComplete;
            if wins.is_empty() {
                state.context.reset();
                state.phase = AnimationPhase::Idle;
                let display = state.display.clone();
                drop(state);
                show(&display, &[], None);
                return AnimationOutcome::NoWins;
            }

            self.skip.reset();
            state.context.win_results = wins.clone();
            state.context.current_win_index = 0;
            state.context.is_animating = true;
            state.context.skip_requested = false;
            state.phase = if wins.len() == 1 {
                AnimationPhase::SingleWinAnimation
            } else {
                AnimationPhase::ShowingAllWins
            };
            log::debug!(
                "[PaylineAnimator] {:?} with {} wins at speed {}",
                state.phase,
                wins.len(),
                state.context.animation_speed_multiplier
            );

            Sequence {
                timing: self.timing.scaled(state.context.animation_speed_multiplier),
                callbacks: state.callbacks.clone(),
                display: state.display.clone(),
                wins,
            }
        };

        let mut guard = ResetOnDrop {
            animator: self,
            armed: true,
        };

        fire(&sequence.callbacks.on_start);
        let outcome = self.run(&sequence).await;

        guard.armed = false;
        self.finish();
        // A completed multi-win reveal already ends on a cleared frame
        if outcome.is_skipped() || sequence.wins.len() == 1 {
            show(&sequence.display, &[], None);
        }

        match outcome {
            DelayOutcome::Elapsed => {
                fire(&sequence.callbacks.on_end);
                AnimationOutcome::Completed
            }
            DelayOutcome::Skipped => {
                fire(&sequence.callbacks.on_skipped);
                AnimationOutcome::Skipped
            }
        }
    }

    async fn run(&self, sequence: &Sequence) -> DelayOutcome {
        let Sequence {
            wins,
            timing,
            display,
            ..
        } = sequence;

        if let [win] = wins.as_slice() {
            show(display, std::slice::from_ref(win), Some(0));
            return skippable_delay(timing.line_reveal(), &self.skip).await;
        }

        show(display, wins, None);
        if skippable_delay(timing.preview_all(), &self.skip).await.is_skipped() {
            return DelayOutcome::Skipped;
        }

        self.state.lock().phase = AnimationPhase::AnimatingIndividualWins;
        for (index, win) in wins.iter().enumerate() {
            self.state.lock().context.current_win_index = index;
            show(display, std::slice::from_ref(win), Some(index));
            if skippable_delay(timing.line_reveal(), &self.skip).await.is_skipped() {
                return DelayOutcome::Skipped;
            }

            show(display, &[], None);
            if skippable_delay(timing.clear_gap(), &self.skip).await.is_skipped() {
                return DelayOutcome::Skipped;
            }
        }

        DelayOutcome::Elapsed
    }

    /// complete → idle
    fn finish(&self) {
        let mut state = self.state.lock();
        state.phase = AnimationPhase::Complete;
        state.context.reset();
        state.phase = AnimationPhase::Idle;
        self.skip.reset();
    }
}

impl Default for PaylineAnimator {
    fn default() -> Self {
        Self::new(AnimationTiming::normal())
    }
}

impl fmt::Debug for PaylineAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PaylineAnimator")
            .field("phase", &state.phase)
            .field("context", &state.context)
            .field("callbacks", &state.callbacks)
            .finish()
    }
}

struct ResetOnDrop<'a> {
    animator: &'a PaylineAnimator,
    armed: bool,
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("[PaylineAnimator] sequence dropped mid-flight, resetting");
            self.animator.finish();
        }
    }
}
