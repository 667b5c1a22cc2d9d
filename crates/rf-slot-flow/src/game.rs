//! Game state machine — balance, bet and the spin lifecycle
//!
//! ```text
//! idle ──SPIN──► spinning ──SPIN_COMPLETE──► evaluating ──wins──► celebrating
//!  ▲                                              │                   │
//!  └────────────────── no wins ───────────────────┘                   │
//!  └────────── WIN_CELEBRATION_COMPLETE | celebration timeout ────────┘
//! ```
//!
//! Rejected events are ignored and logged at debug level; nothing here
//! returns an error once the machine is built.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use rf_slot_core::{BetConfig, SlotConfig, SpinResult};

use crate::FlowResult;

// ═══════════════════════════════════════════════════════════════════════════════
// STATES, EVENTS, CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Idle,
    Spinning,
    /// Pass-through; never observed at rest
    Evaluating,
    Celebrating,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Evaluating => "evaluating",
            Self::Celebrating => "celebrating",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spin,
    IncreaseBet,
    DecreaseBet,
    /// Accepted as-is, without clamping to the bet limits
    SetBet(f64),
    Reset,
    SpinComplete(SpinResult),
    WinCelebrationComplete,
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spin => "SPIN",
            Self::IncreaseBet => "INCREASE_BET",
            Self::DecreaseBet => "DECREASE_BET",
            Self::SetBet(_) => "SET_BET",
            Self::Reset => "RESET",
            Self::SpinComplete(_) => "SPIN_COMPLETE",
            Self::WinCelebrationComplete => "WIN_CELEBRATION_COMPLETE",
        }
    }
}

/// Session state owned by the machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameContext {
    pub balance: f64,
    pub current_bet: f64,
    /// Credited amount of the most recent winning spin
    pub last_win: f64,
    /// Cumulative winnings since the last reset
    pub total_win: f64,
    /// Result of the spin in flight, cleared when the machine returns to idle
    pub reel_results: Option<SpinResult>,
    pub is_spinning: bool,
    /// Derived: idle, positive finite bet, balance covers it
    pub can_spin: bool,
}

impl GameContext {
    fn initial(bets: &BetConfig) -> Self {
        let mut context = Self {
            balance: bets.initial_balance,
            current_bet: bets.initial_bet,
            last_win: 0.0,
            total_win: 0.0,
            reel_results: None,
            is_spinning: false,
            can_spin: false,
        };
        context.recompute(GameState::Idle);
        context
    }

    /// Bet is usable for a spin at all
    pub fn bet_is_valid(&self) -> bool {
        self.current_bet.is_finite() && self.current_bet > 0.0
    }

    fn affordable(&self) -> bool {
        self.bet_is_valid() && self.balance >= self.current_bet
    }

    fn recompute(&mut self, state: GameState) {
        self.can_spin = state == GameState::Idle && self.affordable();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MACHINE CORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Listener for accepted transitions
pub type GameListener = Arc<dyn Fn(GameState, &GameContext) + Send + Sync>;

/// Token returned by [`GameMachine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, GameListener)>,
}

struct MachineCore {
    state: GameState,
    context: GameContext,
    bets: BetConfig,
    celebration_timeout: Duration,
    /// Bumped on every celebration entry and reset; stale timers compare against it
    celebration_epoch: u64,
}

/// Outcome of one event: state snapshots to publish, timer to arm
#[derive(Default)]
struct Applied {
    snapshots: Vec<(GameState, GameContext)>,
    arm_timer: Option<(u64, Duration)>,
}

impl MachineCore {
    fn enter(&mut self, state: GameState, applied: &mut Applied) {
        self.state = state;
        self.context.recompute(state);
        applied.snapshots.push((state, self.context.clone()));
    }

    fn apply(&mut self, event: GameEvent) -> Applied {
        let mut applied = Applied::default();

        match (self.state, event) {
            (GameState::Idle, GameEvent::Spin) => {
                if !self.context.affordable() {
                    log::debug!(
                        "[GameMachine] SPIN rejected: bet {} balance {}",
                        self.context.current_bet,
                        self.context.balance
                    );
                    return applied;
                }
                self.context.balance -= self.context.current_bet;
                self.context.last_win = 0.0;
                self.context.is_spinning = true;
                self.enter(GameState::Spinning, &mut applied);
            }

            (GameState::Idle, GameEvent::IncreaseBet) => {
                let next = self.context.current_bet + self.bets.bet_step;
                if self.context.balance >= next && next <= self.bets.max_bet {
                    self.context.current_bet = next;
                    self.enter(GameState::Idle, &mut applied);
                } else {
                    log::debug!("[GameMachine] INCREASE_BET rejected at {}", self.context.current_bet);
                }
            }

            (GameState::Idle, GameEvent::DecreaseBet) => {
                if self.context.current_bet > self.bets.min_bet {
                    self.context.current_bet =
                        (self.context.current_bet - self.bets.bet_step).max(self.bets.min_bet);
                    self.enter(GameState::Idle, &mut applied);
                } else {
                    log::debug!("[GameMachine] DECREASE_BET rejected at {}", self.context.current_bet);
                }
            }

            (GameState::Idle, GameEvent::SetBet(amount)) => {
                // Limits are enforced by the bet buttons only; keep that asymmetry
                if !(self.bets.min_bet..=self.bets.max_bet).contains(&amount) {
                    log::warn!(
                        "[GameMachine] SET_BET {} is outside [{}, {}], accepted unclamped",
                        amount,
                        self.bets.min_bet,
                        self.bets.max_bet
                    );
                }
                self.context.current_bet = amount;
                self.enter(GameState::Idle, &mut applied);
            }

            (GameState::Idle, GameEvent::Reset) => {
                self.context = GameContext::initial(&self.bets);
                self.celebration_epoch += 1;
                log::info!("[GameMachine] reset to balance {}", self.context.balance);
                self.enter(GameState::Idle, &mut applied);
            }

            (GameState::Spinning, GameEvent::SpinComplete(result)) => {
                let has_wins = result.has_wins();
                let total = result.total_win;
                self.context.reel_results = Some(result);
                self.enter(GameState::Evaluating, &mut applied);

                if has_wins {
                    // Credit at entry so the balance never trails the presentation
                    self.context.balance += total;
                    self.context.last_win = total;
                    self.context.total_win += total;
                    self.celebration_epoch += 1;
                    applied.arm_timer = Some((self.celebration_epoch, self.celebration_timeout));
                    log::debug!("[GameMachine] celebrating win of {}", total);
                    self.enter(GameState::Celebrating, &mut applied);
                } else {
                    self.finish_round(&mut applied);
                }
            }

            (GameState::Celebrating, GameEvent::WinCelebrationComplete) => {
                self.finish_round(&mut applied);
            }

            (state, event) => {
                log::debug!("[GameMachine] {} ignored in {}", event.name(), state);
            }
        }

        applied
    }

    fn finish_round(&mut self, applied: &mut Applied) {
        self.context.reel_results = None;
        self.context.is_spinning = false;
        self.enter(GameState::Idle, applied);
    }

    fn expire_celebration(&mut self, epoch: u64) -> Applied {
        let mut applied = Applied::default();
        if self.state == GameState::Celebrating && self.celebration_epoch == epoch {
            log::debug!("[GameMachine] celebration timed out");
            self.finish_round(&mut applied);
        }
        applied
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Thread-safe handle to the game state machine
///
/// Clones share the same machine. All mutation goes through [`send`](Self::send).
#[derive(Clone)]
pub struct GameMachine {
    core: Arc<Mutex<MachineCore>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl GameMachine {
    /// Machine in `idle` with the initial balance and bet from `bets`
    ///
    /// `celebration_timeout` is the flat fallback exit from `celebrating`,
    /// already scaled by the animation speed.
    pub fn new(bets: BetConfig, celebration_timeout: Duration) -> Self {
        let context = GameContext::initial(&bets);
        Self {
            core: Arc::new(Mutex::new(MachineCore {
                state: GameState::Idle,
                context,
                bets,
                celebration_timeout,
                celebration_epoch: 0,
            })),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Validate `config` and build a machine from its bets and scaled timing
    pub fn from_config(config: &SlotConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self::new(
            config.bets.clone(),
            config.scaled_timing().celebration(),
        ))
    }

    /// Process one event and return the state the machine rests in afterwards
    ///
    /// Listeners run after the lock is released, once per entered state.
    pub fn send(&self, event: GameEvent) -> GameState {
        let (applied, state) = {
            let mut core = self.core.lock();
            let applied = core.apply(event);
            (applied, core.state)
        };

        if let Some((epoch, timeout)) = applied.arm_timer {
            self.arm_celebration_timer(epoch, timeout);
        }
        self.notify(&applied.snapshots);
        state
    }

    fn arm_celebration_timer(&self, epoch: u64, timeout: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::debug!("[GameMachine] no runtime, celebration waits for WIN_CELEBRATION_COMPLETE");
            return;
        };

        let machine = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            machine.expire_celebration(epoch);
        });
    }

    fn expire_celebration(&self, epoch: u64) {
        let applied = self.core.lock().expire_celebration(epoch);
        self.notify(&applied.snapshots);
    }

    fn notify(&self, snapshots: &[(GameState, GameContext)]) {
        if snapshots.is_empty() {
            return;
        }
        let listeners: Vec<GameListener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for (state, context) in snapshots {
            for listener in &listeners {
                listener(*state, context);
            }
        }
    }

    /// Register a listener for every accepted transition
    pub fn subscribe(
        &self,
        listener: impl Fn(GameState, &GameContext) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut listeners = self.listeners.lock();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false for an unknown id
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    pub fn state(&self) -> GameState {
        self.core.lock().state
    }

    pub fn context(&self) -> GameContext {
        self.core.lock().context.clone()
    }

    pub fn balance(&self) -> f64 {
        self.core.lock().context.balance
    }

    pub fn current_bet(&self) -> f64 {
        self.core.lock().context.current_bet
    }

    pub fn can_spin(&self) -> bool {
        self.core.lock().context.can_spin
    }

    pub fn bets(&self) -> BetConfig {
        self.core.lock().bets.clone()
    }

    pub fn celebration_timeout(&self) -> Duration {
        self.core.lock().celebration_timeout
    }

    /// Applies from the next celebration on
    pub fn set_celebration_timeout(&self, timeout: Duration) {
        self.core.lock().celebration_timeout = timeout;
    }
}

impl fmt::Debug for GameMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("GameMachine")
            .field("state", &core.state)
            .field("context", &core.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_slot_core::{SymbolGrid, SymbolKind, WinEvaluator};

    fn machine() -> GameMachine {
        GameMachine::new(BetConfig::default(), Duration::from_millis(2000))
    }

    fn losing_result(bet: f64) -> SpinResult {
        use SymbolKind::*;
        // Reels 0 and 1 share no symbol, so nothing can match
        let grid = SymbolGrid::from_rows(&[
            vec![Cherry, Plum, Cherry, Plum, Cherry],
            vec![Lemon, Grape, Lemon, Grape, Lemon],
            vec![Orange, Watermelon, Orange, Watermelon, Orange],
        ])
        .unwrap();
        WinEvaluator::standard().evaluate_spin(grid, bet)
    }

    fn winning_result(bet: f64) -> SpinResult {
        let grid = SymbolGrid::new(vec![vec![SymbolKind::Bell; 3]; 5]).unwrap();
        WinEvaluator::standard().evaluate_spin(grid, bet)
    }

    #[test]
    fn test_initial_context() {
        let m = machine();
        let ctx = m.context();
        assert_eq!(m.state(), GameState::Idle);
        assert_eq!(ctx.balance, 1000.0);
        assert_eq!(ctx.current_bet, 10.0);
        assert!(ctx.can_spin);
        assert!(!ctx.is_spinning);
    }

    #[test]
    fn test_spin_deducts_bet() {
        let m = machine();
        assert_eq!(m.send(GameEvent::Spin), GameState::Spinning);
        let ctx = m.context();
        assert_eq!(ctx.balance, 990.0);
        assert!(ctx.is_spinning);
        assert!(!ctx.can_spin);
    }

    #[test]
    fn test_losing_spin_returns_to_idle() {
        let m = machine();
        m.send(GameEvent::Spin);
        let result = losing_result(10.0);
        assert!(!result.has_wins());
        assert_eq!(m.send(GameEvent::SpinComplete(result)), GameState::Idle);

        let ctx = m.context();
        assert_eq!(ctx.balance, 990.0);
        assert!(ctx.reel_results.is_none());
        assert!(ctx.can_spin);
    }

    #[test]
    fn test_winning_spin_credits_on_entry() {
        let m = machine();
        m.send(GameEvent::Spin);
        let result = winning_result(10.0);
        let total = result.total_win;
        assert!(total > 0.0);

        assert_eq!(m.send(GameEvent::SpinComplete(result)), GameState::Celebrating);
        let ctx = m.context();
        assert_eq!(ctx.balance, 990.0 + total);
        assert_eq!(ctx.last_win, total);
        assert_eq!(ctx.total_win, total);
        assert!(ctx.reel_results.is_some());

        assert_eq!(m.send(GameEvent::WinCelebrationComplete), GameState::Idle);
        assert!(m.context().reel_results.is_none());
        assert!(m.can_spin());
    }

    #[test]
    fn test_spin_rejected_when_balance_short() {
        let m = GameMachine::new(
            BetConfig {
                initial_balance: 5.0,
                ..BetConfig::default()
            },
            Duration::from_millis(2000),
        );
        assert!(!m.can_spin());
        assert_eq!(m.send(GameEvent::Spin), GameState::Idle);
        assert_eq!(m.balance(), 5.0);
    }

    #[test]
    fn test_bet_buttons_respect_limits() {
        let m = machine();
        for _ in 0..50 {
            m.send(GameEvent::IncreaseBet);
        }
        assert_eq!(m.current_bet(), 100.0);

        for _ in 0..50 {
            m.send(GameEvent::DecreaseBet);
        }
        assert_eq!(m.current_bet(), 5.0);
    }

    #[test]
    fn test_increase_bet_needs_balance() {
        let m = GameMachine::new(
            BetConfig {
                initial_balance: 12.0,
                ..BetConfig::default()
            },
            Duration::from_millis(2000),
        );
        m.send(GameEvent::IncreaseBet);
        assert_eq!(m.current_bet(), 10.0);
    }

    #[test]
    fn test_set_bet_is_unclamped() {
        let m = machine();
        m.send(GameEvent::SetBet(5000.0));
        assert_eq!(m.current_bet(), 5000.0);
        assert!(!m.can_spin());

        m.send(GameEvent::SetBet(0.0));
        assert_eq!(m.current_bet(), 0.0);
        assert!(!m.can_spin());
        assert_eq!(m.send(GameEvent::Spin), GameState::Idle);
        assert_eq!(m.balance(), 1000.0);

        m.send(GameEvent::SetBet(-3.0));
        assert_eq!(m.send(GameEvent::Spin), GameState::Idle);
        assert_eq!(m.balance(), 1000.0);
    }

    #[test]
    fn test_bet_changes_ignored_while_spinning() {
        let m = machine();
        m.send(GameEvent::Spin);
        m.send(GameEvent::IncreaseBet);
        m.send(GameEvent::SetBet(50.0));
        m.send(GameEvent::Reset);
        assert_eq!(m.current_bet(), 10.0);
        assert_eq!(m.state(), GameState::Spinning);
    }

    #[test]
    fn test_reset_restores_initial_context() {
        let m = machine();
        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(winning_result(10.0)));
        m.send(GameEvent::WinCelebrationComplete);
        m.send(GameEvent::IncreaseBet);

        m.send(GameEvent::Reset);
        let ctx = m.context();
        assert_eq!(ctx.balance, 1000.0);
        assert_eq!(ctx.current_bet, 10.0);
        assert_eq!(ctx.total_win, 0.0);
        assert_eq!(ctx.last_win, 0.0);
    }

    #[test]
    fn test_celebration_complete_outside_celebrating_is_ignored() {
        let m = machine();
        assert_eq!(m.send(GameEvent::WinCelebrationComplete), GameState::Idle);
        m.send(GameEvent::Spin);
        assert_eq!(m.send(GameEvent::WinCelebrationComplete), GameState::Spinning);
    }

    #[test]
    fn test_listeners_see_evaluating_pass_through() {
        let m = machine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = m.subscribe(move |state, _| sink.lock().push(state));

        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(losing_result(10.0)));
        assert_eq!(
            *seen.lock(),
            vec![GameState::Spinning, GameState::Evaluating, GameState::Idle]
        );

        assert!(m.unsubscribe(id));
        assert!(!m.unsubscribe(id));
        m.send(GameEvent::Spin);
        assert_eq!(seen.lock().len(), 3);
    }

    #[test]
    fn test_rejected_events_do_not_notify() {
        let m = machine();
        let count = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&count);
        m.subscribe(move |_, _| *counter.lock() += 1);

        m.send(GameEvent::WinCelebrationComplete);
        m.send(GameEvent::DecreaseBet);
        m.send(GameEvent::DecreaseBet);
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_no_runtime_waits_for_explicit_completion() {
        let m = GameMachine::new(BetConfig::default(), Duration::ZERO);
        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(winning_result(10.0)));
        assert_eq!(m.state(), GameState::Celebrating);
        assert_eq!(m.send(GameEvent::WinCelebrationComplete), GameState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_celebration_timeout_returns_to_idle() {
        let m = machine();
        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(winning_result(10.0)));
        assert_eq!(m.state(), GameState::Celebrating);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(m.state(), GameState::Celebrating);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(m.state(), GameState::Idle);
        assert!(m.can_spin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_end_next_celebration() {
        let m = machine();
        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(winning_result(10.0)));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        m.send(GameEvent::WinCelebrationComplete);

        // Second celebration starts before the first timer fires
        m.send(GameEvent::Spin);
        m.send(GameEvent::SpinComplete(winning_result(10.0)));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(m.state(), GameState::Celebrating);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(m.state(), GameState::Idle);
    }
}
