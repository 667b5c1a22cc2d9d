//! Slot machine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::evaluator::WinEvaluator;
use crate::grid::GridSpec;
use crate::paylines::{PaylineCatalog, PaylineDefinition, standard_25_paylines};
use crate::symbols::{SymbolCatalog, SymbolConfig, standard_symbols};
use crate::timing::{AnimationTiming, TimingProfile};

/// Balance and bet limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetConfig {
    /// Balance at session start (and after reset)
    pub initial_balance: f64,
    /// Bet at session start
    pub initial_bet: f64,
    /// Floor for DECREASE_BET
    pub min_bet: f64,
    /// Ceiling for INCREASE_BET
    pub max_bet: f64,
    /// Increment for INCREASE_BET / DECREASE_BET
    pub bet_step: f64,
}

impl Default for BetConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000.0,
            initial_bet: 10.0,
            min_bet: 5.0,
            max_bet: 100.0,
            bet_step: 5.0,
        }
    }
}

impl BetConfig {
    pub fn validate(&self) -> SlotResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !self.initial_balance.is_finite() || self.initial_balance < 0.0 {
            return Err(SlotError::InvalidConfig(format!(
                "initial balance must be >= 0, got {}",
                self.initial_balance
            )));
        }
        if !positive(self.min_bet) || !positive(self.bet_step) {
            return Err(SlotError::InvalidConfig(format!(
                "min bet and bet step must be positive, got {} and {}",
                self.min_bet, self.bet_step
            )));
        }
        if !self.max_bet.is_finite() || self.max_bet < self.min_bet {
            return Err(SlotError::InvalidConfig(format!(
                "max bet {} is below min bet {}",
                self.max_bet, self.min_bet
            )));
        }
        if !(self.min_bet..=self.max_bet).contains(&self.initial_bet) {
            return Err(SlotError::InvalidConfig(format!(
                "initial bet {} is outside [{}, {}]",
                self.initial_bet, self.min_bet, self.max_bet
            )));
        }
        Ok(())
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Machine name for logs and reports
    pub name: String,
    /// Grid geometry
    pub grid: GridSpec,
    /// Symbol table in draw order
    pub symbols: Vec<SymbolConfig>,
    /// Payline table
    pub paylines: Vec<PaylineDefinition>,
    /// Balance and bet limits
    pub bets: BetConfig,
    /// Base presentation durations
    pub timing: AnimationTiming,
    /// Presentation speed profile
    pub timing_profile: TimingProfile,
    /// Speed used by the `custom` profile
    pub custom_speed: Option<f64>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            name: "Fruit Reels".into(),
            grid: GridSpec::standard_5x3(),
            symbols: standard_symbols(),
            paylines: standard_25_paylines(),
            bets: BetConfig::default(),
            timing: AnimationTiming::normal(),
            timing_profile: TimingProfile::Normal,
            custom_speed: None,
        }
    }
}

impl SlotConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        log::info!("[SlotConfig] loading {}", path.display());
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load-time validation of every table
    pub fn validate(&self) -> SlotResult<()> {
        self.symbol_catalog()?;
        self.payline_catalog()?;
        self.bets.validate()?;
        self.timing.validate()?;
        if self.timing_profile == TimingProfile::Custom && self.custom_speed.is_none() {
            return Err(SlotError::InvalidConfig(
                "custom timing profile needs custom_speed".into(),
            ));
        }
        let speed = self.speed();
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SlotError::InvalidConfig(format!(
                "animation speed must be positive, got {}",
                speed
            )));
        }
        Ok(())
    }

    pub fn symbol_catalog(&self) -> SlotResult<SymbolCatalog> {
        SymbolCatalog::new(self.symbols.clone())
    }

    pub fn payline_catalog(&self) -> SlotResult<PaylineCatalog> {
        PaylineCatalog::new(self.paylines.clone(), self.grid)
    }

    /// Evaluator over this config's validated tables
    pub fn evaluator(&self) -> SlotResult<WinEvaluator> {
        Ok(WinEvaluator::new(
            self.symbol_catalog()?,
            self.payline_catalog()?,
        ))
    }

    /// Effective animation speed multiplier
    pub fn speed(&self) -> f64 {
        self.timing_profile
            .speed_multiplier()
            .or(self.custom_speed)
            .unwrap_or(1.0)
    }

    /// Durations at the effective speed
    pub fn scaled_timing(&self) -> AnimationTiming {
        self.timing.scaled(self.speed())
    }

    pub fn with_timing_profile(mut self, profile: TimingProfile) -> Self {
        self.timing_profile = profile;
        self
    }

    pub fn with_custom_speed(mut self, speed: f64) -> Self {
        self.timing_profile = TimingProfile::Custom;
        self.custom_speed = Some(speed);
        self
    }
}
