//! Fruit Reels round simulator
//!
//! Usage:
//!   rf-slot-sim --rounds 100 --seed 42        - Play 100 seeded rounds
//!   rf-slot-sim --profile instant --bet 25    - Faster presentation, bigger bet
//!   rf-slot-sim --config machine.yaml         - Load symbols/paylines from disk
//!   rf-slot-sim --paylines                    - Print the payline catalog
//!   rf-slot-sim --dump-config                 - Print the effective config as JSON

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use rf_slot_core::{SlotConfig, TimingProfile};
use rf_slot_flow::{GameEvent, LogSink, NullSink, RoundReport, SlotSession, StageSink};

#[derive(Parser)]
#[command(name = "rf-slot-sim", about = "Play slot rounds headlessly")]
struct Cli {
    /// Number of rounds to play
    #[arg(short, long, default_value_t = 10)]
    rounds: u64,

    /// Seed for reproducible grids
    #[arg(short, long)]
    seed: Option<u64>,

    /// Presentation speed profile
    #[arg(short, long, value_enum, default_value_t = Profile::Instant)]
    profile: Profile,

    /// Speed multiplier (implies the custom profile)
    #[arg(long)]
    speed: Option<f64>,

    /// Bet per round (unclamped, like SET_BET)
    #[arg(short, long)]
    bet: Option<f64>,

    /// JSON or YAML machine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw symbols in catalog order instead of by weight
    #[arg(long)]
    cyclic: bool,

    /// Skip every win presentation after this many milliseconds
    #[arg(long)]
    skip_after: Option<u64>,

    /// Print the payline catalog and exit
    #[arg(long)]
    paylines: bool,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Log every stage and machine transition
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Instant,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Instant => TimingProfile::Instant,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;

    if cli.paylines {
        print_paylines(&config)?;
        return Ok(());
    }
    if cli.dump_config {
        println!("{}", config.to_json().context("Failed to serialize config")?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(simulate(&cli, &config))
}

fn load_config(cli: &Cli) -> Result<SlotConfig> {
    let mut config = match &cli.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::default(),
    };

    config = match cli.speed {
        Some(speed) => config.with_custom_speed(speed),
        None => config.with_timing_profile(cli.profile.into()),
    };
    config.validate().context("Invalid machine config")?;
    Ok(config)
}

fn print_paylines(config: &SlotConfig) -> Result<()> {
    let catalog = config.payline_catalog().context("Invalid payline catalog")?;
    println!("🎰 {} paylines on {}x{}\n", catalog.len(), catalog.spec().reels, catalog.spec().rows);
    for payline in catalog.iter() {
        let rows: Vec<String> = payline.rows().iter().map(u8::to_string).collect();
        println!("  {:>3}  {:<16} [{}]", payline.id, payline.name, rows.join(", "));
    }
    Ok(())
}

async fn simulate(cli: &Cli, config: &SlotConfig) -> Result<()> {
    let session = match cli.seed {
        Some(seed) => SlotSession::with_seed(config, seed),
        None => SlotSession::new(config),
    }
    .context("Failed to build session")?;

    let sink: Arc<dyn StageSink> = if cli.verbose {
        Arc::new(LogSink)
    } else {
        Arc::new(NullSink)
    };
    let mut session = session.with_sink(sink);
    session.generator_mut().set_mode(cli.cyclic);

    if cli.verbose {
        session.machine().subscribe(|state, ctx| {
            log::debug!("[Sim] {} balance {} bet {}", state, ctx.balance, ctx.current_bet);
        });
    }

    if let Some(bet) = cli.bet {
        session.machine().send(GameEvent::SetBet(bet));
        if !session.machine().can_spin() {
            bail!(
                "Bet {} cannot be played with balance {}",
                bet,
                session.machine().balance()
            );
        }
    }

    println!(
        "🎰 {} | {} rounds | {} timing (x{})\n",
        config.name,
        cli.rounds,
        config.timing_profile.display_name(),
        config.speed()
    );

    for _ in 0..cli.rounds {
        let skipper = cli.skip_after.map(|ms| {
            let animator = session.animator();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                animator.skip_animation();
            })
        });

        let round = session.play_round().await;
        if let Some(skipper) = skipper {
            skipper.abort();
        }

        match round {
            Some(report) => print_round(&report),
            None => {
                println!(
                    "\n⚠️  Balance {:.2} cannot cover the bet, stopping",
                    session.machine().balance()
                );
                break;
            }
        }
    }

    let stats = session.stats();
    println!("\n📊 Session");
    println!("  Spins:        {}", stats.total_spins);
    println!("  Total bet:    {:.2}", stats.total_bet);
    println!("  Total won:    {:.2}", stats.total_win);
    println!("  RTP:          {:.2}%", stats.rtp());
    println!("  Hit rate:     {:.2}%", stats.hit_rate());
    println!("  Skipped:      {}", stats.skipped_presentations);
    println!("  Max win:      {:.1}x", stats.max_win_ratio);
    println!("  Balance:      {:.2}", session.machine().balance());
    Ok(())
}

fn print_round(report: &RoundReport) {
    if report.is_win() {
        let lines: Vec<String> = report
            .wins
            .iter()
            .map(|w| {
                let symbol = w.symbol().map_or("?", |s| s.display_name());
                format!("#{} {}x{}", w.payline_id, w.match_count(), symbol)
            })
            .collect();
        println!(
            "  {:>4}  bet {:>7.2}  won {:>8.2}  balance {:>9.2}  {}{}",
            report.round,
            report.bet,
            report.total_win,
            report.balance_after,
            lines.join(", "),
            if report.was_skipped() { " (skipped)" } else { "" }
        );
    } else {
        println!(
            "  {:>4}  bet {:>7.2}  -           balance {:>9.2}",
            report.round, report.bet, report.balance_after
        );
    }
}
