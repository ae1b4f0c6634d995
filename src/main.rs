use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use minivegas::{Casino, Config, Error, Result};

#[derive(Parser)]
#[command(name = "minivegas", version, about = "Casino mini-games in your terminal")]
struct Cli {
    /// Data directory for persistent player state
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed the RNG for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the coin balance
    Balance,
    /// Add coins to the balance
    Add { amount: u64 },
    /// Remove coins from the balance
    Remove { amount: u64 },
    /// Reset the balance to zero
    Reset,
    /// Spin the slot machine
    Spin { bet: u64 },
    /// Spin the daily prize wheel
    Wheel,
    /// Show daily reward box availability
    Boxes,
    /// Open a daily reward box
    OpenBox { box_id: String },
    /// Play a thimble round: stake a bet and guess a cup (0-based)
    Thimble { bet: u64, cup: usize },
    /// Drop a volley of plinko balls
    Plinko { balls: u32, bet: u64 },
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(".minivegas"))
        .ok_or_else(|| Error::Config("cannot resolve a home directory, pass --data-dir".into()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let data_dir = resolve_data_dir(&cli)?;

    let casino = match cli.seed {
        Some(seed) => Casino::with_seed(config, &data_dir, seed)?,
        None => Casino::new(config, &data_dir)?,
    };

    match cli.command {
        Commands::Balance => {
            println!("balance: {} coins", casino.balance());
        }

        Commands::Add { amount } => {
            let balance = casino.add_coins(amount)?;
            println!("added {} coins, balance: {}", amount, balance);
        }

        Commands::Remove { amount } => {
            if casino.remove_coins(amount)? {
                println!("removed {} coins, balance: {}", amount, casino.balance());
            } else {
                println!(
                    "not enough coins: balance is {}, tried to remove {}",
                    casino.balance(),
                    amount
                );
            }
        }

        Commands::Reset => {
            casino.reset_coins()?;
            println!("balance reset to 0");
        }

        Commands::Spin { bet } => {
            let report = casino.spin_slots(bet).await?;
            for row in 0..report.grid.rows() {
                let line: Vec<String> = (0..report.grid.reels())
                    .map(|reel| report.grid.get(reel, row).to_string())
                    .collect();
                println!("  [ {} ]", line.join(" | "));
            }
            println!(
                "outcome: {:?}, payout: {}, balance: {}",
                report.outcome.kind(),
                report.payout,
                report.balance
            );
        }

        Commands::Wheel => match casino.spin_wheel() {
            Ok(reward) => println!(
                "the wheel stops on {}: +{} coins, balance: {}",
                reward.section_name, reward.coins, reward.balance
            ),
            Err(Error::CooldownActive { remaining }) => {
                println!("wheel not ready, come back in {}s", remaining.as_secs());
            }
            Err(e) => return Err(e),
        },

        Commands::Boxes => {
            for status in casino.box_statuses() {
                if status.remaining.is_zero() {
                    println!("{}: ready", status.box_id);
                } else {
                    println!(
                        "{}: ready in {}s",
                        status.box_id,
                        status.remaining.num_seconds()
                    );
                }
            }
        }

        Commands::OpenBox { box_id } => match casino.open_reward_box(&box_id) {
            Ok(reward) => println!(
                "{} box pays {} coins, balance: {}",
                reward.box_id, reward.coins, reward.balance
            ),
            Err(Error::CooldownActive { remaining }) => {
                println!(
                    "{} box not ready, come back in {}s",
                    box_id,
                    remaining.as_secs()
                );
            }
            Err(e) => return Err(e),
        },

        Commands::Thimble { bet, cup } => {
            let outcome = casino.play_thimble(bet, cup)?;
            if outcome.won {
                println!(
                    "the ball was under cup {} - you win {} coins! balance: {}",
                    outcome.ball_cup, outcome.payout, outcome.balance
                );
            } else {
                println!(
                    "the ball was under cup {}, not {}. balance: {}",
                    outcome.ball_cup, outcome.guessed_cup, outcome.balance
                );
            }
        }

        Commands::Plinko { balls, bet } => {
            let report = casino.drop_volley(balls, bet)?;
            for (i, ball) in report.balls.iter().enumerate() {
                println!(
                    "ball {} -> bucket {} (x{}): +{}",
                    i + 1,
                    ball.bucket,
                    ball.multiplier,
                    ball.payout
                );
            }
            println!(
                "spent {}, won {}, balance: {}",
                report.spent, report.won, report.balance
            );
        }
    }

    Ok(())
}
