use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use turtle::{
    env::Environment,
    policy::{Policy, RandomPolicy, SeekGoal},
    Color, EpisodeController, TurtleConfig,
};

/// Runs the turtle agent in a headless arena.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes to run.
    #[arg(long, default_value_t = 5)]
    episodes: usize,

    /// Seed for goal placement and the random policy.
    #[arg(long)]
    seed: Option<u64>,

    /// Policy driving the agent.
    #[arg(long, value_enum, default_value_t = PolicyKind::Seek)]
    policy: PolicyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    Seek,
    Random,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TurtleConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TurtleConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;

    match args.policy {
        PolicyKind::Seek => run(SeekGoal::default(), config, args.episodes),
        PolicyKind::Random => {
            let rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                None => StdRng::from_entropy(),
            };
            run(RandomPolicy::new(rng), config, args.episodes)
        }
    }
}

fn run<T: Policy>(policy: T, config: TurtleConfig, episodes: usize) -> Result<()> {
    let max_ticks = (episodes as u64 + 1) * u64::from(config.step_budget);
    let mut env = Environment::new(policy, &config);
    let mut controller = EpisodeController::from_config(config);

    controller.initialize(Some(Color::GRAY));
    controller.begin_episode();
    tracing::info!("Running {} episodes...", episodes);

    let mut finished = 0;
    while finished < episodes && env.ticks() < max_ticks {
        if let Some(summary) = env.tick(&mut controller) {
            finished += 1;
            tracing::info!(
                "Episode {} finished ({}) after {} steps with reward {:.3}",
                summary.episode_index,
                summary.outcome,
                summary.steps,
                summary.cumulative_reward
            );
            tracing::info!("{}", controller.telemetry());
        }
    }

    tracing::info!("Finished {} episodes in {} ticks.", finished, env.ticks());
    Ok(())
}
