use std::cell::RefCell;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tunnelbot::infra::DefaultObserver;
use tunnelbot::planners::hierarchical::{AgentConfig, Game, GameConfig, LearnerConfig, QLearner};

fn get_env_var_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|val| val.parse::<u32>().ok())
}

fn get_env_var_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|val| val.parse::<u64>().ok())
}

fn get_env_var_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|val| val.parse::<bool>().ok())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tunnelbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let defaults = GameConfig::default();
    let config = GameConfig {
        matches: get_env_var_u32("TUNNELBOT_MATCHES").unwrap_or(defaults.matches),
        max_ticks: get_env_var_u32("TUNNELBOT_MAX_TICKS").unwrap_or(defaults.max_ticks),
        seed: get_env_var_u64("TUNNELBOT_SEED"),
        learning: get_env_var_bool("TUNNELBOT_LEARNING").unwrap_or(defaults.learning),
        ..defaults
    };
    let table_path =
        PathBuf::from(env::var("TUNNELBOT_QTABLE").unwrap_or_else(|_| "qvalues.txt".to_string()));
    let snapshot_dir = env::var("TUNNELBOT_SNAPSHOT_DIR").ok().map(PathBuf::from);

    tracing::info!(
        "Self-play: {} matches, {} ticks max, learning: {}",
        config.matches,
        config.max_ticks,
        config.learning
    );

    let mut learner = QLearner::new(LearnerConfig {
        seed: config.seed,
        ..LearnerConfig::default()
    });
    learner.load_table(&table_path);
    let learner = Rc::new(RefCell::new(learner));

    let learning = config.learning;
    let mut game = Game::new(config, AgentConfig::default(), Rc::clone(&learner), DefaultObserver);
    game.run();

    if learning {
        let learner = learner.borrow();
        if let Some(dir) = snapshot_dir {
            let path = learner.save_snapshot(&dir)?;
            tracing::info!("Snapshot written to {}", path.display());
        }
        learner.save_table(&table_path)?;
        tracing::info!("Q-table saved ({} entries) to {}", learner.len(), table_path.display());
    }

    Ok(())
}
