use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;
use thiserror::Error;
use time::{OffsetDateTime, format_description};

use crate::planners::hierarchical::config::LearnerConfig;
use crate::planners::hierarchical::match_summary::{MatchObservation, MatchSummary, XCloseness, YCloseness};
use crate::planners::hierarchical::strategy::StrategyKind;
use crate::state::Weapon;

pub type QTable = HashMap<(MatchSummary, StrategyKind), f32>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("q-table i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("q-table line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("snapshot timestamp: {0}")]
    Timestamp(String),
}

/// Tabular Q-learning over match summaries, with one value per strategy.
#[derive(Debug)]
pub struct QLearner {
    config: LearnerConfig,
    values: QTable,
    rng: StdRng,
}

impl QLearner {
    pub fn new(config: LearnerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            values: HashMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored value, or the recommendation prior when the pair was never seen.
    pub fn value(&self, summary: &MatchSummary, strategy: StrategyKind) -> f32 {
        self.values
            .get(&(*summary, strategy))
            .copied()
            .unwrap_or_else(|| {
                if recommended_strategy(summary) == strategy {
                    1.0
                } else {
                    0.0
                }
            })
    }

    pub fn max_value(&self, summary: &MatchSummary) -> f32 {
        StrategyKind::iter()
            .map(|strategy| self.value(summary, strategy))
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Highest-valued strategy; ties go to the first in declaration order.
    pub fn best_strategy(&self, summary: &MatchSummary) -> StrategyKind {
        let mut best = StrategyKind::Attack;
        let mut best_value = f32::NEG_INFINITY;
        for strategy in StrategyKind::iter() {
            let value = self.value(summary, strategy);
            if value > best_value {
                best = strategy;
                best_value = value;
            }
        }
        best
    }

    /// Epsilon-greedy choice.
    pub fn select_strategy(&mut self, summary: &MatchSummary) -> StrategyKind {
        if self.rng.random::<f32>() < self.config.epsilon {
            let strategies: Vec<StrategyKind> = StrategyKind::iter().collect();
            return strategies[self.rng.random_range(0..strategies.len())];
        }
        self.best_strategy(summary)
    }

    /// Change in health margin, plus the winning bonus or losing penalty if
    /// the match was just decided.
    pub fn reward(&self, previous: &MatchObservation, next: &MatchObservation) -> f32 {
        let bonus = match next.won {
            Some(true) => self.config.winning_reward,
            Some(false) => -self.config.winning_reward,
            None => 0.0,
        };
        next.health_margin() - previous.health_margin() + bonus
    }

    /// Temporal-difference update of `(previous, strategy)` towards
    /// `reward + discount * max Q(next)`.
    pub fn update(
        &mut self,
        previous: &MatchSummary,
        strategy: StrategyKind,
        reward: f32,
        next: &MatchSummary,
    ) {
        let current = self.value(previous, strategy);
        let target = reward + self.config.discount * self.max_value(next);
        let updated = current + self.config.alpha * (target - current);
        tracing::trace!(%previous, %strategy, reward, current, updated, "q update");
        self.values.insert((*previous, strategy), updated);
    }

    /// Writes every entry as `summary strategy value`, one per line.
    pub fn save_table(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut lines: Vec<String> = self
            .values
            .iter()
            .map(|((summary, strategy), value)| format!("{summary} {strategy} {value}"))
            .collect();
        lines.sort();

        let mut writer = BufWriter::new(fs::File::create(path)?);
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes a timestamped copy of the table into `dir` and returns its path.
    pub fn save_snapshot(&self, dir: &Path) -> Result<PathBuf, TableError> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .map_err(|e| TableError::Timestamp(e.to_string()))?;
        let stamp = now
            .format(&format)
            .map_err(|e| TableError::Timestamp(e.to_string()))?;

        let path = dir.join(format!("qvalues-{stamp}.txt"));
        self.save_table(&path)?;
        Ok(path)
    }

    /// Parses a saved table. Keys naming a weapon with zero ammo are folded
    /// into the `None` weapon key and colliding entries are averaged.
    pub fn read_table(path: &Path) -> Result<QTable, TableError> {
        let contents = fs::read_to_string(path)?;
        let mut sums: HashMap<(MatchSummary, StrategyKind), (f32, u32)> = HashMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line_no = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != 8 {
                return Err(TableError::Parse {
                    line: line_no,
                    reason: format!("expected 8 fields, found {}", tokens.len()),
                });
            }

            let summary = tokens[..6]
                .join(" ")
                .parse::<MatchSummary>()
                .map_err(|e| TableError::Parse {
                    line: line_no,
                    reason: e.to_string(),
                })?;
            let strategy: StrategyKind = tokens[6].parse().map_err(|_| TableError::Parse {
                line: line_no,
                reason: format!("unknown strategy `{}`", tokens[6]),
            })?;
            let value: f32 = tokens[7].parse().map_err(|_| TableError::Parse {
                line: line_no,
                reason: format!("invalid value `{}`", tokens[7]),
            })?;

            let entry = sums.entry((summary.canonical(), strategy)).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(key, (sum, count))| (key, sum / count as f32))
            .collect())
    }

    /// Replaces the table with the file's contents. A missing or corrupt file
    /// leaves an empty table.
    pub fn load_table(&mut self, path: &Path) {
        match Self::read_table(path) {
            Ok(values) => {
                tracing::info!(path = %path.display(), entries = values.len(), "q-table loaded");
                self.values = values;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "starting with an empty q-table");
                self.values.clear();
            }
        }
    }
}

/// Hand-written strategy for situations the table has not seen yet.
pub fn recommended_strategy(summary: &MatchSummary) -> StrategyKind {
    if !summary.is_enemy_armed() {
        return if summary.is_armed() {
            StrategyKind::Attack
        } else {
            StrategyKind::GetAmmo
        };
    }

    let vulnerable = match summary.enemy_weapon {
        Weapon::Rockets => matches!(summary.y, YCloseness::PosNear | YCloseness::NegNear),
        Weapon::Bombs | Weapon::Lightning => summary.x == XCloseness::Near,
        Weapon::Minions | Weapon::None => false,
    };

    if vulnerable {
        StrategyKind::RunAway
    } else if summary.is_armed() {
        StrategyKind::Attack
    } else {
        StrategyKind::GetAmmo
    }
}
