//! Self-play training statistics

use std::collections::VecDeque;
use std::time::Instant;

use crate::infra::PlayerId;

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f32>,
    window_size: usize,
    sum: f32,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.values.len() >= self.window_size
            && let Some(old) = self.values.pop_front()
        {
            self.sum -= old;
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f32
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Match outcome tracker
#[derive(Debug)]
pub struct MatchMetrics {
    pub player_one_wins: u32,
    pub player_two_wins: u32,
    pub draws: u32,
    /// Ticks per match
    pub match_lengths: MovingAverage,
    /// Player one's final health minus player two's
    pub health_margins: MovingAverage,
    /// Q-table entries after each match
    pub table_sizes: MovingAverage,
    start_time: Instant,
}

impl MatchMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            player_one_wins: 0,
            player_two_wins: 0,
            draws: 0,
            match_lengths: MovingAverage::new(window_size),
            health_margins: MovingAverage::new(window_size),
            table_sizes: MovingAverage::new(window_size),
            start_time: Instant::now(),
        }
    }

    pub fn record_match(&mut self, winner: Option<PlayerId>, ticks: u32, health_margin: f32, table_size: usize) {
        match winner {
            Some(PlayerId::One) => self.player_one_wins += 1,
            Some(PlayerId::Two) => self.player_two_wins += 1,
            None => self.draws += 1,
        }
        self.match_lengths.push(ticks as f32);
        self.health_margins.push(health_margin);
        self.table_sizes.push(table_size as f32);
    }

    pub fn matches(&self) -> u32 {
        self.player_one_wins + self.player_two_wins + self.draws
    }

    pub fn duration_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn log_to_console(&self) {
        tracing::info!(
            "Matches {} | P1 {} | P2 {} | draws {} | {:.1}s",
            self.matches(),
            self.player_one_wins,
            self.player_two_wins,
            self.draws,
            self.duration_secs()
        );
        tracing::info!(
            "  Recent: length={:.1}, margin={:.1}, table={:.0}",
            self.match_lengths.average(),
            self.health_margins.average(),
            self.table_sizes.average()
        );
    }
}
