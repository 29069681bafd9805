//! Staleness checks for round-based price sources

use solana_program::{clock::Clock, msg};

use crate::error::EngineError;

use super::{OraclePrice, PriceFeed};

/// Default maximum age of an answer (3 hours)
pub const DEFAULT_PRICE_TIMEOUT_SECS: i64 = 3 * 60 * 60;

/// Answer of one aggregator round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub started_at: i64,
    pub updated_at: i64,
    pub answered_in_round: u64,
}

/// Aggregator returning the latest round
pub trait RoundDataSource {
    fn decimals(&self) -> u8;
    fn latest_round_data(&self) -> Result<RoundData, EngineError>;
}

/// Wall clock in unix seconds
pub trait TimeSource {
    fn unix_timestamp(&self) -> i64;
}

impl TimeSource for Clock {
    fn unix_timestamp(&self) -> i64 {
        self.unix_timestamp
    }
}

/// Rejects answers that are stale, incomplete or non-positive
pub struct StaleCheckedFeed<S, T> {
    source: S,
    clock: T,
    timeout_secs: i64,
}

impl<S: RoundDataSource, T: TimeSource> StaleCheckedFeed<S, T> {
    pub fn new(source: S, clock: T) -> Self {
        Self::with_timeout(source, clock, DEFAULT_PRICE_TIMEOUT_SECS)
    }

    pub fn with_timeout(source: S, clock: T, timeout_secs: i64) -> Self {
        Self {
            source,
            clock,
            timeout_secs,
        }
    }

    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }

    fn check_round(&self, round: &RoundData) -> Result<(), EngineError> {
        if round.updated_at == 0 || round.answered_in_round < round.round_id {
            msg!("Round {} incomplete", round.round_id);
            return Err(EngineError::PriceDataStale);
        }

        let age = self.clock.unix_timestamp().saturating_sub(round.updated_at);
        if age > self.timeout_secs {
            msg!("Price data stale: {} seconds old", age);
            return Err(EngineError::PriceDataStale);
        }

        Ok(())
    }
}

impl<S: RoundDataSource, T: TimeSource> PriceFeed for StaleCheckedFeed<S, T> {
    fn latest_price(&self) -> Result<OraclePrice, EngineError> {
        let round = self.source.latest_round_data()?;
        self.check_round(&round)?;

        if round.answer <= 0 {
            msg!("Rejecting non-positive answer {}", round.answer);
            return Err(EngineError::InvalidPrice);
        }

        Ok(OraclePrice::new(round.answer as u128, self.source.decimals()))
    }
}
