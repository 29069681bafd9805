//! Oracle adapter boundary
//!
//! The engine reads USD prices through `PriceFeed`. It performs no staleness
//! or bounds validation of its own: a feed that returns an old or manipulated
//! answer is trusted as-is. Wrap untrusted sources in `StaleCheckedFeed`.

pub mod stale_check;

use std::rc::Rc;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::EngineError;

pub use stale_check::*;

/// USD price of one whole unit of an asset, `value / 10^decimals`
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePrice {
    pub value: u128,
    pub decimals: u8,
}

impl OraclePrice {
    pub fn new(value: u128, decimals: u8) -> Self {
        Self { value, decimals }
    }
}

pub trait PriceFeed {
    fn latest_price(&self) -> Result<OraclePrice, EngineError>;
}

impl<T: PriceFeed + ?Sized> PriceFeed for Rc<T> {
    fn latest_price(&self) -> Result<OraclePrice, EngineError> {
        (**self).latest_price()
    }
}

impl<T: PriceFeed + ?Sized> PriceFeed for Box<T> {
    fn latest_price(&self) -> Result<OraclePrice, EngineError> {
        (**self).latest_price()
    }
}

/// Feed with a constant answer, for fixed-price assets
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceFeed {
    price: OraclePrice,
}

impl FixedPriceFeed {
    pub fn new(value: u128, decimals: u8) -> Self {
        Self {
            price: OraclePrice::new(value, decimals),
        }
    }
}

impl PriceFeed for FixedPriceFeed {
    fn latest_price(&self) -> Result<OraclePrice, EngineError> {
        Ok(self.price)
    }
}
