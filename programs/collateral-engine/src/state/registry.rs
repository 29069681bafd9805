use std::collections::BTreeMap;

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    error::EngineError,
    oracle::{OraclePrice, PriceFeed},
};

/// Supported collateral assets and their price feeds, fixed at construction
pub struct CollateralRegistry {
    assets: Vec<Pubkey>,
    feeds: BTreeMap<Pubkey, Box<dyn PriceFeed>>,
}

impl CollateralRegistry {
    pub fn new(assets: Vec<Pubkey>, feeds: Vec<Box<dyn PriceFeed>>) -> Result<Self, EngineError> {
        if assets.len() != feeds.len() {
            msg!(
                "Asset list ({}) and price feed list ({}) differ in length",
                assets.len(),
                feeds.len()
            );
            return Err(EngineError::LengthMismatch);
        }

        let mut by_asset = BTreeMap::new();
        for (asset, feed) in assets.iter().zip(feeds) {
            if by_asset.insert(*asset, feed).is_some() {
                msg!("Asset {} registered twice", asset);
                return Err(EngineError::DuplicateAsset);
            }
        }

        Ok(Self {
            assets,
            feeds: by_asset,
        })
    }

    /// Supported assets in registration order
    pub fn assets(&self) -> &[Pubkey] {
        &self.assets
    }

    pub fn is_supported(&self, asset: &Pubkey) -> bool {
        self.feeds.contains_key(asset)
    }

    pub fn ensure_supported(&self, asset: &Pubkey) -> Result<(), EngineError> {
        if self.is_supported(asset) {
            Ok(())
        } else {
            msg!("Unsupported collateral asset {}", asset);
            Err(EngineError::UnsupportedAsset)
        }
    }

    pub fn feed(&self, asset: &Pubkey) -> Option<&dyn PriceFeed> {
        self.feeds.get(asset).map(|feed| feed.as_ref())
    }

    pub fn price_of(&self, asset: &Pubkey) -> Result<OraclePrice, EngineError> {
        self.feed(asset)
            .ok_or(EngineError::UnsupportedAsset)?
            .latest_price()
    }
}
