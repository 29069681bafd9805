#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use collateral_engine::{
    math::PRECISION,
    oracle::{OraclePrice, PriceFeed},
    state::EngineConfig,
    token::{CollateralToken, IssuanceToken},
    CollateralEngine, EngineError,
};
use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

pub type TestEngine = CollateralEngine<Rc<MockCollateralToken>, Rc<MockIssuanceToken>>;

pub const FEED_DECIMALS: u8 = 8;
pub const ETH_USD_PRICE: u128 = 2_000_00000000;
pub const BTC_USD_PRICE: u128 = 1_000_00000000;

/// Whole units at 18 decimals
pub fn units(amount: u128) -> u128 {
    amount * PRECISION
}

/// USD price with feed decimals
pub fn usd(dollars: u128) -> u128 {
    dollars * 100_000_000
}

pub struct MockPriceFeed {
    price: Cell<OraclePrice>,
    failure: Cell<Option<EngineError>>,
}

impl MockPriceFeed {
    pub fn new(value: u128) -> Rc<Self> {
        Rc::new(Self {
            price: Cell::new(OraclePrice::new(value, FEED_DECIMALS)),
            failure: Cell::new(None),
        })
    }

    pub fn set_price(&self, value: u128) {
        self.price.set(OraclePrice::new(value, FEED_DECIMALS));
    }

    pub fn fail_with(&self, error: Option<EngineError>) {
        self.failure.set(error);
    }
}

impl PriceFeed for MockPriceFeed {
    fn latest_price(&self) -> Result<OraclePrice, EngineError> {
        match self.failure.get() {
            Some(error) => Err(error),
            None => Ok(self.price.get()),
        }
    }
}

fn debit(balances: &mut BTreeMap<Pubkey, u128>, owner: &Pubkey, amount: u128) -> ProgramResult {
    let balance = balances.entry(*owner).or_default();
    *balance = balance.checked_sub(amount).ok_or(ProgramError::InsufficientFunds)?;
    Ok(())
}

fn credit(balances: &mut BTreeMap<Pubkey, u128>, owner: &Pubkey, amount: u128) {
    *balances.entry(*owner).or_default() += amount;
}

/// Collateral token program with one balance sheet per asset
#[derive(Default)]
pub struct MockCollateralToken {
    balances: RefCell<BTreeMap<Pubkey, BTreeMap<Pubkey, u128>>>,
    fail_transfers: Cell<bool>,
    transfer_count: Cell<u32>,
    hook: RefCell<Option<Box<dyn Fn()>>>,
}

impl MockCollateralToken {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fund(&self, asset: &Pubkey, owner: &Pubkey, amount: u128) {
        credit(self.balances.borrow_mut().entry(*asset).or_default(), owner, amount);
    }

    pub fn balance_of(&self, asset: &Pubkey, owner: &Pubkey) -> u128 {
        self.balances
            .borrow()
            .get(asset)
            .and_then(|sheet| sheet.get(owner).copied())
            .unwrap_or(0)
    }

    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }

    pub fn transfer_count(&self) -> u32 {
        self.transfer_count.get()
    }

    /// Run `hook` at the start of every transfer, like a token callback
    pub fn set_hook(&self, hook: impl Fn() + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn clear_hook(&self) {
        self.hook.borrow_mut().take();
    }

    fn move_tokens(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook();
        }
        if self.fail_transfers.get() {
            return Err(ProgramError::Custom(0xdead));
        }

        let mut balances = self.balances.borrow_mut();
        let sheet = balances.entry(*asset).or_default();
        debit(sheet, from, amount)?;
        credit(sheet, to, amount);
        self.transfer_count.set(self.transfer_count.get() + 1);
        Ok(())
    }
}

impl CollateralToken for MockCollateralToken {
    fn transfer_from(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        self.move_tokens(asset, from, to, amount)
    }

    fn transfer(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        self.move_tokens(asset, from, to, amount)
    }
}

#[derive(Default)]
pub struct MockIssuanceToken {
    balances: RefCell<BTreeMap<Pubkey, u128>>,
    total_supply: Cell<u128>,
    fail_mints: Cell<bool>,
    fail_burns: Cell<bool>,
    fail_transfers: Cell<bool>,
}

impl MockIssuanceToken {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.balances.borrow().get(owner).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply.get()
    }

    pub fn set_fail_mints(&self, fail: bool) {
        self.fail_mints.set(fail);
    }

    pub fn set_fail_burns(&self, fail: bool) {
        self.fail_burns.set(fail);
    }

    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }

    /// Move tokens between holders outside the engine
    pub fn send(&self, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        let mut balances = self.balances.borrow_mut();
        debit(&mut balances, from, amount)?;
        credit(&mut balances, to, amount);
        Ok(())
    }
}

impl IssuanceToken for MockIssuanceToken {
    fn mint(&self, to: &Pubkey, amount: u128) -> ProgramResult {
        if self.fail_mints.get() {
            return Err(ProgramError::Custom(0xbeef));
        }
        credit(&mut self.balances.borrow_mut(), to, amount);
        self.total_supply.set(self.total_supply.get() + amount);
        Ok(())
    }

    fn burn(&self, holder: &Pubkey, amount: u128) -> ProgramResult {
        if self.fail_burns.get() {
            return Err(ProgramError::Custom(0xdead));
        }
        debit(&mut self.balances.borrow_mut(), holder, amount)?;
        self.total_supply.set(self.total_supply.get() - amount);
        Ok(())
    }

    fn transfer_from(&self, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        if self.fail_transfers.get() {
            return Err(ProgramError::Custom(0xdead));
        }
        self.send(from, to, amount)
    }
}

/// Engine over WETH ($2,000) and WBTC ($1,000) with default risk parameters
pub struct TestContext {
    pub engine: Rc<TestEngine>,
    pub custody: Pubkey,
    pub weth: Pubkey,
    pub wbtc: Pubkey,
    pub weth_feed: Rc<MockPriceFeed>,
    pub wbtc_feed: Rc<MockPriceFeed>,
    pub collateral: Rc<MockCollateralToken>,
    pub issuance: Rc<MockIssuanceToken>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(adjust: impl FnOnce(EngineConfig) -> EngineConfig) -> Self {
        let custody = Pubkey::new_unique();
        let config = adjust(EngineConfig::new(custody, Pubkey::new_unique()));

        let weth = Pubkey::new_unique();
        let wbtc = Pubkey::new_unique();
        let weth_feed = MockPriceFeed::new(ETH_USD_PRICE);
        let wbtc_feed = MockPriceFeed::new(BTC_USD_PRICE);
        let collateral = MockCollateralToken::new();
        let issuance = MockIssuanceToken::new();

        let feeds: Vec<Box<dyn PriceFeed>> = vec![Box::new(weth_feed.clone()), Box::new(wbtc_feed.clone())];
        let engine = CollateralEngine::new(
            config,
            vec![weth, wbtc],
            feeds,
            collateral.clone(),
            issuance.clone(),
        )
        .unwrap();

        Self {
            engine: Rc::new(engine),
            custody,
            weth,
            wbtc,
            weth_feed,
            wbtc_feed,
            collateral,
            issuance,
        }
    }

    /// Fresh user holding `amount` of `asset` in their wallet
    pub fn funded_user(&self, asset: &Pubkey, amount: u128) -> Pubkey {
        let user = Pubkey::new_unique();
        self.collateral.fund(asset, &user, amount);
        user
    }

    /// Fresh user with `collateral` WETH deposited and `debt` minted
    pub fn open_position(&self, collateral: u128, debt: u128) -> Pubkey {
        let user = self.funded_user(&self.weth, collateral);
        self.engine
            .deposit_collateral_and_mint(&user, &self.weth, collateral, debt)
            .unwrap();
        user
    }
}
