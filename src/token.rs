use crate::account::Address;
use crate::error::LedgerError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Fungible token ledger the engine stakes with and the treasury pays out of.
pub trait TokenLedger: Send + Sync {
    fn address(&self) -> &Address;
    fn symbol(&self) -> &str;
    fn balance_of(&self, account: &Address) -> u128;
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128);
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

pub type SharedToken = Arc<Mutex<dyn TokenLedger>>;

/// Push-only native currency ledger.
pub trait NativeLedger: Send + Sync {
    fn balance_of(&self, account: &Address) -> u128;
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;
}

pub type SharedNative = Arc<Mutex<dyn NativeLedger>>;

fn move_balance(
    balances: &mut HashMap<Address, u128>,
    from: &Address,
    to: &Address,
    amount: u128,
) -> Result<(), LedgerError> {
    let available = balances.get(from).copied().unwrap_or(0);
    if available < amount {
        return Err(LedgerError::InsufficientFunds {
            account: from.clone(),
            needed: amount,
            available,
        });
    }
    if from == to {
        return Ok(());
    }
    let credited = balances
        .get(to)
        .copied()
        .unwrap_or(0)
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Overflow { account: to.clone() })?;
    balances.insert(from.clone(), available - amount);
    balances.insert(to.clone(), credited);
    Ok(())
}

/// ERC-20 style token kept in memory.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    address: Address,
    symbol: String,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

impl InMemoryToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            address: Address::generate(),
            symbol: symbol.into(),
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn into_shared(self) -> Arc<Mutex<InMemoryToken>> {
        Arc::new(Mutex::new(self))
    }

    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let overflow = || LedgerError::Overflow { account: to.clone() };
        let supply = self.total_supply.checked_add(amount).ok_or_else(overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        debug!("Minted {} {} to {}", amount, self.symbol, to);
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

impl TokenLedger for InMemoryToken {
    fn address(&self) -> &Address {
        &self.address
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((owner.clone(), spender.clone()), amount);
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        move_balance(&mut self.balances, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                needed: amount,
                available: allowed,
            });
        }
        move_balance(&mut self.balances, from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), allowed - amount);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryNativeLedger {
    balances: HashMap<Address, u128>,
}

impl InMemoryNativeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> Arc<Mutex<InMemoryNativeLedger>> {
        Arc::new(Mutex::new(self))
    }

    pub fn fund(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                account: account.clone(),
            })?;
        self.balances.insert(account.clone(), balance);
        Ok(())
    }
}

impl NativeLedger for InMemoryNativeLedger {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        move_balance(&mut self.balances, from, to, amount)
    }
}
