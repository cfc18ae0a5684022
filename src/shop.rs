//! Unlock catalog
//!
//! A fixed, cyclic list of vehicles. Each has a price and a persisted lock state;
//! the wallet is the same money total that finished runs add to. Stats are shown
//! as bars normalized against the catalog-wide maximum of each stat.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_UNLOCK_PRICE;
use crate::error::{ConfigError, ShopError};
use crate::persistence::{PrefKey, PrefsStore};
use crate::sim::Vehicle;

/// Per-entry lock state, persisted as 0/1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockState {
    #[default]
    Locked,
    Unlocked,
}

impl LockState {
    pub fn as_int(self) -> i32 {
        match self {
            LockState::Locked => 0,
            LockState::Unlocked => 1,
        }
    }

    /// Only 1 means unlocked
    pub fn from_int(value: i32) -> Self {
        if value == 1 {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }
}

/// Vehicle stats, only used for the shop display
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatVector {
    pub speed: f32,
    pub turn_rate: f32,
    pub health: f32,
    pub damage_power: f32,
}

impl StatVector {
    fn as_array(&self) -> [f32; 4] {
        [self.speed, self.turn_rate, self.health, self.damage_power]
    }

    fn is_valid(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Elementwise maximum
    fn max(&self, other: &StatVector) -> StatVector {
        StatVector {
            speed: self.speed.max(other.speed),
            turn_rate: self.turn_rate.max(other.turn_rate),
            health: self.health.max(other.health),
            damage_power: self.damage_power.max(other.damage_power),
        }
    }

    /// Each stat divided by its maximum; a zero maximum gives 0
    pub fn normalized(&self, maxima: &StatVector) -> StatVector {
        let ratio = |v: f32, max: f32| if max > 0.0 { v / max } else { 0.0 };
        StatVector {
            speed: ratio(self.speed, maxima.speed),
            turn_rate: ratio(self.turn_rate, maxima.turn_rate),
            health: ratio(self.health, maxima.health),
            damage_power: ratio(self.damage_power, maxima.damage_power),
        }
    }
}

/// Load-time description of a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Identifier, also the lock-state preference key
    pub id: String,
    pub price: i32,
    /// Lock state used when nothing was persisted yet
    pub lock_state: LockState,
    pub stats: StatVector,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            price: DEFAULT_UNLOCK_PRICE,
            lock_state: LockState::Locked,
            stats: StatVector::default(),
        }
    }
}

/// Shop tuning and entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Preference name of the wallet
    pub money_key: String,
    /// Preference name of the active selection index
    pub current_key: String,
    pub entries: Vec<EntryConfig>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            money_key: "Money".to_string(),
            current_key: "CurrentCar".to_string(),
            entries: Vec::new(),
        }
    }
}

impl ShopConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(ConfigError::EmptyEntryId);
            }
            if entry.price < 0 {
                return Err(ConfigError::NegativePrice {
                    id: entry.id.clone(),
                    price: entry.price,
                });
            }
            if !entry.stats.is_valid() {
                return Err(ConfigError::InvalidStats {
                    id: entry.id.clone(),
                });
            }
            if self.entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(ConfigError::DuplicateEntry(entry.id.clone()));
            }
        }
        Ok(())
    }
}

/// A purchasable vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockEntry {
    pub id: String,
    price: i32,
    pub lock_state: LockState,
    pub stats: StatVector,
}

impl UnlockEntry {
    pub fn price(&self) -> i32 {
        self.price
    }

    pub fn is_unlocked(&self) -> bool {
        self.lock_state == LockState::Unlocked
    }

    fn key(&self) -> PrefKey {
        PrefKey::lock_state(&self.id)
    }
}

/// What the shop shows for the current entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Owned; confirming starts a session with it
    Selectable,
    Locked { price: i32, affordable: bool },
}

/// Display state after navigation or purchase
#[derive(Debug, Clone, PartialEq)]
pub struct ShopView {
    pub index: usize,
    pub id: String,
    pub stats: StatVector,
    /// Stats normalized to [0, 1] against the catalog maxima
    pub bars: StatVector,
    pub offer: Offer,
    pub balance: i32,
}

/// Result of the single select/buy button
#[derive(Debug, Clone, PartialEq)]
pub enum ShopAction {
    /// Start a session with this vehicle
    Start(Vehicle),
    Purchased(ShopView),
}

/// Notifications for the host, drained after each shop action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopEvent {
    /// An entry was bought; the host plays its unlock effect
    Unlocked { id: String, price: i32, balance: i32 },
}

#[derive(Debug, Clone)]
pub struct UnlockCatalog {
    entries: Vec<UnlockEntry>,
    current: usize,
    balance: i32,
    maxima: StatVector,
    money_key: PrefKey,
    current_key: PrefKey,
    events: Vec<ShopEvent>,
}

impl UnlockCatalog {
    /// Validate entries and restore wallet, selection and lock states from `store`
    pub fn load(config: &ShopConfig, store: &dyn PrefsStore) -> Result<Self, ConfigError> {
        config.validate()?;

        let entries: Vec<UnlockEntry> = config
            .entries
            .iter()
            .map(|e| UnlockEntry {
                id: e.id.clone(),
                price: e.price,
                lock_state: LockState::from_int(
                    store.get_int(&PrefKey::lock_state(&e.id), e.lock_state.as_int()),
                ),
                stats: e.stats,
            })
            .collect();

        let maxima = entries
            .iter()
            .fold(StatVector::default(), |acc, e| acc.max(&e.stats));

        let mut catalog = Self {
            entries,
            current: 0,
            balance: 0,
            maxima,
            money_key: PrefKey::Money(config.money_key.clone()),
            current_key: PrefKey::CurrentSelection(config.current_key.clone()),
            events: Vec::new(),
        };
        catalog.refresh_balance(store);
        catalog.current = catalog.persisted_index(store);
        log::info!(
            "Shop loaded: {} entries, balance {}, current {}",
            catalog.entries.len(),
            catalog.balance,
            catalog.current
        );
        Ok(catalog)
    }

    fn persisted_index(&self, store: &dyn PrefsStore) -> usize {
        let stored = store.get_int(&self.current_key, 0);
        match usize::try_from(stored) {
            Ok(i) if i < self.entries.len() => i,
            _ => {
                if !self.entries.is_empty() {
                    log::warn!("Stored selection {} out of range, using 0", stored);
                }
                0
            }
        }
    }

    pub fn entries(&self) -> &[UnlockEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&UnlockEntry> {
        self.entries.get(self.current)
    }

    pub fn balance(&self) -> i32 {
        self.balance
    }

    pub fn stat_maxima(&self) -> StatVector {
        self.maxima
    }

    pub fn drain_events(&mut self) -> Vec<ShopEvent> {
        std::mem::take(&mut self.events)
    }

    /// Re-read the wallet (runs add to it between shop visits)
    pub fn refresh_balance(&mut self, store: &dyn PrefsStore) {
        self.balance = store.get_int(&self.money_key, 0).max(0);
    }

    /// Shop opened: refresh the wallet and selection, then show the current entry
    pub fn open(&mut self, store: &mut dyn PrefsStore) -> Result<ShopView, ShopError> {
        self.refresh_balance(store);
        self.current = self.persisted_index(store);
        self.change_item(0, store)
    }

    /// Move `delta` entries, wrapping both ways, and refresh the display.
    ///
    /// Landing on an owned entry persists it as the active selection.
    pub fn change_item(
        &mut self,
        delta: i32,
        store: &mut dyn PrefsStore,
    ) -> Result<ShopView, ShopError> {
        if self.entries.is_empty() {
            return Err(ShopError::EmptyCatalog);
        }
        let len = self.entries.len() as i64;
        self.current = (self.current as i64 + delta as i64).rem_euclid(len) as usize;

        let entry = &mut self.entries[self.current];
        entry.lock_state =
            LockState::from_int(store.get_int(&entry.key(), entry.lock_state.as_int()));

        let offer = if entry.is_unlocked() {
            store.set_int(&self.current_key, self.current as i32);
            Offer::Selectable
        } else {
            Offer::Locked {
                price: entry.price,
                affordable: self.balance >= entry.price,
            }
        };
        Ok(self.view(offer))
    }

    fn view(&self, offer: Offer) -> ShopView {
        let entry = &self.entries[self.current];
        ShopView {
            index: self.current,
            id: entry.id.clone(),
            stats: entry.stats,
            bars: entry.stats.normalized(&self.maxima),
            offer,
            balance: self.balance,
        }
    }

    /// Buy the current entry
    pub fn purchase(&mut self, store: &mut dyn PrefsStore) -> Result<ShopView, ShopError> {
        let balance = self.balance;
        let entry = self
            .entries
            .get_mut(self.current)
            .ok_or(ShopError::EmptyCatalog)?;
        if entry.is_unlocked() {
            return Err(ShopError::AlreadyUnlocked);
        }
        if balance < entry.price {
            log::info!(
                "Cannot afford {}: price {}, balance {}",
                entry.id,
                entry.price,
                balance
            );
            return Err(ShopError::InsufficientFunds {
                price: entry.price,
                balance,
            });
        }

        entry.lock_state = LockState::Unlocked;
        store.set_int(&entry.key(), LockState::Unlocked.as_int());
        self.balance = balance - entry.price;
        store.set_int(&self.money_key, self.balance);
        log::info!("Unlocked {} for {}, balance {}", entry.id, entry.price, self.balance);
        self.events.push(ShopEvent::Unlocked {
            id: entry.id.clone(),
            price: entry.price,
            balance: self.balance,
        });

        self.change_item(0, store)
    }

    /// The select button: start with an owned entry, otherwise try to buy it
    pub fn confirm(&mut self, store: &mut dyn PrefsStore) -> Result<ShopAction, ShopError> {
        match self.select() {
            Ok(vehicle) => Ok(ShopAction::Start(vehicle)),
            Err(ShopError::Locked) => self.purchase(store).map(ShopAction::Purchased),
            Err(e) => Err(e),
        }
    }

    /// Vehicle for the current entry if it is owned
    pub fn select(&self) -> Result<Vehicle, ShopError> {
        let entry = self.current().ok_or(ShopError::EmptyCatalog)?;
        if !entry.is_unlocked() {
            return Err(ShopError::Locked);
        }
        Ok(Vehicle::new(entry.id.clone(), entry.stats.health))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn entry(id: &str, price: i32, stats: StatVector) -> EntryConfig {
        EntryConfig {
            id: id.to_string(),
            price,
            lock_state: LockState::Locked,
            stats,
        }
    }

    fn stats(speed: f32, health: f32) -> StatVector {
        StatVector {
            speed,
            turn_rate: 0.0,
            health,
            damage_power: 1.0,
        }
    }

    fn three_cars() -> ShopConfig {
        let mut starter = entry("Starter", 0, stats(10.0, 3.0));
        starter.lock_state = LockState::Unlocked;
        ShopConfig {
            entries: vec![
                starter,
                entry("Racer", 1000, stats(20.0, 2.0)),
                entry("Tank", 2000, stats(5.0, 6.0)),
            ],
            ..Default::default()
        }
    }

    fn money() -> PrefKey {
        PrefKey::Money("Money".into())
    }

    #[test]
    fn test_validate() {
        let mut config = three_cars();
        config.entries[1].price = -5;
        assert!(matches!(
            UnlockCatalog::load(&config, &MemoryStore::new()),
            Err(ConfigError::NegativePrice { .. })
        ));

        let mut config = three_cars();
        config.entries[2].id = "Starter".into();
        assert!(matches!(
            UnlockCatalog::load(&config, &MemoryStore::new()),
            Err(ConfigError::DuplicateEntry(_))
        ));

        let mut config = three_cars();
        config.entries[0].stats.speed = -1.0;
        assert!(UnlockCatalog::load(&config, &MemoryStore::new()).is_err());
    }

    #[test]
    fn test_purchase_scenario() {
        let mut config = three_cars();
        config.entries[0].price = 500;
        config.entries[0].lock_state = LockState::Locked;
        let mut store = MemoryStore::new();
        store.set_int(&money(), 1200);
        let mut shop = UnlockCatalog::load(&config, &store).unwrap();

        let view = shop.change_item(1, &mut store).unwrap();
        assert_eq!(view.offer, Offer::Locked { price: 1000, affordable: true });

        let view = shop.purchase(&mut store).unwrap();
        assert_eq!(view.offer, Offer::Selectable);
        assert_eq!(shop.balance(), 200);
        assert_eq!(store.get_int(&money(), 0), 200);
        assert_eq!(store.get_int(&PrefKey::lock_state("Racer"), 0), 1);
        assert_eq!(
            shop.drain_events(),
            vec![ShopEvent::Unlocked {
                id: "Racer".to_string(),
                price: 1000,
                balance: 200
            }]
        );

        shop.change_item(1, &mut store).unwrap();
        assert_eq!(
            shop.purchase(&mut store),
            Err(ShopError::InsufficientFunds {
                price: 2000,
                balance: 200
            })
        );
        assert_eq!(shop.balance(), 200);
        assert_eq!(store.get_int(&money(), 0), 200);
        assert!(shop.drain_events().is_empty());
    }

    #[test]
    fn test_purchase_is_idempotent_once_unlocked() {
        let mut store = MemoryStore::new();
        store.set_int(&money(), 5000);
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        shop.change_item(1, &mut store).unwrap();
        shop.purchase(&mut store).unwrap();
        assert_eq!(shop.purchase(&mut store), Err(ShopError::AlreadyUnlocked));
        assert_eq!(shop.balance(), 4000);
    }

    #[test]
    fn test_lock_state_persists_across_sessions() {
        let mut store = MemoryStore::new();
        store.set_int(&money(), 1000);
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        shop.change_item(1, &mut store).unwrap();
        shop.purchase(&mut store).unwrap();

        let reloaded = UnlockCatalog::load(&three_cars(), &store).unwrap();
        assert!(reloaded.entries()[1].is_unlocked());
        assert_eq!(reloaded.current_index(), 1);
        assert_eq!(reloaded.balance(), 0);
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut store = MemoryStore::new();
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        assert_eq!(shop.change_item(-1, &mut store).unwrap().index, 2);
        assert_eq!(shop.change_item(1, &mut store).unwrap().index, 0);
        assert_eq!(shop.change_item(7, &mut store).unwrap().index, 1);
    }

    #[test]
    fn test_selection_only_persists_owned_entries() {
        let mut store = MemoryStore::new();
        let current = PrefKey::CurrentSelection("CurrentCar".into());
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        shop.change_item(0, &mut store).unwrap();
        assert_eq!(store.get_int(&current, -1), 0);
        shop.change_item(1, &mut store).unwrap();
        assert_eq!(store.get_int(&current, -1), 0);
    }

    #[test]
    fn test_stat_bars_normalized() {
        let mut store = MemoryStore::new();
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        let maxima = shop.stat_maxima();
        assert_eq!(maxima.speed, 20.0);
        assert_eq!(maxima.health, 6.0);

        let view = shop.change_item(0, &mut store).unwrap();
        assert_eq!(view.bars.speed, 0.5);
        assert_eq!(view.bars.health, 0.5);
        // All turn rates are 0
        assert_eq!(view.bars.turn_rate, 0.0);
        assert_eq!(view.bars.damage_power, 1.0);
    }

    #[test]
    fn test_empty_catalog() {
        let mut store = MemoryStore::new();
        let mut shop = UnlockCatalog::load(&ShopConfig::default(), &store).unwrap();
        assert!(shop.is_empty());
        assert_eq!(shop.change_item(1, &mut store), Err(ShopError::EmptyCatalog));
        assert_eq!(shop.purchase(&mut store), Err(ShopError::EmptyCatalog));
        assert_eq!(shop.confirm(&mut store), Err(ShopError::EmptyCatalog));
    }

    #[test]
    fn test_confirm_starts_or_buys() {
        let mut store = MemoryStore::new();
        store.set_int(&money(), 1000);
        let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        match shop.confirm(&mut store).unwrap() {
            ShopAction::Start(v) => {
                assert_eq!(v.id, "Starter");
                assert_eq!(v.health, 3.0);
            }
            other => panic!("expected start, got {other:?}"),
        }

        shop.change_item(1, &mut store).unwrap();
        assert!(matches!(shop.confirm(&mut store), Ok(ShopAction::Purchased(_))));
        assert!(matches!(shop.confirm(&mut store), Ok(ShopAction::Start(_))));
    }

    #[test]
    fn test_out_of_range_selection_falls_back() {
        let mut store = MemoryStore::new();
        store.set_int(&PrefKey::CurrentSelection("CurrentCar".into()), 9);
        let shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
        assert_eq!(shop.current_index(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn full_cycle_returns_to_start(start in 0i32..3, step in prop::sample::select(vec![1i32, -1])) {
                let mut store = MemoryStore::new();
                let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
                shop.change_item(start, &mut store).unwrap();
                let origin = shop.current_index();
                for _ in 0..shop.len() {
                    shop.change_item(step, &mut store).unwrap();
                }
                prop_assert_eq!(shop.current_index(), origin);
            }

            #[test]
            fn wallet_never_negative(
                wallet in 0i32..5000,
                moves in prop::collection::vec((-2i32..3, any::<bool>()), 1..30)
            ) {
                let mut store = MemoryStore::new();
                store.set_int(&money(), wallet);
                let mut shop = UnlockCatalog::load(&three_cars(), &store).unwrap();
                for (delta, buy) in moves {
                    shop.change_item(delta, &mut store).unwrap();
                    if buy {
                        let _ = shop.purchase(&mut store);
                    }
                    prop_assert!(shop.balance() >= 0);
                    prop_assert_eq!(store.get_int(&money(), 0).max(0), shop.balance());
                }
            }
        }
    }
}
