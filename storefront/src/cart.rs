use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// A pending purchase line held in the cart. `price` is the unit price
/// snapshot taken when the item was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: u32,
    pub slug: String,
}

/// Item data without a quantity, as supplied by "add to cart" actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: f64,
}

/// Persistence seam for the cart, standing in for browser-local storage.
///
/// Saving is best-effort: the cart keeps working in memory when the backing
/// store is unavailable.
pub trait CartPersistence: Send {
    fn load(&self) -> Option<CartState>;
    fn save(&mut self, state: &CartState);
}

/// Keeps the cart for the lifetime of the store only.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    state: Option<CartState>,
}

impl CartPersistence for InMemoryPersistence {
    fn load(&self) -> Option<CartState> {
        self.state.clone()
    }

    fn save(&mut self, state: &CartState) {
        self.state = Some(state.clone());
    }
}

/// Persists the cart as a JSON file so it survives restarts.
#[derive(Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartPersistence for JsonFilePersistence {
    fn load(&self) -> Option<CartState> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable cart state");
                None
            }
        }
    }

    fn save(&mut self, state: &CartState) {
        let serialized = match serde_json::to_string(state) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart state");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist cart state");
        }
    }
}

/// The client's pending purchase selection with derived totals.
///
/// An explicit, constructor-injected state container: callers own the store
/// and pass it where it is needed instead of reaching for a global. Every
/// operation is a total function over the in-memory state; totals are
/// recomputed and the state handed to the persistence seam after each
/// mutation.
pub struct CartStore {
    state: CartState,
    persistence: Box<dyn CartPersistence>,
}

impl CartStore {
    /// Create a store, restoring any previously persisted state.
    pub fn new(persistence: Box<dyn CartPersistence>) -> Self {
        let state = persistence.load().unwrap_or_default();
        Self { state, persistence }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    pub fn total_items(&self) -> u32 {
        self.state.total_items
    }

    pub fn total_price(&self) -> f64 {
        self.state.total_price
    }

    /// Add one unit of `line` to the cart. An existing entry with the same
    /// id has its quantity incremented; otherwise the item is inserted with
    /// quantity 1.
    pub fn add_item(&mut self, line: CartLine) {
        match self.state.items.iter_mut().find(|i| i.id == line.id) {
            Some(existing) => existing.quantity += 1,
            None => self.state.items.push(CartItem {
                id: line.id,
                name: line.name,
                price: line.price,
                image: line.image,
                quantity: 1,
                slug: line.slug,
            }),
        }
        self.commit();
    }

    /// Remove the entry with the given id, if present.
    pub fn remove_item(&mut self, id: &str) {
        self.state.items.retain(|i| i.id != id);
        self.commit();
    }

    /// Set the quantity of an entry directly. A quantity of zero removes
    /// the entry; no upper bound is enforced.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            return self.remove_item(id);
        }

        if let Some(item) = self.state.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
        self.commit();
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.state.items.clear();
        self.commit();
    }

    fn commit(&mut self) {
        self.state.total_items = self.state.items.iter().map(|i| i.quantity).sum();
        self.state.total_price = self
            .state
            .items
            .iter()
            .map(|i| i.price * i.quantity as f64)
            .sum();
        self.persistence.save(&self.state);
    }
}
