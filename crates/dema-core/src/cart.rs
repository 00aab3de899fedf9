//! Quote cart: the list of SKUs a visitor wants a quote for.
//!
//! Persistence goes through the [`CartStore`] port so the cart can be backed
//! by a JSON file (CLI), or kept in memory (tests).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::quote::QuoteItem;
use crate::CartError;

/// One line of the quote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
}

/// Product details supplied when adding to the cart. Quantity and notes are
/// owned by the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub sku: String,
    pub name: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

/// Everything the cart persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Set once the cart panel has been opened automatically this session.
    #[serde(default)]
    pub popup_shown: bool,
}

/// Persistence port for [`QuoteCart`].
pub trait CartStore {
    /// Load the persisted state.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backing storage cannot be read.
    fn load(&self) -> Result<CartState, CartError>;

    /// Persist `state`, replacing whatever was stored before.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backing storage cannot be written.
    fn save(&self, state: &CartState) -> Result<(), CartError>;
}

impl<T: CartStore + ?Sized> CartStore for &T {
    fn load(&self) -> Result<CartState, CartError> {
        (**self).load()
    }

    fn save(&self, state: &CartState) -> Result<(), CartError> {
        (**self).save(state)
    }
}

/// In-memory store, shared by reference so tests can inspect what was saved.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    state: Mutex<CartState>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn with_state(state: CartState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Snapshot of the last saved state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Result<CartState, CartError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &CartState) -> Result<(), CartError> {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state.clone();
        Ok(())
    }
}

/// Stores the cart as pretty JSON on disk. A missing file is an empty cart.
#[derive(Debug, Clone)]
pub struct JsonFileCartStore {
    path: PathBuf,
}

impl JsonFileCartStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CartError {
        CartError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CartStore for JsonFileCartStore {
    fn load(&self) -> Result<CartState, CartError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| CartError::Decode {
                path: self.path.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CartState::default()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, state: &CartState) -> Result<(), CartError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }
}

/// Cart service. Every mutation is written through to the store.
pub struct QuoteCart<S: CartStore> {
    store: S,
    state: CartState,
}

impl<S: CartStore> QuoteCart<S> {
    /// Open the cart from `store`. Unreadable state is logged and replaced
    /// with an empty cart.
    pub fn open(store: S) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load quote cart; starting empty");
            CartState::default()
        });
        Self { store, state }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.state
            .items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Add one unit of `item`. An SKU already in the cart has its quantity
    /// incremented instead of getting a second line.
    ///
    /// Returns `true` when this is the first add of the session, i.e. when
    /// the storefront should open the cart panel.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the store rejects the write.
    pub fn add(&mut self, item: NewCartItem) -> Result<bool, CartError> {
        if let Some(existing) = self.state.items.iter_mut().find(|i| i.sku == item.sku) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.state.items.push(CartItem {
                sku: item.sku,
                name: item.name,
                image_url: item.image_url,
                category: item.category,
                quantity: 1,
                notes: String::new(),
            });
        }

        let first_add = !self.state.popup_shown;
        self.state.popup_shown = true;
        self.persist()?;
        Ok(first_add)
    }

    /// Remove the line for `sku`. Unknown SKUs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the store rejects the write.
    pub fn remove(&mut self, sku: &str) -> Result<(), CartError> {
        self.state.items.retain(|i| i.sku != sku);
        self.persist()
    }

    /// Set the quantity for `sku`; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the store rejects the write.
    pub fn update_quantity(&mut self, sku: &str, quantity: i64) -> Result<(), CartError> {
        let Ok(quantity) = u32::try_from(quantity) else {
            return if quantity <= 0 {
                self.remove(sku)
            } else {
                self.set_quantity(sku, u32::MAX)
            };
        };
        if quantity == 0 {
            return self.remove(sku);
        }
        self.set_quantity(sku, quantity)
    }

    fn set_quantity(&mut self, sku: &str, quantity: u32) -> Result<(), CartError> {
        if let Some(item) = self.state.items.iter_mut().find(|i| i.sku == sku) {
            item.quantity = quantity;
        }
        self.persist()
    }

    /// Replace the free-text notes of `sku`.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the store rejects the write.
    pub fn update_notes(&mut self, sku: &str, notes: impl Into<String>) -> Result<(), CartError> {
        if let Some(item) = self.state.items.iter_mut().find(|i| i.sku == sku) {
            item.notes = notes.into();
        }
        self.persist()
    }

    /// Empty the cart. The session popup flag is kept.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the store rejects the write.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.state.items.clear();
        self.persist()
    }

    /// Lines in the shape expected by a quote submission.
    #[must_use]
    pub fn to_quote_items(&self) -> Vec<QuoteItem> {
        self.state
            .items
            .iter()
            .map(|i| QuoteItem {
                sku: i.sku.clone(),
                name: i.name.clone(),
                quantity: i.quantity,
                category: i.category.clone(),
                notes: Some(i.notes.clone()).filter(|n| !n.trim().is_empty()),
            })
            .collect()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self) -> Result<(), CartError> {
        self.store.save(&self.state)
    }
}
