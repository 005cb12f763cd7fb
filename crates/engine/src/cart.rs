//! Shopping carts and checkout sessions.
//!
//! A cart only lives inside a [`CheckoutSession`]. A user can hold at most
//! one open session; the slot is released when the session is dropped.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::{Catalog, EngineError, ItemId, ResultEngine, StallId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub stall_id: StallId,
    pub item_id: ItemId,
    pub stall_name: String,
    pub item_name: String,
    /// Price taken from the catalog when the line was added.
    pub unit_price: i64,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> ResultEngine<i64> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| EngineError::InvalidCart("line total overflow".to_string()))
    }
}

/// Lines keyed by `(stall, item)`; adding the same item twice bumps the
/// quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<(StallId, ItemId), CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn total(&self) -> ResultEngine<i64> {
        self.lines.values().try_fold(0i64, |acc, line| {
            acc.checked_add(line.subtotal()?)
                .ok_or_else(|| EngineError::InvalidCart("cart total overflow".to_string()))
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Users that currently hold an open checkout.
#[derive(Debug, Default)]
pub(crate) struct CheckoutRegistry {
    open: Mutex<HashSet<UserId>>,
}

impl CheckoutRegistry {
    fn with_open<R>(&self, f: impl FnOnce(&mut HashSet<UserId>) -> R) -> R {
        let mut open = match self.open.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut open)
    }
}

/// An open checkout for one user, owning the cart.
#[derive(Debug)]
pub struct CheckoutSession {
    user_id: UserId,
    cart: Cart,
    catalog: Arc<Catalog>,
    registry: Arc<CheckoutRegistry>,
}

impl CheckoutSession {
    pub(crate) fn open(
        user_id: UserId,
        catalog: Arc<Catalog>,
        registry: Arc<CheckoutRegistry>,
    ) -> ResultEngine<Self> {
        let inserted = registry.with_open(|open| open.insert(user_id));
        if !inserted {
            return Err(EngineError::CheckoutInProgress(format!(
                "user {user_id} already has an open checkout"
            )));
        }
        Ok(Self {
            user_id,
            cart: Cart::default(),
            catalog,
            registry,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub(crate) fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Adds `quantity` units of a catalog item.
    pub fn add(&mut self, stall_id: StallId, item_id: ItemId, quantity: u32) -> ResultEngine<()> {
        if quantity == 0 {
            return Err(EngineError::InvalidCart("quantity must be >= 1".to_string()));
        }
        let (stall, item) = self.catalog.item(stall_id, item_id)?;
        match self.cart.lines.get_mut(&(stall_id, item_id)) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| EngineError::InvalidCart("quantity overflow".to_string()))?;
            }
            None => {
                self.cart.lines.insert(
                    (stall_id, item_id),
                    CartLine {
                        stall_id,
                        item_id,
                        stall_name: stall.name.clone(),
                        item_name: item.name.clone(),
                        unit_price: item.price,
                        quantity,
                    },
                );
            }
        }
        Ok(())
    }

    /// Sets the quantity of a line; 0 removes it.
    pub fn set_quantity(
        &mut self,
        stall_id: StallId,
        item_id: ItemId,
        quantity: u32,
    ) -> ResultEngine<()> {
        if quantity == 0 {
            self.remove(stall_id, item_id);
            return Ok(());
        }
        let line = self
            .cart
            .lines
            .get_mut(&(stall_id, item_id))
            .ok_or_else(|| EngineError::InvalidCart(format!("item {item_id} is not in the cart")))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, stall_id: StallId, item_id: ItemId) {
        self.cart.lines.remove(&(stall_id, item_id));
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        let user_id = self.user_id;
        self.registry.with_open(|open| open.remove(&user_id));
    }
}
