//! Line items and the cart/box mutation API.
//!
//! Pure data logic only. Persistence (session storage, the per-account
//! record store) and the login-time reconciliation flow live in the
//! storefront crate; this module owns what they all agree on: items are
//! keyed by product id, duplicates merge by summing quantity, quantities
//! never sit below one, and display order is preserved.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Which of a shopper's two item collections a value belongs to.
///
/// The personal cart and the curated school box share the same state
/// machinery; the box additionally takes a surcharge at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    /// Personal purchase list.
    Cart,
    /// Curated school-box bundle.
    Box,
}

impl CartKind {
    /// Both kinds, in the order they are reconciled at login.
    pub const ALL: [Self; 2] = [Self::Cart, Self::Box];

    /// Stable string form, used as the database discriminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Box => "box",
        }
    }

    /// Session key under which the anonymous item list is stored.
    #[must_use]
    pub const fn session_key(self) -> &'static str {
        match self {
            Self::Cart => "cart_items",
            Self::Box => "box_items",
        }
    }
}

impl fmt::Display for CartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product entry with quantity and price in a cart or box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier; unique within a collection.
    pub id: ProductId,
    /// Display title, as supplied by the catalog.
    pub title: String,
    /// Number of units; always at least 1.
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
    /// Product image URL, if the catalog provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// In-memory item collection with the full mutation API.
///
/// Invariant: no two items share a `ProductId`. Order is not semantically
/// significant but is preserved for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
    /// Transient UI-feedback marker; never persisted.
    just_added: bool,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            just_added: false,
        }
    }

    /// Build a cart from a stored item list.
    ///
    /// Stored lists should already be duplicate-free, but lists written by
    /// older code or edited out-of-band may not be; duplicates are folded
    /// by summing quantity so the invariant holds from here on.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart.just_added = false;
        cart
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart and returns its items.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item.
    ///
    /// If the product is already present its quantity grows by
    /// `item.quantity`; otherwise the item is appended. A zero quantity is
    /// normalized to 1. Sets the transient just-added marker.
    pub fn add(&mut self, item: LineItem) {
        let quantity = item.quantity.max(1);
        match self.find_mut(&item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
            }
            None => self.items.push(LineItem { quantity, ..item }),
        }
        self.just_added = true;
    }

    /// Remove the item with the given id. No-op if absent.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|item| &item.id != id);
    }

    /// Adjust an item's quantity by `delta`, clamped to a minimum of 1.
    ///
    /// Never removes the item; use [`Cart::decrease`] for the
    /// remove-at-one policy. No-op if the id is absent.
    pub fn update_quantity(&mut self, id: &ProductId, delta: i64) {
        if let Some(item) = self.find_mut(id) {
            let next = i64::from(item.quantity).saturating_add(delta).max(1);
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    /// Increase an item's quantity by one.
    pub fn increase(&mut self, id: &ProductId) {
        self.update_quantity(id, 1);
    }

    /// Decrease an item's quantity by one.
    ///
    /// A decrease that would take the quantity below 1 removes the item.
    /// Any confirm-before-remove step is a UI concern, not data policy.
    pub fn decrease(&mut self, id: &ProductId) {
        match self.find(id) {
            Some(item) if item.quantity <= 1 => self.remove(id),
            Some(_) => self.update_quantity(id, -1),
            None => {}
        }
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Flat percentage add-on over the subtotal.
    ///
    /// Applied to the box at order creation; never stored per item.
    #[must_use]
    pub fn surcharge(&self, rate: Decimal) -> Decimal {
        self.total_price() * rate
    }

    /// Returns and clears the transient just-added marker.
    ///
    /// Display affordance only; the HTTP layer turns it into a UI refresh
    /// trigger. It carries no data guarantee.
    pub fn take_just_added(&mut self) -> bool {
        core::mem::take(&mut self.just_added)
    }

    fn find(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn find_mut(&mut self, id: &ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

/// Merge an anonymous local item list into a per-account remote list.
///
/// The result is seeded from `remote`, which wins on every field except
/// quantity. A local item whose id is already present contributes its
/// quantity (`remote.quantity + local.quantity`); an unknown local item is
/// appended unchanged. Insertion order is preserved for display.
#[must_use]
pub fn merge_items(remote: Vec<LineItem>, local: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged = remote;
    for item in local {
        match merged.iter_mut().find(|m| m.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => merged.push(item),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: u32, price: i64) -> LineItem {
        LineItem {
            id: ProductId::from(id),
            title: format!("Product {id}"),
            quantity,
            price: Decimal::from(price),
            image: None,
        }
    }

    #[test]
    fn add_then_remove_restores_previous_items() {
        let mut cart = Cart::from_items(vec![item("p1", 2, 10)]);
        let before = cart.items().to_vec();

        cart.add(item("p2", 1, 5));
        cart.remove(&ProductId::from("p2"));

        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn add_merges_duplicate_ids_by_summing_quantity() {
        let mut cart = Cart::new();
        cart.add(item("p1", 2, 10));
        cart.add(item("p1", 3, 10));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn add_normalizes_zero_quantity_to_one() {
        let mut cart = Cart::new();
        cart.add(item("p1", 0, 10));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn add_sets_transient_marker_once() {
        let mut cart = Cart::new();
        assert!(!cart.take_just_added());

        cart.add(item("p1", 1, 10));
        assert!(cart.take_just_added());
        assert!(!cart.take_just_added());
    }

    #[test]
    fn update_quantity_clamps_at_one() {
        let mut cart = Cart::from_items(vec![item("p1", 3, 10)]);
        let id = ProductId::from("p1");

        cart.update_quantity(&id, -10);
        assert_eq!(cart.items()[0].quantity, 1);

        cart.update_quantity(&id, 4);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn update_quantity_ignores_unknown_id() {
        let mut cart = Cart::from_items(vec![item("p1", 1, 10)]);
        cart.update_quantity(&ProductId::from("missing"), 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn decrease_at_one_removes_the_item() {
        let mut cart = Cart::from_items(vec![item("p1", 1, 10)]);
        cart.decrease(&ProductId::from("p1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn decrease_above_one_keeps_the_item() {
        let mut cart = Cart::from_items(vec![item("p1", 2, 10)]);
        cart.decrease(&ProductId::from("p1"));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn remove_is_noop_for_unknown_id() {
        let mut cart = Cart::from_items(vec![item("p1", 1, 10)]);
        cart.remove(&ProductId::from("missing"));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn totals_and_surcharge() {
        let cart = Cart::from_items(vec![item("p1", 2, 10), item("p2", 1, 5)]);

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total_price(), Decimal::from(25));
        // 10% of 25 = 2.5
        assert_eq!(cart.surcharge(Decimal::new(1, 1)), Decimal::new(25, 1));
    }

    #[test]
    fn clear_empties_items() {
        let mut cart = Cart::from_items(vec![item("p1", 2, 10), item("p2", 1, 5)]);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn from_items_folds_duplicates() {
        let cart = Cart::from_items(vec![item("p1", 2, 10), item("p1", 3, 10)]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn merge_sums_quantities_on_conflict() {
        let merged = merge_items(vec![item("a", 3, 10)], vec![item("a", 2, 10)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity, 5);
    }

    #[test]
    fn merge_remote_wins_on_non_quantity_fields() {
        let mut local = item("a", 2, 9);
        local.title = "Stale local title".to_owned();
        let merged = merge_items(vec![item("a", 3, 10)], vec![local]);

        assert_eq!(merged[0].title, "Product a");
        assert_eq!(merged[0].price, Decimal::from(10));
        assert_eq!(merged[0].quantity, 5);
    }

    #[test]
    fn merge_appends_unknown_local_items_in_order() {
        let merged = merge_items(
            vec![item("r1", 1, 10)],
            vec![item("l1", 1, 5), item("l2", 2, 3)],
        );
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["r1", "l1", "l2"]);
    }

    #[test]
    fn merge_login_scenario() {
        // Local cart p1 x1 @ 10; remote cart p1 x2 @ 10, p2 x1 @ 5.
        let merged = merge_items(
            vec![item("p1", 2, 10), item("p2", 1, 5)],
            vec![item("p1", 1, 10)],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 3);
        assert_eq!(merged[1].quantity, 1);

        let cart = Cart::from_items(merged);
        assert_eq!(cart.total_price(), Decimal::from(35));
    }

    #[test]
    fn line_item_json_roundtrips_through_storage() {
        let original = vec![item("p1", 2, 10)];
        let json = serde_json::to_value(&original).unwrap();
        let restored: Vec<LineItem> = serde_json::from_value(json).unwrap();
        assert_eq!(restored, original);
    }
}
