// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::ProductId;
use crate::model::Product;

/// Tracks which products are marked for purchase. Membership is a set, but
/// insertion order is kept so display order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartLedger {
    selected: Vec<ProductId>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sole mutator: inserts the id if absent, removes it if present.
    pub fn toggle(&mut self, id: ProductId) {
        if let Some(position) = self.selected.iter().position(|have| *have == id) {
            self.selected.remove(position);
        } else {
            self.selected.push(id);
        }
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.selected.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_ids(&self) -> &[ProductId] {
        &self.selected
    }

    /// One-off purchase intent, independent of cart membership. Produces the
    /// confirmation line and nothing else.
    pub fn buy_now(&self, product: &Product) -> String {
        format!("buying: {} for ${:.2}", product.title, product.price)
    }
}

#[cfg(test)]
mod tests {
    use super::CartLedger;
    use crate::ids::ProductId;
    use crate::model::Product;

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut cart = CartLedger::new();
        let id = ProductId::new(7);

        assert!(!cart.contains(id));
        cart.toggle(id);
        assert!(cart.contains(id));
        cart.toggle(id);
        assert!(!cart.contains(id));
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn count_tracks_ids_toggled_an_odd_number_of_times() {
        let mut cart = CartLedger::new();
        for id in [1, 2, 1, 3, 2, 2] {
            cart.toggle(ProductId::new(id));
        }

        // 1 twice, 2 three times, 3 once.
        assert_eq!(cart.count(), 2);
        assert!(!cart.contains(ProductId::new(1)));
        assert!(cart.contains(ProductId::new(2)));
        assert!(cart.contains(ProductId::new(3)));
    }

    #[test]
    fn toggle_sequence_from_reference_walkthrough() {
        let mut cart = CartLedger::new();
        cart.toggle(ProductId::new(1));
        cart.toggle(ProductId::new(2));
        cart.toggle(ProductId::new(1));

        assert_eq!(cart.count(), 1);
        assert!(!cart.contains(ProductId::new(1)));
        assert!(cart.contains(ProductId::new(2)));
    }

    #[test]
    fn selection_keeps_insertion_order() {
        let mut cart = CartLedger::new();
        cart.toggle(ProductId::new(9));
        cart.toggle(ProductId::new(4));
        cart.toggle(ProductId::new(6));

        let order: Vec<i64> = cart.selected_ids().iter().map(|id| id.get()).collect();
        assert_eq!(order, vec![9, 4, 6]);
    }

    #[test]
    fn buy_now_names_the_product_and_leaves_the_cart_alone() {
        let cart = CartLedger::new();
        let product = Product {
            id: ProductId::new(3),
            title: "Red Shirt".to_owned(),
            description: String::new(),
            price: 19.99,
            image: "u".to_owned(),
        };

        let notice = cart.buy_now(&product);
        assert_eq!(notice, "buying: Red Shirt for $19.99");
        assert_eq!(cart.count(), 0);
        assert!(!cart.contains(product.id));
    }
}
