//! Wishlist

use tracing::debug;

use crate::{
    products::ProductId,
    storage::{KeyValueStore, StorageError, load_json, save_json},
};

/// Storage key holding the persisted wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

/// Saved products, each at most once, in the order they were added.
#[derive(Debug)]
pub struct Wishlist<S> {
    store: S,
    products: Vec<ProductId>,
}

impl<S: KeyValueStore> Wishlist<S> {
    /// Load the wishlist persisted in `store`, or start empty.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the stored wishlist cannot be read or decoded.
    pub fn load(store: S) -> Result<Self, StorageError> {
        let products = load_json(&store, WISHLIST_KEY)?.unwrap_or_default();

        Ok(Self { store, products })
    }

    /// Save `id`. Returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the wishlist cannot be saved.
    pub fn add(&mut self, id: ProductId) -> Result<bool, StorageError> {
        if self.contains(&id) {
            return Ok(false);
        }

        let mut products = self.products.clone();
        products.push(id.clone());

        self.commit(products)?;

        debug!(product = %id, "added product to wishlist");

        Ok(true)
    }

    /// Forget `id`. Returns `false` if it was not saved.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the wishlist cannot be saved.
    pub fn remove(&mut self, id: &ProductId) -> Result<bool, StorageError> {
        if !self.contains(id) {
            return Ok(false);
        }

        let products = self
            .products
            .iter()
            .filter(|saved| *saved != id)
            .cloned()
            .collect();

        self.commit(products)?;

        Ok(true)
    }

    /// Forget every product.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the wishlist cannot be saved.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.commit(Vec::new())
    }

    /// Whether `id` is saved
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.contains(id)
    }

    /// Number of saved products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether nothing is saved
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Saved products in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.products.iter()
    }

    fn commit(&mut self, products: Vec<ProductId>) -> Result<(), StorageError> {
        save_json(&self.store, WISHLIST_KEY, &products)?;

        self.products = products;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStore;

    use super::*;

    #[test]
    fn add_ignores_duplicates() -> TestResult {
        let mut wishlist = Wishlist::load(MemoryStore::new())?;

        assert!(wishlist.add(ProductId::from("product-1"))?);
        assert!(!wishlist.add(ProductId::from("product-1"))?);
        assert!(wishlist.add(ProductId::from("product-3"))?);

        let ids: Vec<&str> = wishlist.iter().map(ProductId::as_str).collect();

        assert_eq!(ids, vec!["product-1", "product-3"]);

        Ok(())
    }

    #[test]
    fn remove_and_clear_persist() -> TestResult {
        let store = MemoryStore::new();
        let mut wishlist = Wishlist::load(store.clone())?;

        wishlist.add(ProductId::from("product-1"))?;
        wishlist.add(ProductId::from("product-2"))?;

        assert!(wishlist.remove(&ProductId::from("product-1"))?);
        assert!(!wishlist.remove(&ProductId::from("product-1"))?);

        let reloaded = Wishlist::load(store.clone())?;

        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains(&ProductId::from("product-2")));

        wishlist.clear()?;

        assert!(Wishlist::load(store)?.is_empty());

        Ok(())
    }
}
