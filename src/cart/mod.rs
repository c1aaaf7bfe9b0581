//! Wishlist cart: local persistence, detail resolution and the shared service.

mod format;
mod resolver;
mod service;
mod storage;
mod store;
#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use resolver::{DetailView, RefreshOutcome};
pub use service::CartService;
pub use storage::{FileStorage, CART_STORAGE_KEY};
pub use store::CartStore;
