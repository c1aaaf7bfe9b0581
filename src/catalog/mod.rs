//! Catalog browsing helpers: slugs, routes and listing transforms.

mod browse;
mod routes;
mod slug;

pub use browse::{filter_by_name, group_by_collection, sort_products, SortOrder};
pub use routes::Route;
pub use slug::name_from_slug;
