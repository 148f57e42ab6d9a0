//! Infrastructure layer - storefront HTTP scrapers and persistence

pub mod scrapers;
pub mod store;
