//! Content-addressed store for deduplicated ad text assets.
//!
//! Asset identity IS the content hash: two assets with identical
//! `(asset_type, text)` collapse to one record, with no separate indexed
//! hash column.

pub mod store;

pub use store::{asset_hash, AssetStore};
