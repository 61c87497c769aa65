//! Catalog filter engine for the storefront's product listing.
//!
//! The listing's filters live in a [`application::FilterStore`] and are
//! mirrored into the address bar as a shareable query string by the
//! [`application::SyncController`], which also applies back/forward and link
//! navigations to the store without echoing its own writes.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
