//! Satchel Core - shared types and cart/box logic.
//!
//! This crate provides the types used across all Satchel components:
//! - `storefront` - Public-facing school-box storefront service
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`cart`] - Line items, the cart/box mutation API, and the login-time merge
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::*;
pub use types::*;
