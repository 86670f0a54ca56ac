//! # Repository Module
//!
//! Repository pattern implementations for database access.
//!
//! ## Design
//! Each repository owns a pool clone and exposes typed async methods.
//! Repositories translate between database rows and bistro-core domain
//! types; callers never see raw rows or SQL.

pub mod order;
pub mod promotion;
