//! Team Membership API Library
//!
//! This library provides team lifecycle and membership management: seat-limited
//! joins, soft removal, and the explicit and scheme-managed role paths, with
//! in-memory and PostgreSQL persistence behind the same repository ports.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod services;
