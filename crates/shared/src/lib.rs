//! Shared utilities and common types for the campus repair backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing and random token/code generation
//! - JWT issuing and validation
//! - Password hashing with Argon2id
//! - Phone number and upload validation

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
