//! API route handlers

pub mod entity;
pub mod health;
