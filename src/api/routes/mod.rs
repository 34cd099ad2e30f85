//! API Routes
//!
//! Route handlers organized by functionality.

pub mod events;
pub mod health;
pub mod insights;
pub mod timeline;
