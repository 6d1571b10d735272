//! Social networking backend.
//!
//! Accounts, a directed follow graph, notifications with live push, and a
//! bounded per-user friend-suggestion list that is seeded at signup and
//! recomputed on a schedule against the evolving graph.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod suggest;
