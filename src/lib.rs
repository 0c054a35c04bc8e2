//! Budget-aware weekly meal planning service.
//!
//! The planner itself ([`planner`]) is pure and synchronous; everything
//! around it (recipes, stored plans, notifications) is HTTP plumbing over
//! swappable repositories.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod meals;
pub mod notifications;
pub mod planner;
pub mod plans;
pub mod recipes;
pub mod state;
