pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod ingredients;
pub mod pantry;
pub mod planner;
pub mod recipes;
pub mod reviews;
pub mod share;
pub mod shopping;
pub mod state;
pub mod storage;
pub mod store;
