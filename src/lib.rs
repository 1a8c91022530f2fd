//! Daybook - a personal notes, todos and posts backend
//!
//! This library provides the core functionality for the Daybook REST service.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
