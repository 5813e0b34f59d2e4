//! Client for the Z-Image generation web service
//!
//! Collects a prompt and an optional reference image, issues a single
//! request to the backend's `/api/generate` endpoint and renders the
//! returned image, with loading and error states kept in an observable
//! UI state.

pub mod api;
pub mod capture;
pub mod controller;
pub mod error;
pub mod image;
pub mod models;
pub mod ui;
pub mod view;

pub use error::{Error, Result};
