//! # Review Sentiment
//!
//! Fine-tunes a pretrained BERT model on product reviews to predict whether a
//! review is positive, and wraps the result in a reusable predictor.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;
