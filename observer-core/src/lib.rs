//! Observer Core: indicator, signal and decision engines for daily stock bars.
//!
//! This crate holds everything that does not touch the filesystem:
//! - Domain rows (bars, indicator rows, signal rows, decision rows)
//! - Rolling statistics and the five-point slope estimator
//! - Indicator engine (moving averages, CCI, ATR, Bollinger bands, angles)
//! - Primitive signal classifier and composite decision engine
//! - Collaborator traits for bar sources, table stores and notifiers

pub mod components;
pub mod config;
pub mod data;
pub mod decision;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signals;
pub mod table;

pub use config::EngineConfig;
pub use decision::DecisionEngine;
pub use engine::IndicatorEngine;
pub use error::EngineError;
pub use signals::SignalClassifier;
