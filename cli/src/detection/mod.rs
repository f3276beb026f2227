//! # Nexlayer Detection Engine
//!
//! File: cli/src/detection/mod.rs
//!
//! ## Overview
//!
//! Classifies a project directory: which framework or full stack it uses,
//! on which port it listens, which services it integrates with and which
//! editor or AI assistant is driving the CLI.
//!
//! ## Architecture
//!
//! - **`types`**: `ProjectInfo`, `ProjectType` and the `Confidence` value type.
//! - **`context`** / **`manifest`** / **`ports`**: the read-only view of a
//!   project handed to detectors, manifest parsers and port extraction.
//! - **`pattern`** / **`components`** / **`stacks`** / **`evaluator`**: the
//!   weighted stack catalog and its scoring.
//! - **`detectors`**: the `Detector` trait and every built-in detector.
//! - **`registry`** / **`cache`**: concurrent aggregation, priority scans and
//!   the per-registry report cache.
//!
pub mod cache;
pub mod components;
pub mod context;
pub mod detectors;
pub mod evaluator;
pub mod manifest;
pub mod pattern;
pub mod ports;
pub mod registry;
pub mod stacks;
pub mod types;
