//! Copysmith - quality-controlled marketing copy generation
//!
//! Turns structured marketing-copy requests into finished Japanese product
//! copy using an external text-generation service, with a post-generation
//! quality-control pipeline: concurrent candidates, deterministic repair,
//! rule-based scoring, input-density measurement, multi-level selection,
//! and one bounded rescue attempt.

pub mod ai;
pub mod cli;
pub mod config;
pub mod density;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod repair;
pub mod reporters;
pub mod scoring;
pub mod selector;
