//! Core services for collecting, analysing and acting on feedback

pub mod analyzer;
pub mod collector;
pub mod pattern_matcher;
pub mod priority_manager;
pub mod result_tracker;
pub mod stats;
pub mod suggester;
