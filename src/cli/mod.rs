//! CLI infrastructure for the qmaze toolkit

pub mod commands;
