//! Strata Engine - headless host for the Strata biome system.
//!
//! This crate provides the engine configuration, a set of sample biomes, an
//! in-memory world for them to populate, and the simulation loop that drives
//! the biome system.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod biomes;
pub mod config;
pub mod simulation;
pub mod world;

#[cfg(test)]
mod e2e_tests;
