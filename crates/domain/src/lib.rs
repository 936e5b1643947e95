//! # airmon-domain
//!
//! Pure domain model for the airmon air-quality monitor integration.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Describe the supported **models**, their protocol dialect and feature table
//! - Define the **status snapshot** reported by a monitor in either dialect
//! - Define the static **descriptions** (units, ranges, icons) of every entity
//! - Define **Devices**, **Entities** and **Events** as seen by the host
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod descriptor;
pub mod device;
pub mod entity;
pub mod event;
pub mod model;
pub mod status;
