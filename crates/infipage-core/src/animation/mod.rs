#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! The pager needs one physical model, the [`spring::Spring`], advanced by
//! the host's frame clock through [`crate::Pager::frame`].

pub mod spring;

pub use spring::{Spring, SpringConfig, SpringOverrides};
