//! Radial fluorescence profiling engine.
//!
//! Turns a multi-scene, multi-channel image volume plus hand-drawn regions
//! of interest into per-channel radial intensity curves, then derives the
//! minimum normalized radius containing a configured fraction of total
//! intensity per ROI and per scene. The interactive viewer, vendor image
//! decoding and chart rasterization live behind the traits in [`editor`],
//! [`source`] and [`chart`].

pub mod analysis;
pub mod chart;
pub mod cli;
pub mod ctx;
pub mod editor;
pub mod geometry;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod profile;
pub mod roi;
pub mod scene;
pub mod source;
