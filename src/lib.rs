//! Antinucleus energy spectra from simulated dark-matter annihilation events.
//!
//! Event rows (`cms A Z E [p_coal]`) are grouped by CMS mass, classified into
//! antideuterons, antitritons, antihelium-3/4, antiprotons and antineutrons,
//! histogrammed on log-spaced energy bins and plotted as dN/dE on log-log
//! axes.

pub mod app;
pub mod cli;
pub mod coalescence;
pub mod color;
pub mod data;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod report;
pub mod spectrum;
pub mod state;
pub mod ui;

pub use error::{RowError, SpectrumError, SpectrumResult};
