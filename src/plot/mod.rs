//! Plot rendering: ASCII for the terminal, SVG files for the report figures.

pub mod ascii;
pub mod svg;

pub use ascii::{render_comparison_plot, render_fit_plot};
pub use svg::{write_comparison_svg, write_fit_svg};
