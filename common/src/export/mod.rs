//! Export core modules shared by the exporter and its tests.

pub mod pdf_core;
