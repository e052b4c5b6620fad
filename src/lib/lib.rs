#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Client library for delivering email through a Postal relay's HTTP API

pub mod domain;
pub mod infrastructure;
