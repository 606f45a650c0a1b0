//! Command-line front end for versim

pub mod output;
