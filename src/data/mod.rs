//! Static catalogs: type chart, moves and the species roster.

pub mod moves;
pub mod species;
pub mod types;
