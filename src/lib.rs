#[macro_use]
extern crate serde_derive;

pub mod client;
pub mod datatypes;
pub mod error;
mod protocol;
