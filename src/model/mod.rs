//! Registry entities produced by the record parser
//!
//! A `Company` is created once per successfully parsed identifier and owns
//! zero or more `Person`s. Both are append-only once stored.

mod company;
mod person;

pub use company::Company;
pub use person::Person;
