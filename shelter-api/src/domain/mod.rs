mod animal;

pub mod search;

pub use animal::*;
