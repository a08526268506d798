//! Tool domain module

pub mod entities;
pub mod traits;
pub mod value_objects;
