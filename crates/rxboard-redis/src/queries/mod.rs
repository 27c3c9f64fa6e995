//! Query modules for the entities stored in Redis.

pub mod latest;
pub mod patients;
pub mod relationships;
