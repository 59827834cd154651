pub mod collection;
pub mod data;
pub mod query;
pub mod seed;
pub mod wizard;
