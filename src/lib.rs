pub mod classifier;
pub mod index;
pub mod types;
pub mod unspent;
