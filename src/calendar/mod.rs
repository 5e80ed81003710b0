pub mod normalizer;
pub mod policy;
