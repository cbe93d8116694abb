pub mod aggregate;
pub mod integrations;
pub mod merge_index;
pub mod normalize;
