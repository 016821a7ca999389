pub mod normalize;
pub mod time;
