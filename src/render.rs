pub mod compose;
pub mod frame;
