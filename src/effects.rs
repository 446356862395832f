pub mod blur;
pub mod filters;
