pub mod image;
pub mod interpretation;
