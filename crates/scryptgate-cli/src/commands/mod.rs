pub mod derive;
pub mod describe;
pub mod validate;
