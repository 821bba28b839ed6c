pub mod embed;
pub mod text;
