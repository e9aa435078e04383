pub mod blog;
pub mod upload;
