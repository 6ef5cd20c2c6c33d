pub mod branches;
pub mod download;
