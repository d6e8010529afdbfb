pub mod directory;
pub mod policy;
pub mod user;
