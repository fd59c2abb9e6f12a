pub mod backend;
pub mod inventory;
pub mod outline;
pub mod text;
