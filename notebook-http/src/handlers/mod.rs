pub mod execute;
pub mod sessions;
pub mod system;
