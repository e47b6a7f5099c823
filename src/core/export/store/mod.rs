//! Built-in stores

mod filesystem;

pub use filesystem::FilesystemStore;
