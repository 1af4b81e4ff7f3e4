//! Local media loading

pub mod fs_loader;

pub use fs_loader::FsMediaLoader;
