//! Media storage adapters.

mod fs_image_store;

pub use fs_image_store::FsImageStore;
