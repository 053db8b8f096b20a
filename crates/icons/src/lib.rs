//! Icon bundle packaging for packsync.
//!
//! Packs an icon directory and its metadata document into a single zip
//! archive, then hands the archive to the chunked upload client as an
//! `icons` upload.

pub mod archive;
pub mod error;
pub mod scanner;
pub mod upload;

// Re-export primary types for convenience.
pub use archive::{IconArchive, build_icon_archive};
pub use error::ArchiveError;
pub use scanner::scan_icon_dir;
pub use upload::upload_icons;
