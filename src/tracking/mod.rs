//! Change tracking for source directories.
//!
//! Each source directory keeps a small manifest next to its documents
//! recording when it was last scanned and which documents it held. The
//! detector compares the live directory against that manifest.
//!
//! - [`manifest`]: sidecar persistence of the previous pass
//! - [`detector`]: computes the [`ChangeSet`] of one pass
//!
//! # Usage
//!
//! ```no_run
//! use blogsync::tracking::{DetectOptions, detect};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let changes = detect(Path::new("/home/user/vault/Blog"), DetectOptions::default())?;
//! for name in &changes.new_or_modified {
//!     println!("changed: {name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod manifest;

pub use detector::{ChangeSet, DetectOptions, detect};
pub use manifest::SourceManifest;
