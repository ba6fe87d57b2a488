//! Unique slug assignment.
//!
//! Slugs are short numeric identifiers written into a document's front
//! matter. Every slug ever issued is kept in a [`SlugRegistry`] stored once
//! per installation, so a value is never handed out twice even after the
//! document carrying it was deleted.
//!
//! # Usage
//!
//! ```no_run
//! use blogsync::config::SlugMode;
//! use blogsync::slug::{SlugAllocator, SlugRegistry};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = SlugRegistry::load(Path::new("/home/user/.local/share/blogsync"));
//! let mut next = 1_i64;
//! let mut allocator = SlugAllocator::new(&mut registry, SlugMode::Sequential);
//! let slug = allocator.allocate(&mut next)?;
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod registry;

pub use allocator::{SequenceStore, SlugAllocator};
pub use registry::SlugRegistry;
