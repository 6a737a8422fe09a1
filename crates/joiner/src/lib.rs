//! Joiner: build named packages of JS/CSS source files into one artifact.
//!
//! A package document maps package names to a flat list of files, named groups of files, or
//! groups laid out by an `output` template. [`BundleEngine::build`] reads the files in
//! declaration order, joins them with a blank line and optionally minifies the result.

pub mod assemble;
pub mod combine;
pub mod config;
pub mod dirs;
pub mod engine;
pub mod error;
pub mod minify;
pub mod package;
pub mod reader;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use engine::{BuildResult, BundleEngine};
pub use error::BuildError;
pub use package::PackageDeclaration;
pub use store::PackageStore;
