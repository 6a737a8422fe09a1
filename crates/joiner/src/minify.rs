//! Routing combined output to a compactor for its bundle type.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use std::fmt;

use indexmap::IndexMap;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use log::{debug, info};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::error::BuildError;
use crate::resolver::BundleType;

/// An external minification transform.
pub trait Compactor: Send + Sync {
    /// Returns `None` when the source cannot be processed.
    fn compact(&self, source: &str) -> Option<String>;
}

/// JavaScript compactor backed by oxc.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsCompactor;

impl Compactor for JsCompactor {
    fn compact(&self, source: &str) -> Option<String> {
        let allocator = Allocator::default();
        // Joined files are classic scripts; their top-level names are globals.
        let source_type = SourceType::script();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            debug!("JS compactor rejected input: {} parse error(s)", ret.errors.len());
            return None;
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Some(code)
    }
}

/// CSS compactor backed by lightningcss.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssCompactor;

impl Compactor for CssCompactor {
    fn compact(&self, source: &str) -> Option<String> {
        let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .ok()?;
        Some(result.code)
    }
}

/// Registry of compactors keyed by bundle type.
pub struct MinifierDispatcher {
    compactors: IndexMap<BundleType, Box<dyn Compactor>>,
}

impl fmt::Debug for MinifierDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinifierDispatcher")
            .field("types", &self.compactors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for MinifierDispatcher {
    /// `js` and `css` compactors registered.
    fn default() -> Self {
        Self::empty()
            .with(BundleType::Js, JsCompactor)
            .with(BundleType::Css, CssCompactor)
    }
}

impl MinifierDispatcher {
    /// A dispatcher with no compactors at all.
    pub fn empty() -> Self {
        Self {
            compactors: IndexMap::new(),
        }
    }

    /// Register (or replace) the compactor for `bundle_type`.
    #[must_use]
    pub fn with(mut self, bundle_type: BundleType, compactor: impl Compactor + 'static) -> Self {
        self.compactors.insert(bundle_type, Box::new(compactor));
        self
    }

    /// Minify `text` if `requested`; otherwise hand it back untouched.
    pub fn minify(
        &self,
        text: String,
        bundle_type: Option<&BundleType>,
        requested: bool,
    ) -> Result<String, BuildError> {
        if !requested {
            return Ok(text);
        }

        let bundle_type = bundle_type.ok_or(BuildError::UndeterminedType)?;
        let compactor = self.compactors.get(bundle_type).ok_or_else(|| {
            BuildError::UnsupportedType {
                bundle_type: bundle_type.to_string(),
            }
        })?;

        info!("Minifying the entire output data as `{}`", bundle_type);
        let minified = compactor
            .compact(&text)
            .ok_or_else(|| BuildError::CompactionFailed {
                bundle_type: bundle_type.to_string(),
            })?;
        debug!("Minified {} -> {} bytes", text.len(), minified.len());
        Ok(minified)
    }
}
