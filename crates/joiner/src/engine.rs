//! The build pipeline: lookup, resolve, assemble, minify.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::assemble::assemble;
use crate::config::Config;
use crate::error::BuildError;
use crate::minify::MinifierDispatcher;
use crate::reader::{FsReader, SourceReader};
use crate::resolver::{BundleType, ResolveOptions, Resolver, SegmentBuffer};
use crate::store::PackageStore;

/// The finished artifact of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Combined (and possibly minified) text.
    pub raw: String,
    /// Type inferred from the first file, if any file was read.
    #[serde(rename = "type")]
    pub bundle_type: Option<BundleType>,
    /// Byte length of `raw`.
    pub size: usize,
    /// Whether minification was applied.
    pub min: bool,
}

impl BuildResult {
    /// MIME type for serving the bundle, when the type has one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self.bundle_type.as_ref()? {
            BundleType::Js => Some("text/javascript"),
            BundleType::Css => Some("text/css"),
            BundleType::Other(_) => None,
        }
    }
}

/// Builds packages from a shared, read-only [`PackageStore`].
///
/// Holds no per-build state; every call re-reads files and reruns each step. Safe to share
/// between threads.
pub struct BundleEngine {
    store: Arc<PackageStore>,
    reader: Arc<dyn SourceReader>,
    dispatcher: MinifierDispatcher,
    options: ResolveOptions,
}

impl fmt::Debug for BundleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleEngine")
            .field("packages", &self.store.len())
            .field("dispatcher", &self.dispatcher)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BundleEngine {
    /// An engine over `store` that reads sources through `reader`.
    pub fn new(store: Arc<PackageStore>, reader: impl SourceReader + 'static) -> Self {
        Self {
            store,
            reader: Arc::new(reader),
            dispatcher: MinifierDispatcher::default(),
            options: ResolveOptions::default(),
        }
    }

    /// Load the package document named by `config` and read sources from the filesystem.
    ///
    /// Relative source paths resolve against `config.root`, or else the directory holding the
    /// package document.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = PackageStore::load(&config.packages)?;
        let root = config.root.clone().or_else(|| {
            store
                .source()
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Into::into)
        });
        debug!("Resolving relative source paths against {:?}", root);

        Ok(Self::new(Arc::new(store), FsReader::new(root)).with_options(ResolveOptions {
            parallel_reads: config.parallel_reads,
            strict_types: config.strict_types,
        }))
    }

    /// Replace the compactor registry.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: MinifierDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Replace the resolution options.
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The package declarations this engine builds from.
    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    /// Build `package_name`, minifying the result if `minify` is set.
    pub fn build(&self, package_name: &str, minify: bool) -> Result<BuildResult, BuildError> {
        validate_package_name(package_name)?;

        let decl = self.store.lookup(package_name)?;
        info!("Working with the package {}", package_name);

        let mut buffer = SegmentBuffer::new();
        Resolver::new(self.reader.as_ref(), self.options).resolve_into(decl, &mut buffer)?;
        let (segments, bundle_type) = buffer.into_parts();

        let combined = assemble(&segments)?;
        let raw = self
            .dispatcher
            .minify(combined, bundle_type.as_ref(), minify)?;

        info!(
            "Package {} done: {} segment(s), {} bytes",
            package_name,
            segments.len(),
            raw.len()
        );
        Ok(BuildResult {
            size: raw.len(),
            raw,
            bundle_type,
            min: minify,
        })
    }
}

fn validate_package_name(name: &str) -> Result<(), BuildError> {
    let reason = if name.trim().is_empty() {
        "a package name must be provided"
    } else if name.chars().any(char::is_control) {
        "package names cannot contain control characters"
    } else {
        return Ok(());
    };
    Err(BuildError::InvalidArgument {
        reason: reason.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minify::Compactor;
    use crate::reader::tests::MemoryReader;

    struct Upper;

    impl Compactor for Upper {
        fn compact(&self, source: &str) -> Option<String> {
            Some(source.to_uppercase())
        }
    }

    fn engine(document: &str) -> BundleEngine {
        let store = PackageStore::from_json_str(document).expect("document should parse");
        let reader = MemoryReader::default()
            .with("a.js", "var a=1;")
            .with("b.js", "var b=2;")
            .with("a.css", "body{color:red}");
        BundleEngine::new(Arc::new(store), reader)
    }

    #[test]
    fn test_build_flat_package() -> Result<(), BuildError> {
        let result = engine(r#"{"p": ["a.js", "b.js"]}"#).build("p", false)?;

        assert_eq!(result.raw, "var a=1;\n\nvar b=2;");
        assert_eq!(result.bundle_type, Some(BundleType::Js));
        assert_eq!(result.size, result.raw.len());
        assert!(!result.min);
        assert_eq!(result.content_type(), Some("text/javascript"));
        Ok(())
    }

    #[test]
    fn test_minify_flag_is_echoed_and_applied() -> Result<(), BuildError> {
        let engine = engine(r#"{"p": {"g1": ["a.css"], "output": ["/* hdr */", "g1"]}}"#)
            .with_dispatcher(MinifierDispatcher::empty().with(BundleType::Css, Upper));

        let result = engine.build("p", true)?;
        assert_eq!(result.raw, "/* HDR */\n\nBODY{COLOR:RED}");
        assert_eq!(result.size, 26);
        assert!(result.min);
        assert_eq!(result.content_type(), Some("text/css"));
        Ok(())
    }

    #[test]
    fn test_failures_are_typed() {
        let engine = engine(
            r#"{"empty": [], "static": {"output": ["/* a */"]}, "broken": ["gone.js"]}"#,
        );

        assert!(matches!(
            engine.build("absent", false),
            Err(BuildError::ConfigurationMissing { .. })
        ));
        assert!(matches!(
            engine.build("empty", false),
            Err(BuildError::EmptyInput { .. })
        ));
        assert!(matches!(
            engine.build("broken", false),
            Err(BuildError::UnreadableFile { .. })
        ));
        assert!(matches!(
            engine.build("static", true),
            Err(BuildError::UndeterminedType)
        ));
        assert!(matches!(
            engine.build("  ", false),
            Err(BuildError::InvalidArgument { .. })
        ));
        assert!(matches!(
            engine.build("a\u{0}b", false),
            Err(BuildError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_all_static_template_builds_without_minify() -> Result<(), BuildError> {
        let result = engine(r#"{"static": {"output": ["/* a */", "/* b */"]}}"#)
            .build("static", false)?;
        assert_eq!(result.raw, "/* a */\n\n/* b */");
        assert_eq!(result.bundle_type, None);
        assert_eq!(result.content_type(), None);
        Ok(())
    }

    #[test]
    fn test_result_serializes_with_type_key() {
        let result = BuildResult {
            raw: "x".to_owned(),
            bundle_type: Some(BundleType::Css),
            size: 1,
            min: false,
        };
        assert_eq!(
            serde_json::to_string(&result).expect("serializable"),
            r#"{"raw":"x","type":"css","size":1,"min":false}"#
        );
    }
}
