//! Turning a package declaration into an ordered list of segments.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::BuildError;
use crate::package::{Groups, PackageDeclaration, TemplateToken};
use crate::reader::{SourceReader, read_all};

/// Content type of a bundle, inferred from the first file read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum BundleType {
    /// `.js` files.
    Js,
    /// `.css` files.
    Css,
    /// Any other extension, kept verbatim (empty when the file had none).
    Other(String),
}

impl BundleType {
    /// Map a file extension (without the dot) to a type.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "js" => Self::Js,
            "css" => Self::Css,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Infer from the text after the last `.` of the file name.
    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(
            path.extension()
                .map(|ext| ext.to_string_lossy())
                .as_deref()
                .unwrap_or_default(),
        )
    }

    /// The extension this type stands for.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Js => "js",
            Self::Css => "css",
            Self::Other(ext) => ext,
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BundleType> for String {
    fn from(value: BundleType) -> Self {
        value.as_str().to_owned()
    }
}

/// One ordered unit of the final artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Contents of a declared file.
    File {
        /// Path as declared.
        path: PathBuf,
        /// Text read from the file.
        content: String,
    },
    /// Static text from an `output` template.
    Literal(String),
}

impl Segment {
    /// Text this segment contributes to the artifact.
    pub fn content(&self) -> &str {
        match self {
            Self::File { content, .. } => content,
            Self::Literal(text) => text,
        }
    }
}

/// Owned accumulator for one build: the segments collected so far and the inferred type.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    segments: Vec<Segment>,
    bundle_type: Option<BundleType>,
}

impl SegmentBuffer {
    /// An empty buffer with no type inferred yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments collected so far, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Type inferred from the first file, if one has been read.
    pub fn bundle_type(&self) -> Option<&BundleType> {
        self.bundle_type.as_ref()
    }

    /// Number of segments collected.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Hand over the segments and the inferred type.
    pub fn into_parts(self) -> (Vec<Segment>, Option<BundleType>) {
        (self.segments, self.bundle_type)
    }

    fn push_file(
        &mut self,
        path: PathBuf,
        content: String,
        strict: bool,
    ) -> Result<(), BuildError> {
        let found = BundleType::from_path(&path);
        match &self.bundle_type {
            None => {
                debug!("Package type inferred as `{}` from {:?}", found, path);
                self.bundle_type = Some(found);
            }
            Some(expected) if strict && *expected != found => {
                return Err(BuildError::MixedTypes {
                    expected: expected.to_string(),
                    found: found.to_string(),
                    path,
                });
            }
            Some(_) => {}
        }
        self.segments.push(Segment::File { path, content });
        Ok(())
    }

    fn push_literal(&mut self, text: &str) {
        self.segments.push(Segment::Literal(text.to_owned()));
    }
}

/// Resolution knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Read the files of one list on the rayon pool.
    pub parallel_reads: bool,
    /// Fail on a file whose type differs from the inferred one.
    pub strict_types: bool,
}

/// Walks a declaration and reads its files into a [`SegmentBuffer`].
pub struct Resolver<'a> {
    reader: &'a dyn SourceReader,
    options: ResolveOptions,
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Resolver<'a> {
    /// A resolver reading through `reader`.
    pub fn new(reader: &'a dyn SourceReader, options: ResolveOptions) -> Self {
        Self { reader, options }
    }

    /// Resolve into a fresh buffer.
    pub fn resolve(&self, decl: &PackageDeclaration) -> Result<SegmentBuffer, BuildError> {
        let mut buffer = SegmentBuffer::new();
        self.resolve_into(decl, &mut buffer)?;
        Ok(buffer)
    }

    /// Append the segments of `decl` to `buffer`, in declaration order.
    pub fn resolve_into(
        &self,
        decl: &PackageDeclaration,
        buffer: &mut SegmentBuffer,
    ) -> Result<(), BuildError> {
        info!("Files provided as {}", decl.shape());

        match decl {
            PackageDeclaration::Flat(files) => self.read_files(files, buffer),
            PackageDeclaration::Grouped(groups) => {
                for name in groups.keys() {
                    self.read_group(groups, name, buffer)?;
                }
                Ok(())
            }
            PackageDeclaration::Templated { groups, output } => {
                if output.is_empty() {
                    return Err(BuildError::empty("the output template is empty"));
                }
                for token in output {
                    match token {
                        TemplateToken::Group(name) => self.read_group(groups, name, buffer)?,
                        TemplateToken::Literal(text) => buffer.push_literal(text),
                    }
                }
                Ok(())
            }
        }
    }

    /// An empty group contributes nothing; the emptiness of the whole package is decided when
    /// the segments are assembled.
    fn read_group(
        &self,
        groups: &Groups,
        name: &str,
        buffer: &mut SegmentBuffer,
    ) -> Result<(), BuildError> {
        match groups.get(name) {
            Some(files) if !files.is_empty() => self.read_files(files, buffer),
            _ => {
                warn!("Group `{}` has no filenames to read", name);
                Ok(())
            }
        }
    }

    fn read_files(&self, files: &[PathBuf], buffer: &mut SegmentBuffer) -> Result<(), BuildError> {
        let contents = read_all(self.reader, files, self.options.parallel_reads)?;
        for (path, content) in files.iter().zip(contents) {
            buffer.push_file(path.clone(), content, self.options.strict_types)?;
        }
        Ok(())
    }
}
