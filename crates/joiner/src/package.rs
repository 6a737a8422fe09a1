//! Package declarations as read from the package document.
//!
//! A declaration comes in one of three shapes, decided once when the document is parsed:
//!
//! ```json
//! {
//!   "flat": ["one.js", "two.js"],
//!   "grouped": { "core": ["one.js"], "extra": ["two.js"] },
//!   "templated": {
//!     "core": ["one.js"],
//!     "output": ["// Documentation", "core", "// End of core"]
//!   }
//! }
//! ```

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

/// Reserved key holding the template of a templated package.
pub const OUTPUT_KEY: &str = "output";

/// Named groups of source files, in document order.
pub type Groups = IndexMap<String, Vec<PathBuf>>;

/// One package of the package document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDeclaration")]
pub enum PackageDeclaration {
    /// An ordered list of files.
    Flat(Vec<PathBuf>),
    /// Named groups, combined in document order.
    Grouped(Groups),
    /// Named groups laid out by an `output` template.
    Templated {
        /// Groups available to the template.
        groups: Groups,
        /// Layout of the artifact.
        output: Vec<TemplateToken>,
    },
}

/// One entry of an `output` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    /// Expands to the files of the named group.
    Group(String),
    /// Inserted verbatim.
    Literal(String),
}

impl PackageDeclaration {
    /// Human readable name of the shape, used in logs.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Flat(_) => "collection",
            Self::Grouped(_) => "groups",
            Self::Templated { .. } => "groups and a template",
        }
    }
}

/// Structural view of a declaration before the shape is decided.
#[derive(Deserialize)]
#[serde(untagged, expecting = "a list of files or a map of groups to lists of files")]
enum RawDeclaration {
    Flat(Vec<PathBuf>),
    Keyed(IndexMap<String, Vec<String>>),
}

impl From<RawDeclaration> for PackageDeclaration {
    fn from(raw: RawDeclaration) -> Self {
        match raw {
            RawDeclaration::Flat(files) => Self::Flat(files),
            RawDeclaration::Keyed(mut entries) => {
                let template = entries.shift_remove(OUTPUT_KEY);
                let groups: Groups = entries
                    .into_iter()
                    .map(|(name, files)| (name, files.into_iter().map(PathBuf::from).collect()))
                    .collect();

                match template {
                    None => Self::Grouped(groups),
                    Some(tokens) => {
                        let output = tokens
                            .into_iter()
                            .map(|token| {
                                if groups.contains_key(&token) {
                                    TemplateToken::Group(token)
                                } else {
                                    TemplateToken::Literal(token)
                                }
                            })
                            .collect();
                        Self::Templated { groups, output }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> PackageDeclaration {
        serde_json::from_str(json).expect("declaration should parse")
    }

    #[test]
    fn test_array_is_flat() {
        assert_eq!(
            parse(r#"["a.js", "b.js"]"#),
            PackageDeclaration::Flat(vec![PathBuf::from("a.js"), PathBuf::from("b.js")])
        );
    }

    #[test]
    fn test_map_without_output_is_grouped_in_document_order() {
        let decl = parse(r#"{"zeta": ["z.css"], "alpha": ["a.css"], "mid": []}"#);
        let PackageDeclaration::Grouped(groups) = decl else {
            panic!("expected grouped declaration, got {decl:?}");
        };
        let names: Vec<_> = groups.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(groups["mid"].is_empty());
    }

    #[test]
    fn test_output_key_makes_template() {
        let decl = parse(
            r#"{
                "g1": ["a.css"],
                "output": ["/* hdr */", "g1", "output", "g2"]
            }"#,
        );
        assert_eq!(
            decl,
            PackageDeclaration::Templated {
                groups: Groups::from([("g1".to_owned(), vec![PathBuf::from("a.css")])]),
                output: vec![
                    TemplateToken::Literal("/* hdr */".to_owned()),
                    TemplateToken::Group("g1".to_owned()),
                    TemplateToken::Literal("output".to_owned()),
                    TemplateToken::Literal("g2".to_owned()),
                ],
            }
        );
    }

    #[test]
    fn test_illegal_shapes_are_rejected() {
        assert!(serde_json::from_str::<PackageDeclaration>(r#""a.js""#).is_err());
        assert!(serde_json::from_str::<PackageDeclaration>(r#"{"g": "a.js"}"#).is_err());
        assert!(serde_json::from_str::<PackageDeclaration>(r#"{"output": [1, 2]}"#).is_err());
    }

    #[test]
    fn test_toml_shapes() {
        let decls: IndexMap<String, PackageDeclaration> = toml::from_str(
            r#"
flat = ["a.js"]

[templated]
body = ["b.js"]
output = ["// head", "body"]
"#,
        )
        .expect("toml should parse");
        assert_eq!(decls["flat"].shape(), "collection");
        assert_eq!(decls["templated"].shape(), "groups and a template");
    }
}
