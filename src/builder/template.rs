//! Placeholder substitution for backend scripts.
//!
//! Templates are plain TCL or shell text containing `#NAME#` tokens. A token
//! whose name is in [`PLACEHOLDERS`] is replaced by the context value, or by
//! the empty string when the context has no entry. Every other `#...#`
//! sequence, shell comments included, is emitted unchanged.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::BuildError;

/// Delimiter around placeholder names.
pub const DELIMITER: char = '#';

/// Placeholder names recognized by the renderer.
pub const PLACEHOLDERS: &[&str] = &[
    // Identity
    "TOOL",
    "PROJECT",
    "PART",
    "FAMILY",
    "DEVICE",
    "SPEED",
    "PACKAGE",
    "TOP",
    "STRATEGY",
    "TASK",
    // Sources
    "FILES",
    "CONSTRAINTS",
    "INCLUDES",
    "DEFINES",
    "PARAMS",
    // Phase options
    "PROJECT_OPTS",
    "PREFLOW_OPTS",
    "POSTSYN_OPTS",
    "POSTIMP_OPTS",
    "POSTBIT_OPTS",
    // Hook stages
    "PRECFG",
    "POSTCFG",
    "PRESYN",
    "POSTSYN",
    "PREPAR",
    "POSTPAR",
    "PREBIT",
    "POSTBIT",
    // Step flags
    "SYN",
    "PAR",
    "BIT",
    // Programming
    "BITSTREAM",
    "DEVTYPE",
    "POSITION",
    "MEMPART",
    "WIDTH",
    "PROG_COMMANDS",
];

/// Check if a name is a recognized placeholder.
pub fn is_placeholder(name: &str) -> bool {
    PLACEHOLDERS.contains(&name)
}

/// Flattened placeholder values for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderContext(BTreeMap<String, String>);

impl RenderContext {
    /// Create an empty context.
    pub fn new() -> Self {
        RenderContext::default()
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check if a key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RenderContext {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenderContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = RenderContext::new();
        ctx.extend(iter);
        ctx
    }
}

/// Substitute placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned.
pub fn render(template: &str, ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(DELIMITER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find(DELIMITER) {
            Some(end) if is_placeholder(&after[..end]) => {
                out.push_str(ctx.get(&after[..end]).unwrap_or(""));
                rest = &after[end + 1..];
            }
            _ => {
                out.push(DELIMITER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Built-in template text by file name.
fn builtin(name: &str) -> Option<&'static str> {
    let text = match name {
        "vivado.tcl" => include_str!("templates/vivado.tcl"),
        "vivado-prog.tcl" => include_str!("templates/vivado-prog.tcl"),
        "ise.tcl" => include_str!("templates/ise.tcl"),
        "ise-prog.impact" => include_str!("templates/ise-prog.impact"),
        "quartus.tcl" => include_str!("templates/quartus.tcl"),
        "quartus-prog.sh" => include_str!("templates/quartus-prog.sh"),
        "libero.tcl" => include_str!("templates/libero.tcl"),
        "diamond.tcl" => include_str!("templates/diamond.tcl"),
        "diamond-prog.sh" => include_str!("templates/diamond-prog.sh"),
        "openflow.sh" => include_str!("templates/openflow.sh"),
        "openflow-prog.sh" => include_str!("templates/openflow-prog.sh"),
        _ => return None,
    };
    Some(text)
}

/// Where template text comes from.
///
/// A file named like the template inside the override directory wins over
/// the built-in copy.
#[derive(Debug, Clone, Default)]
pub struct TemplateSource {
    dir: Option<PathBuf>,
}

impl TemplateSource {
    /// Use only the built-in templates.
    pub fn builtin() -> Self {
        TemplateSource::default()
    }

    /// Look for overrides in `dir` first.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        TemplateSource {
            dir: Some(dir.into()),
        }
    }

    /// The override directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load the text of a template.
    pub fn load(&self, name: &str) -> Result<Cow<'static, str>, BuildError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(name);
            if path.is_file() {
                tracing::debug!("using template override {}", path.display());
                return std::fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|source| BuildError::Template { path, source });
            }
        }

        builtin(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| BuildError::Template {
                path: PathBuf::from(name),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no built-in template with this name",
                ),
            })
    }

    /// Load and render a template.
    pub fn render(&self, name: &str, ctx: &RenderContext) -> Result<String, BuildError> {
        let text = self.load(name)?;
        Ok(render(&text, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx(pairs: &[(&str, &str)]) -> RenderContext {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_substitutes_every_occurrence() {
        let out = render(
            "create #PROJECT# -part #PART#\nputs #PROJECT#",
            &ctx(&[("PROJECT", "blink"), ("PART", "xc7a35t-1-csg324")]),
        );
        assert_eq!(out, "create blink -part xc7a35t-1-csg324\nputs blink");
    }

    #[test]
    fn test_absent_key_renders_empty() {
        let out = render("a#FILES#b#PRESYN#c", &RenderContext::new());
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_unknown_placeholder_passes_through() {
        let out = render("x #NOT_A_KEY# y #TOP#", &ctx(&[("TOP", "Top")]));
        assert_eq!(out, "x #NOT_A_KEY# y Top");
    }

    #[test]
    fn test_shell_comments_pass_through() {
        let template = "#!/bin/sh\n# build #PROJECT# now\nset -e # strict\n";
        let out = render(template, &ctx(&[("PROJECT", "p")]));
        assert_eq!(out, "#!/bin/sh\n# build p now\nset -e # strict\n");
    }

    #[test]
    fn test_adjacent_and_doubled_delimiters() {
        let c = ctx(&[("TOP", "t"), ("PART", "p")]);
        assert_eq!(render("#TOP##PART#", &c), "tp");
        assert_eq!(render("##TOP#", &c), "#t");
        assert_eq!(render("#TOP", &c), "#TOP");
        assert_eq!(render("#", &c), "#");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = render("#TOP#", &ctx(&[("TOP", "#PART#"), ("PART", "nope")]));
        assert_eq!(out, "#PART#");
    }

    #[test]
    fn test_render_is_deterministic() {
        let c = ctx(&[("PROJECT", "p"), ("FILES", "a\nb")]);
        let template = builtin("vivado.tcl").unwrap();
        assert_eq!(render(template, &c), render(template, &c));
    }

    #[test]
    fn test_builtin_templates_render_fully() {
        for name in [
            "vivado.tcl",
            "vivado-prog.tcl",
            "ise.tcl",
            "ise-prog.impact",
            "quartus.tcl",
            "quartus-prog.sh",
            "libero.tcl",
            "diamond.tcl",
            "diamond-prog.sh",
            "openflow.sh",
            "openflow-prog.sh",
        ] {
            let out = render(builtin(name).unwrap(), &RenderContext::new());
            for placeholder in PLACEHOLDERS {
                let token = format!("#{}#", placeholder);
                assert!(!out.contains(&token), "{} left {} unrendered", name, token);
            }
        }
    }

    #[test]
    fn test_override_dir_wins() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("vivado.tcl"), "custom #PROJECT#").unwrap();

        let source = TemplateSource::with_dir(tmp.path());
        let out = source.render("vivado.tcl", &ctx(&[("PROJECT", "p")])).unwrap();
        assert_eq!(out, "custom p");

        // Templates missing from the directory fall back to the built-ins
        let text = source.load("openflow.sh").unwrap();
        assert_eq!(text, builtin("openflow.sh").unwrap());
    }

    #[test]
    fn test_unknown_template() {
        let err = TemplateSource::builtin().load("nope.tcl").unwrap_err();
        assert!(matches!(err, BuildError::Template { .. }));
    }

    #[test]
    fn test_context_serializes_as_map() {
        let json = serde_json::to_string(&ctx(&[("TOP", "t"), ("PART", "p")])).unwrap();
        assert_eq!(json, r#"{"PART":"p","TOP":"t"}"#);
    }
}
