//! Formatting helpers shared by the TCL-based shims.

use std::path::Path;

/// Path with forward slashes, as every vendor TCL shell expects.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Path quoted as a TCL word: `{path}`.
pub fn braced(path: &Path) -> String {
    format!("{{{}}}", path_str(path))
}

/// Lower-case extension of a path, empty when it has none.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// `KEY=VALUE` pairs joined with `sep`.
pub fn key_values<'a>(
    pairs: impl IntoIterator<Item = (&'a String, &'a String)>,
    sep: &str,
) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_braced() {
        assert_eq!(braced(Path::new("/src/top.v")), "{/src/top.v}");
        assert_eq!(braced(Path::new("C:\\hdl\\top.v")), "{C:/hdl/top.v}");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("pins.XDC")), "xdc");
        assert_eq!(extension(Path::new("Makefile")), "");
    }

    #[test]
    fn test_key_values() {
        let mut map = BTreeMap::new();
        map.insert("WIDTH".to_string(), "8".to_string());
        map.insert("DEPTH".to_string(), "16".to_string());
        assert_eq!(key_values(&map, " "), "DEPTH=16 WIDTH=8");
    }
}
