//! Source scanning for the layering contract tests.

use std::fs;
use std::path::{Path, PathBuf};

/// A line of production code that breaks a layering rule.
#[derive(Debug)]
pub struct Offense {
    pub file: String,
    pub line: usize,
    pub text: String,
}

/// A crate source file, keyed by its path from the manifest directory.
pub struct Source {
    pub path: String,
    pub text: String,
}

impl Source {
    /// Numbered lines up to the file's test module.
    pub fn production_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text
            .lines()
            .take_while(|line| line.trim() != "#[cfg(test)]")
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
    }

    fn offense(&self, line: usize, text: &str) -> Offense {
        Offense {
            file: self.path.clone(),
            line,
            text: text.to_string(),
        }
    }

    fn is_mod_file(&self) -> bool {
        self.path.ends_with("/mod.rs")
    }
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Every `.rs` file under `dir`, sorted by path.
pub fn sources(dir: &str) -> Vec<Source> {
    let root = manifest_dir();
    let mut pending = vec![root.join(dir)];
    let mut found = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
        for entry in entries.map(|e| e.expect("directory entry")) {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                found.push(load(&root, &path));
            }
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

fn load(root: &Path, path: &Path) -> Source {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    let relative = path.strip_prefix(root).unwrap_or(path);
    Source {
        path: relative.to_string_lossy().replace('\\', "/"),
        text,
    }
}

/// One file by its path from the manifest directory.
pub fn source(path: &str) -> Source {
    let root = manifest_dir();
    load(&root, &root.join(path))
}

/// Production lines under `dir` mentioning any of `needles`.
pub fn mentions(dir: &str, needles: &[&str]) -> Vec<Offense> {
    sources(dir)
        .iter()
        .flat_map(|src| {
            src.production_lines()
                .filter(|(_, line)| needles.iter().any(|n| line.contains(n)))
                .map(|(line, text)| src.offense(line, text))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lines of `mod.rs` files under `dir` other than module declarations,
/// re-exports, attributes and comments. `exempt` lists files that may hold
/// code.
pub fn mod_file_code(dir: &str, exempt: &[&str]) -> Vec<Offense> {
    let mut offenses = Vec::new();

    for src in sources(dir) {
        if !src.is_mod_file() || exempt.contains(&src.path.as_str()) {
            continue;
        }
        let mut continued_use = false;
        for (line, text) in src.production_lines() {
            let trimmed = text.trim();
            let is_use = trimmed.starts_with("pub use ") || trimmed.starts_with("pub(crate) use ");
            if continued_use || is_use {
                continued_use = !trimmed.ends_with(';');
                continue;
            }
            let declarative = trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with("#[")
                || trimmed.starts_with("pub mod ")
                || trimmed.starts_with("mod ");
            if !declarative {
                offenses.push(src.offense(line, text));
            }
        }
    }

    offenses
}
