use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;

use super::table::{self, RawTable};
use crate::input::resolve_path;

/// Session-scoped memoization of parsed tables, keyed by a SHA-256 content
/// fingerprint so re-loading the same upload (even under a different path)
/// skips the parse.
///
/// Owned by one command invocation; nothing here outlives the session.
#[derive(Default)]
pub struct LoadCache {
    entries: HashMap<String, Rc<RawTable>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a CSV table from disk, returning the cached parse when the file
    /// content has been seen before in this session.
    pub fn load(&mut self, path: &str) -> Result<Rc<RawTable>, Box<dyn std::error::Error>> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved)
            .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
        let key = fingerprint(&bytes);

        if let Some(cached) = self.entries.get(&key) {
            return Ok(Rc::clone(cached));
        }

        let parsed = Rc::new(table::parse_csv(&bytes)?);
        self.entries.insert(key, Rc::clone(&parsed));
        Ok(parsed)
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_same_content_hits_cache() {
        let content = b"Customer,2024-01\nAcme,10\n";
        let a = temp_csv("mrrb_cache_a.csv", content);
        let b = temp_csv("mrrb_cache_b.csv", content);

        let mut cache = LoadCache::new();
        let first = cache.load(a.to_str().unwrap()).unwrap();
        let second = cache.load(b.to_str().unwrap()).unwrap();
        // Same fingerprint, same parse
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_different_content_parses_fresh() {
        let a = temp_csv("mrrb_cache_c.csv", b"Customer,2024-01\nAcme,10\n");
        let b = temp_csv("mrrb_cache_d.csv", b"Customer,2024-01\nGlobex,20\n");

        let mut cache = LoadCache::new();
        let first = cache.load(a.to_str().unwrap()).unwrap();
        let second = cache.load(b.to_str().unwrap()).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(second.rows[0][0], "Globex");
    }
}
