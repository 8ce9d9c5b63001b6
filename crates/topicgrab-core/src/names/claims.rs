//! Per-run registry of topic folder names.

use std::collections::HashMap;

/// Folder names handed out during one crawl, each mapped to the raw title
/// that claimed it first.
#[derive(Debug, Default)]
pub struct FolderClaims {
    owners: HashMap<String, String>,
}

impl FolderClaims {
    /// Returns the folder name to use for a topic whose sanitized name is `folder`.
    ///
    /// The same raw title always gets the same folder back. A different raw
    /// title that sanitizes to a taken name gets ` (2)`, ` (3)`, ... appended.
    pub fn claim(&mut self, folder: &str, raw_title: &str) -> String {
        let mut n = 1u32;
        loop {
            let candidate = if n == 1 {
                folder.to_string()
            } else {
                format!("{} ({})", folder, n)
            };
            match self.owners.get(&candidate) {
                Some(owner) if owner == raw_title => return candidate,
                Some(_) => n += 1,
                None => {
                    self.owners.insert(candidate.clone(), raw_title.to_string());
                    return candidate;
                }
            }
        }
    }
}
