//! Uniform description of a batch of input files, whatever its origin

use crate::error::StagingError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A directory, the display names in processing order, and where each
/// display name actually lives on disk.
///
/// For path input the real name equals the display name. For uploads the
/// real name is the staged temporary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    directory: PathBuf,
    display_names: Vec<String>,
    name_map: HashMap<String, String>,
}

impl SourceSet {
    /// Build from a directory listing; names map to themselves
    pub fn from_listing(directory: PathBuf, names: Vec<String>) -> Self {
        let name_map = names.iter().map(|n| (n.clone(), n.clone())).collect();
        Self {
            directory,
            display_names: names,
            name_map,
        }
    }

    /// Build from `(display name, real name)` pairs, rejecting repeated display names
    pub fn from_staged(
        directory: PathBuf,
        pairs: Vec<(String, String)>,
    ) -> Result<Self, StagingError> {
        let mut display_names = Vec::with_capacity(pairs.len());
        let mut name_map = HashMap::with_capacity(pairs.len());

        for (display, real) in pairs {
            if name_map.insert(display.clone(), real).is_some() {
                return Err(StagingError::DuplicateName(display));
            }
            display_names.push(display);
        }

        Ok(Self {
            directory,
            display_names,
            name_map,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    pub fn real_name(&self, display_name: &str) -> Option<&str> {
        self.name_map.get(display_name).map(String::as_str)
    }

    /// `directory/real_name` for a display name
    pub fn input_path(&self, display_name: &str) -> Option<PathBuf> {
        self.real_name(display_name).map(|real| self.directory.join(real))
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.name_map.contains_key(display_name)
    }

    pub fn len(&self) -> usize {
        self.display_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_maps_names_to_themselves() {
        let set = SourceSet::from_listing(
            PathBuf::from("/audio"),
            vec!["a.wav".to_string(), "b.wav".to_string()],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.real_name("b.wav"), Some("b.wav"));
        assert_eq!(set.input_path("a.wav"), Some(PathBuf::from("/audio/a.wav")));
        assert_eq!(set.input_path("c.wav"), None);
    }

    #[test]
    fn test_staged_keeps_order_and_real_names() {
        let set = SourceSet::from_staged(
            PathBuf::from("/tmp"),
            vec![
                ("z.wav".to_string(), "wavrate-1.wav".to_string()),
                ("a.wav".to_string(), "wavrate-2.wav".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(set.display_names(), ["z.wav", "a.wav"]);
        assert_eq!(set.input_path("a.wav"), Some(PathBuf::from("/tmp/wavrate-2.wav")));
    }

    #[test]
    fn test_staged_rejects_duplicate_display_names() {
        let err = SourceSet::from_staged(
            PathBuf::from("/tmp"),
            vec![
                ("a.wav".to_string(), "wavrate-1.wav".to_string()),
                ("a.wav".to_string(), "wavrate-2.wav".to_string()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, StagingError::DuplicateName(name) if name == "a.wav"));
    }
}
