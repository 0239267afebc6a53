//! File filtering logic for the enumerator.

use super::ImageFormat;
use crate::error::ScanError;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Decides which files are images worth fingerprinting
pub struct ImageFilter {
    /// File extensions to include (lowercase)
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
    /// Optional pattern the file name must match
    name_pattern: Option<Regex>,
}

impl ImageFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"]
                .into_iter()
                .map(String::from)
                .collect(),
            include_hidden: false,
            name_pattern: None,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Only accept files whose name matches `pattern` (e.g. `_thumb\.`)
    pub fn with_name_pattern(mut self, pattern: &str) -> Result<Self, ScanError> {
        let regex = Regex::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.name_pattern = Some(regex);
        Ok(self)
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if !self.include_hidden && name.starts_with('.') {
            return false;
        }

        if let Some(pattern) = &self.name_pattern {
            if !pattern.is_match(name) {
                return false;
            }
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_common_formats() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/assets/image.jpg")));
        assert!(filter.should_include(Path::new("/assets/image.JPEG")));
        assert!(filter.should_include(Path::new("/assets/image.png")));
    }

    #[test]
    fn filter_excludes_non_images() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/assets/document.pdf")));
        assert!(!filter.should_include(Path::new("/assets/no_extension")));
    }

    #[test]
    fn filter_excludes_hidden_by_default() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/assets/.hidden.jpg")));
        assert!(ImageFilter::new()
            .with_hidden(true)
            .should_include(Path::new("/assets/.hidden.jpg")));
    }

    #[test]
    fn name_pattern_restricts_matches() {
        let filter = ImageFilter::new().with_name_pattern(r"_thumb\.").unwrap();
        assert!(filter.should_include(Path::new("/assets/cover_thumb.jpg")));
        assert!(!filter.should_include(Path::new("/assets/cover.jpg")));
        assert!(!filter.should_include(Path::new("/assets/cover_thumb.txt")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let result = ImageFilter::new().with_name_pattern("(unclosed");
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }

    #[test]
    fn custom_extensions_are_case_insensitive() {
        let filter = ImageFilter::new().with_extensions(vec!["PNG".to_string()]);
        assert!(filter.should_include(Path::new("a.png")));
        assert!(!filter.should_include(Path::new("a.jpg")));
    }
}
