//! Wiki documents read from disk or stdin.
//!
//! This module loads wiki page sources and wraps rendered fragments into
//! complete HTML pages.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::wiki::Heading;

/// A wiki page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiDocument {
    /// Path to the source file, `None` when read from stdin.
    pub path: Option<PathBuf>,
    /// Raw wiki markup.
    pub content: String,
}

impl WikiDocument {
    /// Read a wiki page from a file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file: {}", path.display()))?;
        log::debug!("read {} ({} bytes)", path.display(), content.len());
        Ok(Self {
            path: Some(path.to_path_buf()),
            content,
        })
    }

    /// Read a wiki page from any reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("failed to read wiki markup")?;
        Ok(Self {
            path: None,
            content,
        })
    }

    /// Read from `path`, or from stdin when it is absent or `-`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path != Path::new("-") => Self::read(path),
            _ => Self::from_reader(std::io::stdin().lock()),
        }
    }

    /// File stem of the source, used as a fallback page title.
    pub fn name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
    }

    /// Title for a standalone page: the first heading, else the file name.
    pub fn title(&self, headings: &[Heading]) -> Option<String> {
        headings
            .first()
            .map(|heading| heading.text.clone())
            .or_else(|| self.name())
    }
}

/// Wrap an HTML fragment in a minimal page.
pub fn standalone_page(title: Option<&str>, body: &str) -> String {
    let mut page = String::from("<html>\n");
    if let Some(title) = title {
        page.push_str("<head><title>");
        page.push_str(&title.replace('<', "&lt;"));
        page.push_str("</title></head>\n");
    }
    page.push_str("<body>\n");
    page.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        page.push('\n');
    }
    page.push_str("</body>\n</html>\n");
    page
}
