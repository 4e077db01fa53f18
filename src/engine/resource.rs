//! Resource lookup and URL rewriting for linked resources.

use std::path::{Path, PathBuf};
use url::Url;

/// Resolves resources referenced by a template relative to the template's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManager {
    base_dir: Option<PathBuf>,
}

impl ResourceManager {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Resource manager rooted at the directory containing `template`.
    pub fn for_template(template: &Path) -> Self {
        Self::new(template.parent().map(Path::to_path_buf))
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolve `reference` to a filesystem path.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Turns a resolved resource path into the URL written into a document.
pub trait UrlRewriter: Send + Sync {
    fn rewrite(&self, resource: &Path) -> String;
}

/// Rewrites resources as filesystem URLs relative to a content directory.
///
/// Resources under the content directory (and relative resources) become
/// relative URLs; anything else becomes an absolute `file://` URL.
#[derive(Debug, Clone, Default)]
pub struct FileSystemUrlRewriter {
    content_dir: Option<PathBuf>,
}

impl FileSystemUrlRewriter {
    pub fn new(content_dir: Option<PathBuf>) -> Self {
        Self { content_dir }
    }
}

impl UrlRewriter for FileSystemUrlRewriter {
    fn rewrite(&self, resource: &Path) -> String {
        let content_dir = self.content_dir.as_deref().filter(|dir| dir.is_absolute());
        let (base, target) = if resource.is_relative() {
            let root = content_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            let target = root.join(resource);
            (Some(root), target)
        } else {
            let base = content_dir
                .filter(|dir| resource.starts_with(dir))
                .map(Path::to_path_buf);
            (base, resource.to_path_buf())
        };

        let Ok(url) = Url::from_file_path(&target) else {
            return resource.display().to_string();
        };
        base.and_then(|dir| Url::from_directory_path(dir).ok())
            .and_then(|base| base.make_relative(&url))
            .unwrap_or_else(|| url.to_string())
    }
}
