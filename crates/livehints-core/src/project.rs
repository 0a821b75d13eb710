//! Project context resolution.
//!
//! A project context identifies the build project that owns a document. It is
//! resolved once per watched document and cached on its watch entry.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tower_lsp_server::ls_types::Uri;

/// Opaque identity of the project owning a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectContext {
    /// Project name, matched against the project name reported by live processes
    pub name: String,
    /// Directory containing the project's build file
    pub root: PathBuf,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Maps a document to the project that owns it.
///
/// Resolution may be expensive (file system walks, build tool queries), which
/// is why the coordinator caches the result per watched document. `None`
/// means the document belongs to no known project.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, uri: &Uri) -> Option<ProjectContext>;
}

/// Resolves projects by searching parent directories for a build file.
///
/// # Examples
///
/// ```no_run
/// use livehints_core::project::{BuildFileResolver, ProjectResolver};
/// use tower_lsp_server::ls_types::Uri;
///
/// # async fn example() {
/// let resolver = BuildFileResolver::new();
/// let uri = Uri::from_file_path("/work/shop/src/main/java/App.java").unwrap();
///
/// if let Some(project) = resolver.resolve(&uri).await {
///     println!("{} at {}", project.name, project.root.display());
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BuildFileResolver {
    markers: Vec<String>,
}

impl BuildFileResolver {
    /// Maximum number of ancestor directories searched for a build file.
    pub const MAX_PROJECT_DEPTH: usize = 8;

    /// Build files recognised by default.
    pub const DEFAULT_MARKERS: &'static [&'static str] = &[
        "pom.xml",
        "build.gradle",
        "build.gradle.kts",
        "Cargo.toml",
        "package.json",
    ];

    pub fn new() -> Self {
        Self::with_markers(Self::DEFAULT_MARKERS.iter().copied())
    }

    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    async fn find_root(&self, start: &Path) -> Option<PathBuf> {
        let mut current = start;

        for depth in 0..Self::MAX_PROJECT_DEPTH {
            for marker in &self.markers {
                let candidate = current.join(marker);
                if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                    tracing::debug!(
                        "Found build file at depth {}: {}",
                        depth,
                        candidate.display()
                    );
                    return Some(current.to_path_buf());
                }
            }

            current = current.parent()?;
        }

        None
    }
}

impl Default for BuildFileResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectResolver for BuildFileResolver {
    async fn resolve(&self, uri: &Uri) -> Option<ProjectContext> {
        let path = uri.to_file_path()?;
        let dir = path.parent()?;

        let Some(root) = self.find_root(dir).await else {
            tracing::debug!("No build file found for: {:?}", uri);
            return None;
        };

        let name = root.file_name()?.to_string_lossy().into_owned();
        Some(ProjectContext { name, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc_uri(path: &Path) -> Uri {
        Uri::from_file_path(path).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_nearest_build_file() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("shop");
        let src = project.join("src/main/java");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(project.join("pom.xml"), "<project/>").unwrap();

        let resolver = BuildFileResolver::new();
        let context = resolver
            .resolve(&doc_uri(&src.join("App.java")))
            .await
            .unwrap();

        assert_eq!(context.name, "shop");
        assert_eq!(context.root, project);
    }

    #[tokio::test]
    async fn test_prefers_innermost_project() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("outer");
        let inner = outer.join("inner");
        std::fs::create_dir_all(inner.join("src")).unwrap();
        std::fs::write(outer.join("build.gradle"), "").unwrap();
        std::fs::write(inner.join("build.gradle.kts"), "").unwrap();

        let resolver = BuildFileResolver::new();
        let context = resolver
            .resolve(&doc_uri(&inner.join("src/App.kt")))
            .await
            .unwrap();

        assert_eq!(context.name, "inner");
    }

    #[tokio::test]
    async fn test_no_build_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("loose");
        std::fs::create_dir_all(&src).unwrap();

        let resolver = BuildFileResolver::with_markers(["definitely-not-a-build-file.xyz"]);
        assert!(resolver.resolve(&doc_uri(&src.join("A.java"))).await.is_none());
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("deep");
        let mut dir = root.clone();
        for i in 0..BuildFileResolver::MAX_PROJECT_DEPTH + 2 {
            dir = dir.join(format!("d{i}"));
        }
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(root.join("Cargo.toml"), "").unwrap();

        let resolver = BuildFileResolver::with_markers(["Cargo.toml"]);
        assert!(resolver.resolve(&doc_uri(&dir.join("lib.rs"))).await.is_none());
    }

    #[test]
    fn test_project_context_new() {
        let context = ProjectContext::new("shop", "/work/shop");
        assert_eq!(context.name, "shop");
        assert_eq!(context.root, PathBuf::from("/work/shop"));
    }
}
