//! Module resolution
//!
//! Maps a specifier written in an importing module to the canonical
//! [`ModuleId`] of the module it names. Resolution only stats the file system
//! (plus reading `package.json` manifests) and is memoized per
//! `(directory, specifier)` in a concurrent map shared by all scan workers.

pub mod alias;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

pub use self::alias::PathAlias;
use crate::core::ModuleId;
use crate::error::ResolveError;

/// Node.js core modules, matched by exact name
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Subpath modules Node.js ships alongside the core modules
const NODE_BUILTIN_SUBPATHS: &[&str] = &[
    "assert/strict",
    "dns/promises",
    "fs/promises",
    "inspector/promises",
    "path/posix",
    "path/win32",
    "readline/promises",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "timers/promises",
    "util/types",
];

/// How a specifier was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Relative,
    Alias,
    Package,
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: ModuleId,
    pub origin: Origin,
    /// Outside the context directory, under `node_modules`, or a builtin
    pub external: bool,
}

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub context: PathBuf,
    /// Extensions tried in priority order, without the leading dot
    pub extensions: Vec<String>,
    pub alias: Option<PathAlias>,
    pub disallow_ambiguous: bool,
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    main: Option<String>,
}

type CacheKey = (PathBuf, String);

pub struct ModuleResolver {
    context: PathBuf,
    extensions: Vec<String>,
    alias: Option<PathAlias>,
    disallow_ambiguous: bool,
    cache: DashMap<CacheKey, Result<Resolved, ResolveError>>,
}

impl ModuleResolver {
    pub fn new(options: ResolverOptions) -> Self {
        let context = fs::canonicalize(&options.context).unwrap_or(options.context);
        let extensions = options
            .extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            context,
            extensions,
            alias: options.alias.filter(|alias| !alias.is_empty()),
            disallow_ambiguous: options.disallow_ambiguous,
            cache: DashMap::new(),
        }
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    /// Resolve `specifier` as written in module `from`
    pub fn resolve(&self, specifier: &str, from: &ModuleId) -> Result<Resolved, ResolveError> {
        let dir = self.importer_dir(from);
        let key = (dir, specifier.to_string());

        if let Some(hit) = self.cache.get(&key) {
            return hit.value().clone();
        }

        let result = self.resolve_uncached(specifier, &key.0);
        match &result {
            Ok(resolved) => debug!("resolved '{specifier}' from {} to {}", from, resolved.id),
            Err(e) => debug!("failed to resolve '{specifier}' from {from}: {e}"),
        }

        // Another worker may have raced us; both computed the same value
        self.cache.entry(key).or_insert(result).value().clone()
    }

    /// Resolve an entry path given on the command line
    pub fn resolve_entry(&self, path: &Path) -> Result<ModuleId, ResolveError> {
        let base = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.context.join(path)
        };
        let specifier = path.display().to_string();

        self.resolve_path(&specifier, &base).map(ModuleId::File)
    }

    /// Placeholder id for a reference that failed to resolve
    ///
    /// Relative specifiers are keyed by the would-be absolute path so that
    /// two modules referring to the same missing file share one node.
    pub fn unresolved_id(&self, specifier: &str, from: &ModuleId) -> ModuleId {
        if is_relative(specifier) || Path::new(specifier).is_absolute() {
            let path = normalize(&self.importer_dir(from).join(specifier));
            ModuleId::Unresolved(path.to_string_lossy().into_owned())
        } else {
            ModuleId::Unresolved(specifier.to_string())
        }
    }

    pub fn is_bare(specifier: &str) -> bool {
        !is_relative(specifier) && !Path::new(specifier).is_absolute()
    }

    fn importer_dir(&self, from: &ModuleId) -> PathBuf {
        from.as_path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.context.clone())
    }

    fn resolve_uncached(&self, specifier: &str, dir: &Path) -> Result<Resolved, ResolveError> {
        if specifier.starts_with("node:") {
            return Ok(builtin(specifier));
        }

        if !Self::is_bare(specifier) {
            let path = self.resolve_path(specifier, &dir.join(specifier))?;
            return Ok(self.resolved_file(path, Origin::Relative));
        }

        if let Some(alias) = &self.alias {
            for candidate in alias.candidates(specifier) {
                match self.resolve_path(specifier, &candidate) {
                    Ok(path) => return Ok(self.resolved_file(path, Origin::Alias)),
                    Err(ResolveError::NotFound { .. }) => continue,
                    Err(e) => return Err(e),
                }
            }
        }

        // Aliases may shadow bare core module names but not `node:` ones
        if is_builtin(specifier) {
            return Ok(builtin(specifier));
        }

        for ancestor in dir.ancestors() {
            let base = ancestor.join("node_modules").join(specifier);
            match self.resolve_path(specifier, &base) {
                Ok(path) => return Ok(self.resolved_file(path, Origin::Package)),
                Err(ResolveError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ResolveError::NotFound {
            specifier: specifier.to_string(),
        })
    }

    fn resolved_file(&self, path: PathBuf, origin: Origin) -> Resolved {
        let external = is_under_node_modules(&path) || !path.starts_with(&self.context);
        Resolved {
            id: ModuleId::File(path),
            origin,
            external,
        }
    }

    /// Expand `base` into candidate files and return the first that exists
    ///
    /// Order: exact file, `base.<ext>`, `package.json` entry when `base` is a
    /// directory, `base/index.<ext>`.
    fn resolve_path(&self, specifier: &str, base: &Path) -> Result<PathBuf, ResolveError> {
        if is_file(specifier, base)? {
            return canonical(specifier, base);
        }

        let mut matches = Vec::new();
        for ext in &self.extensions {
            let candidate = with_extension(base, ext);
            if is_file(specifier, &candidate)? {
                matches.push(candidate);
                if !self.disallow_ambiguous {
                    break;
                }
            }
        }
        if self.disallow_ambiguous && matches.len() > 1 {
            return Err(ResolveError::Ambiguous {
                specifier: specifier.to_string(),
                candidates: matches,
            });
        }
        if let Some(found) = matches.first() {
            return canonical(specifier, found);
        }

        if is_dir(specifier, base)? {
            if let Some(entry) = self.package_entry(specifier, base)? {
                return Ok(entry);
            }
            for ext in &self.extensions {
                let candidate = base.join(format!("index.{ext}"));
                if is_file(specifier, &candidate)? {
                    return canonical(specifier, &candidate);
                }
            }
        }

        Err(ResolveError::NotFound {
            specifier: specifier.to_string(),
        })
    }

    /// `module` or `main` of `dir/package.json`, if it names an existing file
    fn package_entry(&self, specifier: &str, dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
        let manifest_path = dir.join("package.json");
        let Ok(content) = fs::read_to_string(&manifest_path) else {
            return Ok(None);
        };
        let manifest: PackageManifest = match serde_json::from_str(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!("ignoring {}: {e}", manifest_path.display());
                return Ok(None);
            }
        };

        for entry in [manifest.module, manifest.main].into_iter().flatten() {
            let base = dir.join(&entry);
            if is_file(specifier, &base)? {
                return canonical(specifier, &base).map(Some);
            }
            for ext in &self.extensions {
                let candidate = with_extension(&base, ext);
                if is_file(specifier, &candidate)? {
                    return canonical(specifier, &candidate).map(Some);
                }
            }
            for ext in &self.extensions {
                let candidate = base.join(format!("index.{ext}"));
                if is_file(specifier, &candidate)? {
                    return canonical(specifier, &candidate).map(Some);
                }
            }
        }

        Ok(None)
    }
}

pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

pub fn is_builtin(specifier: &str) -> bool {
    specifier.starts_with("node:")
        || NODE_BUILTINS.contains(&specifier)
        || NODE_BUILTIN_SUBPATHS.contains(&specifier)
}

fn builtin(specifier: &str) -> Resolved {
    Resolved {
        id: ModuleId::Package(specifier.to_string()),
        origin: Origin::Builtin,
        external: true,
    }
}

fn is_under_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"))
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn stat(specifier: &str, path: &Path) -> Result<Option<fs::Metadata>, ResolveError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(None)
        }
        Err(e) => Err(ResolveError::Unreadable {
            specifier: specifier.to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn is_file(specifier: &str, path: &Path) -> Result<bool, ResolveError> {
    Ok(stat(specifier, path)?.is_some_and(|m| m.is_file()))
}

fn is_dir(specifier: &str, path: &Path) -> Result<bool, ResolveError> {
    Ok(stat(specifier, path)?.is_some_and(|m| m.is_dir()))
}

fn canonical(specifier: &str, path: &Path) -> Result<PathBuf, ResolveError> {
    fs::canonicalize(path).map_err(|e| ResolveError::Unreadable {
        specifier: specifier.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path.canonicalize().unwrap()
    }

    fn resolver(root: &Path) -> ModuleResolver {
        resolver_with(root, None, false)
    }

    fn resolver_with(root: &Path, alias: Option<PathAlias>, disallow_ambiguous: bool) -> ModuleResolver {
        ModuleResolver::new(ResolverOptions {
            context: root.to_path_buf(),
            extensions: ["ts", "tsx", "mjs", "js", "jsx", "json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            alias,
            disallow_ambiguous,
        })
    }

    #[test]
    fn test_relative_with_extension_fallback() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "src/a.ts", "");
        let b = write(temp.path(), "src/b.ts", "");

        let resolved = resolver(temp.path())
            .resolve("./b", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(b));
        assert_eq!(resolved.origin, Origin::Relative);
        assert!(!resolved.external);
    }

    #[test]
    fn test_extension_priority_order() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        let ts = write(temp.path(), "util.ts", "");
        write(temp.path(), "util.js", "");

        let resolved = resolver(temp.path())
            .resolve("./util", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(ts));
    }

    #[test]
    fn test_exact_file_wins_over_extensions() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        let exact = write(temp.path(), "data.json", "{}");
        write(temp.path(), "data.json.ts", "");

        let resolved = resolver(temp.path())
            .resolve("./data.json", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(exact));
    }

    #[test]
    fn test_directory_index() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        let index = write(temp.path(), "lib/index.js", "");

        let resolved = resolver(temp.path())
            .resolve("./lib", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(index));
    }

    #[test]
    fn test_same_file_through_different_specifiers() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "src/a.ts", "");
        let nested = write(temp.path(), "src/nested/x.ts", "");
        write(temp.path(), "src/b.ts", "");

        let resolver = resolver(temp.path());
        let from_a = resolver.resolve("./b", &ModuleId::File(a)).unwrap();
        let from_nested = resolver.resolve("../b.ts", &ModuleId::File(nested)).unwrap();
        assert_eq!(from_a.id, from_nested.id);
    }

    #[test]
    fn test_not_found() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");

        let result = resolver(temp.path()).resolve("./missing", &ModuleId::File(a));
        assert_eq!(
            result,
            Err(ResolveError::NotFound {
                specifier: "./missing".to_string()
            })
        );
    }

    #[test]
    fn test_ambiguity_is_opt_in() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        write(temp.path(), "b.ts", "");
        write(temp.path(), "b.js", "");

        assert!(resolver(temp.path())
            .resolve("./b", &ModuleId::File(a.clone()))
            .is_ok());

        let strict = resolver_with(temp.path(), None, true);
        match strict.resolve("./b", &ModuleId::File(a)) {
            Err(ResolveError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_builtins() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        let resolver = resolver(temp.path());

        for spec in ["fs", "node:fs", "fs/promises", "path"] {
            let resolved = resolver.resolve(spec, &ModuleId::File(a.clone())).unwrap();
            assert_eq!(resolved.origin, Origin::Builtin);
            assert!(resolved.external);
            assert_eq!(resolved.id, ModuleId::Package(spec.to_string()));
        }
    }

    #[test]
    fn test_builtin_prefix_is_not_a_builtin() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        let resolver = resolver(temp.path());

        for spec in ["util/format", "events/bus", "constants/x"] {
            assert!(!is_builtin(spec), "{spec}");
            assert!(matches!(
                resolver.resolve(spec, &ModuleId::File(a.clone())),
                Err(ResolveError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_alias_shadowing_builtin_name() {
        let temp = TempDir::new().unwrap();
        let index = write(temp.path(), "src/index.ts", "");
        let format = write(temp.path(), "src/util/format.ts", "");
        let local_util = write(temp.path(), "src/util.ts", "");

        let mut paths = HashMap::new();
        paths.insert("util/*".to_string(), vec!["src/util/*".to_string()]);
        paths.insert("util".to_string(), vec!["src/util".to_string()]);
        let alias = PathAlias::new(temp.path(), paths);
        let resolver = resolver_with(temp.path(), Some(alias), false);

        let resolved = resolver
            .resolve("util/format", &ModuleId::File(index.clone()))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(format));
        assert_eq!(resolved.origin, Origin::Alias);

        let resolved = resolver.resolve("util", &ModuleId::File(index.clone())).unwrap();
        assert_eq!(resolved.id, ModuleId::File(local_util));

        // the `node:` scheme always means the core module
        let resolved = resolver.resolve("node:util", &ModuleId::File(index)).unwrap();
        assert_eq!(resolved.origin, Origin::Builtin);
    }

    #[test]
    fn test_node_modules_package_with_main() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "src/a.js", "");
        write(
            temp.path(),
            "node_modules/left-pad/package.json",
            r#"{"main": "lib/pad"}"#,
        );
        let entry = write(temp.path(), "node_modules/left-pad/lib/pad.js", "");

        let resolved = resolver(temp.path())
            .resolve("left-pad", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(entry));
        assert_eq!(resolved.origin, Origin::Package);
        assert!(resolved.external);
    }

    #[test]
    fn test_missing_package_is_not_found() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");

        assert!(matches!(
            resolver(temp.path()).resolve("react", &ModuleId::File(a)),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_tsconfig_alias() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "src/pages/a.ts", "");
        let button = write(temp.path(), "src/components/Button.tsx", "");

        let mut paths = HashMap::new();
        paths.insert("@/*".to_string(), vec!["./src/*".to_string()]);
        let alias = PathAlias::new(temp.path(), paths);

        let resolved = resolver_with(temp.path(), Some(alias), false)
            .resolve("@/components/Button", &ModuleId::File(a))
            .unwrap();
        assert_eq!(resolved.id, ModuleId::File(button));
        assert_eq!(resolved.origin, Origin::Alias);
    }

    #[test]
    fn test_outside_context_is_external() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "app/a.js", "");
        write(temp.path(), "shared/s.js", "");

        let resolved = resolver(&temp.path().join("app"))
            .resolve("../shared/s", &ModuleId::File(a))
            .unwrap();
        assert!(resolved.external);
    }

    #[test]
    fn test_resolution_is_memoized_and_deterministic() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.js", "");
        write(temp.path(), "b.js", "");

        let resolver = resolver(temp.path());
        let first = resolver.resolve("./b", &ModuleId::File(a.clone()));
        let second = resolver.resolve("./b", &ModuleId::File(a));
        assert_eq!(first, second);
        assert_eq!(resolver.cache.len(), 1);
    }

    #[test]
    fn test_resolve_entry() {
        let temp = TempDir::new().unwrap();
        let index = write(temp.path(), "src/index.ts", "");

        let resolver = resolver(temp.path());
        assert_eq!(
            resolver.resolve_entry(Path::new("src/index.ts")).unwrap(),
            ModuleId::File(index.clone())
        );
        assert_eq!(
            resolver.resolve_entry(Path::new("src/index")).unwrap(),
            ModuleId::File(index)
        );
    }

    #[test]
    fn test_unresolved_ids() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "src/a.js", "");
        let resolver = resolver(temp.path());

        let id = resolver.unresolved_id("../missing", &ModuleId::File(a.clone()));
        let expected = normalize(&a.parent().unwrap().join("../missing"));
        assert_eq!(id, ModuleId::Unresolved(expected.to_string_lossy().into_owned()));

        assert_eq!(
            resolver.unresolved_id("react", &ModuleId::File(a)),
            ModuleId::Unresolved("react".to_string())
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
    }
}
