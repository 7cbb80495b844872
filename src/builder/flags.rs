//! pkg-config flag resolution.
//!
//! Turns a list of library names into categorized compiler/linker flags.
//! Each token pkg-config prints is classified by its two-character prefix;
//! anything unrecognized lands in the catch-all category of the query that
//! produced it.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::error::BuildError;
use crate::util::process::{Executor, ProcessBuilder, ProcessError};

/// Category of a single compiler/linker argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    IncludeDir,
    LibraryDir,
    Library,
    ExtraCompileArg,
    ExtraLinkArg,
}

impl FlagCategory {
    pub const ALL: [FlagCategory; 5] = [
        FlagCategory::IncludeDir,
        FlagCategory::LibraryDir,
        FlagCategory::Library,
        FlagCategory::ExtraCompileArg,
        FlagCategory::ExtraLinkArg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlagCategory::IncludeDir => "include_dirs",
            FlagCategory::LibraryDir => "library_dirs",
            FlagCategory::Library => "libraries",
            FlagCategory::ExtraCompileArg => "extra_compile_args",
            FlagCategory::ExtraLinkArg => "extra_link_args",
        }
    }
}

impl fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefixes whose value is stored without the prefix.
const PREFIX_TABLE: [(&str, FlagCategory); 3] = [
    ("-I", FlagCategory::IncludeDir),
    ("-L", FlagCategory::LibraryDir),
    ("-l", FlagCategory::Library),
];

/// The two pkg-config queries, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkgConfigQuery {
    Libs,
    Cflags,
}

impl PkgConfigQuery {
    pub const ORDER: [PkgConfigQuery; 2] = [PkgConfigQuery::Libs, PkgConfigQuery::Cflags];

    pub fn as_arg(self) -> &'static str {
        match self {
            PkgConfigQuery::Libs => "--libs",
            PkgConfigQuery::Cflags => "--cflags",
        }
    }

    /// Category for tokens with no recognized prefix.
    pub fn catch_all(self) -> FlagCategory {
        match self {
            PkgConfigQuery::Libs => FlagCategory::ExtraLinkArg,
            PkgConfigQuery::Cflags => FlagCategory::ExtraCompileArg,
        }
    }
}

/// Classify one token from a pkg-config query.
pub fn classify(token: &str, query: PkgConfigQuery) -> (FlagCategory, String) {
    let prefix = token.get(..2);
    for (known, category) in PREFIX_TABLE {
        if prefix == Some(known) {
            return (category, token[2..].to_string());
        }
    }
    (query.catch_all(), token.to_string())
}

/// Order-preserving deduplication: keeps the first occurrence of each item.
pub fn uniq<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }
    result
}

/// Category -> ordered, deduplicated flag values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFlagSet {
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
}

impl ResolvedFlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: FlagCategory) -> &[String] {
        match category {
            FlagCategory::IncludeDir => &self.include_dirs,
            FlagCategory::LibraryDir => &self.library_dirs,
            FlagCategory::Library => &self.libraries,
            FlagCategory::ExtraCompileArg => &self.extra_compile_args,
            FlagCategory::ExtraLinkArg => &self.extra_link_args,
        }
    }

    fn get_mut(&mut self, category: FlagCategory) -> &mut Vec<String> {
        match category {
            FlagCategory::IncludeDir => &mut self.include_dirs,
            FlagCategory::LibraryDir => &mut self.library_dirs,
            FlagCategory::Library => &mut self.libraries,
            FlagCategory::ExtraCompileArg => &mut self.extra_compile_args,
            FlagCategory::ExtraLinkArg => &mut self.extra_link_args,
        }
    }

    /// Append a value to a category (no deduplication until [`dedup`]).
    ///
    /// [`dedup`]: ResolvedFlagSet::dedup
    pub fn push(&mut self, category: FlagCategory, value: impl Into<String>) {
        self.get_mut(category).push(value.into());
    }

    /// Append several values to a category.
    pub fn extend<I, S>(&mut self, category: FlagCategory, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into);
        self.get_mut(category).extend(values);
    }

    /// Deduplicate every category in place, keeping first-seen order.
    pub fn dedup(&mut self) {
        for category in FlagCategory::ALL {
            let values = std::mem::take(self.get_mut(category));
            *self.get_mut(category) = uniq(values);
        }
    }

    pub fn include_dir_paths(&self) -> Vec<PathBuf> {
        self.include_dirs.iter().map(PathBuf::from).collect()
    }

    pub fn library_dir_paths(&self) -> Vec<PathBuf> {
        self.library_dirs.iter().map(PathBuf::from).collect()
    }
}

/// Queries pkg-config for a set of dependencies.
pub struct FlagResolver<'a> {
    pkg_config: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> FlagResolver<'a> {
    pub fn new(pkg_config: impl AsRef<Path>, executor: &'a dyn Executor) -> Self {
        FlagResolver {
            pkg_config: pkg_config.as_ref().to_path_buf(),
            executor,
        }
    }

    /// Merge the flags for `packages` into `defaults` and deduplicate.
    ///
    /// A missing tool or a non-zero exit is a configuration error: an empty
    /// flag set would only show up later as a mis-linked module.
    pub fn resolve(
        &self,
        packages: &[String],
        defaults: ResolvedFlagSet,
    ) -> Result<ResolvedFlagSet> {
        let mut flags = defaults;

        if !packages.is_empty() {
            for query in PkgConfigQuery::ORDER {
                for token in self.query(query, packages)? {
                    let (category, value) = classify(&token, query);
                    flags.push(category, value);
                }
            }
        }

        flags.dedup();
        Ok(flags)
    }

    fn query(&self, query: PkgConfigQuery, packages: &[String]) -> Result<Vec<String>> {
        let cmd = ProcessBuilder::new(&self.pkg_config)
            .arg(query.as_arg())
            .args(packages);

        tracing::debug!("running {}", cmd.display_command());

        let output = self.executor.output(&cmd).map_err(|e| match e {
            ProcessError::NotFound { program } => BuildError::Configuration {
                message: format!(
                    "`{}` was not found; it is required to resolve {}",
                    program,
                    packages.join(", ")
                ),
            },
            ProcessError::Spawn { program, source } => BuildError::Configuration {
                message: format!("could not run `{}`: {}", program, source),
            },
        })?;

        if !output.success() {
            let stderr = output.stderr.trim();
            return Err(BuildError::Configuration {
                message: format!(
                    "`{}` failed{}{}",
                    cmd.display_command(),
                    if stderr.is_empty() { "" } else { ": " },
                    stderr
                ),
            }
            .into());
        }

        Ok(output
            .stdout
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}
