//! Test fixtures for common test scenarios.
//!
//! Manifests and on-disk project trees shaped like a painting application:
//! one SWIG-wrapped extension, a few pure packages, two scripts and a
//! handful of translations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A manifest exercising every section.
pub const FULL_MANIFEST: &str = r#"
[package]
name = "MyPaint"
version = "1.3.0-alpha"
packages = ["lib", "lib.layer", "gui"]
scripts = ["mypaint.py", "desktop/mypaint-ora-thumbnailer.py"]

[package.package-data]
gui = ["*.xml"]

[extension]
name = "_mypaintlib"
sources = ["lib/mypaintlib.i", "lib/fill.cpp"]
packages = ["glib-2.0", "libpng"]
include-dirs = ["lib"]
extra-compile-args = ["-Wall", "-Wno-sign-compare", "-D_POSIX_C_SOURCE=200809L"]
swig-opts = ["-Wall", "-noproxydel", "-c++", "-DNO_TESTS"]
language = "c++"

[translations]
source-dir = "po"
domain = "mypaint"

[version]
text = 'MYPAINT_VERSION_FORMAL = "1.3.0-alpha"'
"#;

/// A manifest with only pure sources and scripts.
pub const SCRIPTS_ONLY_MANIFEST: &str = r#"
[package]
name = "tool"
version = "0.1.0"
packages = ["tool"]
scripts = ["tool.py"]

[version]
text = 'BUILD_VERSION = "0.1.0"'
"#;

/// Fixture for a complete project structure.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Easel.toml content.
    pub manifest: String,
    /// Files (path relative to project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a fixture with the given manifest and no files.
    pub fn new(manifest: impl Into<String>) -> Self {
        ProjectFixture {
            manifest: manifest.into(),
            files: BTreeMap::new(),
        }
    }

    /// The project described by [`FULL_MANIFEST`].
    pub fn painting_app() -> Self {
        ProjectFixture::new(FULL_MANIFEST)
            .with_file("lib/mypaintlib.i", "%module mypaintlib\n")
            .with_file("lib/fill.cpp", "int fill() { return 0; }\n")
            .with_file("lib/__init__.py", "")
            .with_file("lib/helpers.py", "def clamp(x):\n    return x\n")
            .with_file("lib/layer/__init__.py", "")
            .with_file("lib/layer/data.py", "class Layer: pass\n")
            .with_file("gui/__init__.py", "")
            .with_file("gui/main.py", "def main():\n    pass\n")
            .with_file("gui/menu.xml", "<ui/>\n")
            .with_file(
                "mypaint.py",
                "#!/usr/bin/env python3\nimport gui.main\ngui.main.main()\n",
            )
            .with_file(
                "desktop/mypaint-ora-thumbnailer.py",
                "#!/usr/bin/env python3\nprint('thumb')\n",
            )
            .with_file("po/de.po", "msgid \"\"\nmsgstr \"\"\n")
            .with_file("po/fr.po", "msgid \"\"\nmsgstr \"\"\n")
            .with_file("po/mypaint.pot", "")
    }

    /// The project described by [`SCRIPTS_ONLY_MANIFEST`].
    pub fn scripts_only() -> Self {
        ProjectFixture::new(SCRIPTS_ONLY_MANIFEST)
            .with_file("tool/__init__.py", "")
            .with_file("tool.py", "#!/usr/bin/env python3\nprint('hi')\n")
    }

    /// Add or replace a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write this fixture into `root`.
    pub fn write_to(&self, root: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(root)?;
        std::fs::write(root.join(crate::core::manifest::MANIFEST_NAME), &self.manifest)?;

        for (rel_path, content) in &self.files {
            let full_path = root.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(root.to_path_buf())
    }
}
