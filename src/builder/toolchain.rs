//! Command generation for the wrapper generator, compiler and linker.
//!
//! Only GCC-style drivers (`c++`, `g++`, `clang++`, MinGW) are supported;
//! every command is returned as a [`ProcessBuilder`] for the caller to run.

use std::path::{Path, PathBuf};

use crate::builder::extension::CompileUnit;
use crate::core::manifest::Language;
use crate::core::platform::TargetPlatform;
use crate::util::fs::relative_path;
use crate::util::process::ProcessBuilder;

/// Whether a source is an interface definition for the wrapper generator.
pub fn is_interface(source: &Path) -> bool {
    source.extension().is_some_and(|ext| ext == "i")
}

/// GCC-style toolchain.
#[derive(Debug, Clone)]
pub struct Toolchain {
    cxx: PathBuf,
    swig: PathBuf,
    platform: TargetPlatform,
}

impl Toolchain {
    pub fn new(
        cxx: impl Into<PathBuf>,
        swig: impl Into<PathBuf>,
        platform: TargetPlatform,
    ) -> Self {
        Toolchain {
            cxx: cxx.into(),
            swig: swig.into(),
            platform,
        }
    }

    /// Path of the wrapper generated for `interface` inside `temp`.
    pub fn wrapper_path(&self, unit: &CompileUnit, interface: &Path, temp: &Path) -> PathBuf {
        let stem = interface
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = match unit.language {
            Language::Cxx => "cpp",
            Language::C => "c",
        };
        temp.join(format!("{}_wrap.{}", stem, ext))
    }

    /// Object file for `source`, mirroring its location under `root`.
    ///
    /// Generated wrappers already live in `temp` and keep their file name.
    pub fn object_path(&self, source: &Path, root: &Path, temp: &Path) -> PathBuf {
        let rel = match source.strip_prefix(temp) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => relative_path(root, source),
        };
        let rel: PathBuf = rel
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect();
        temp.join(rel).with_extension("o")
    }

    /// `swig -python [-c++] <opts> -outdir <dir> -o <wrapper> <interface>`
    ///
    /// The high-level module is written next to the interface file.
    pub fn swig_command(
        &self,
        unit: &CompileUnit,
        interface: &Path,
        wrapper: &Path,
    ) -> ProcessBuilder {
        let outdir = interface.parent().unwrap_or_else(|| Path::new("."));

        let mut cmd = ProcessBuilder::new(&self.swig).arg("-python");
        if unit.language == Language::Cxx && !unit.swig_opts.iter().any(|o| o == "-c++") {
            cmd = cmd.arg("-c++");
        }
        cmd.args(&unit.swig_opts)
            .arg("-outdir")
            .arg(outdir)
            .arg("-o")
            .arg(wrapper)
            .arg(interface)
    }

    /// `<cxx> -c [-fPIC] -I… <extra compile args> <src> -o <obj>`
    pub fn compile_command(
        &self,
        unit: &CompileUnit,
        source: &Path,
        object: &Path,
    ) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cxx).arg("-c");

        if self.position_independent() {
            cmd = cmd.arg("-fPIC");
        }

        for dir in &unit.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd.args(&unit.extra_compile_args)
            .arg(source)
            .arg("-o")
            .arg(object)
    }

    /// `<cxx> -shared -o <module> <objs> -L… -l… <extra link args>`
    pub fn link_command(
        &self,
        unit: &CompileUnit,
        objects: &[PathBuf],
        output: &Path,
    ) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cxx);

        cmd = match self.platform {
            TargetPlatform::Darwin => cmd.args(["-bundle", "-undefined", "dynamic_lookup"]),
            _ => cmd.arg("-shared"),
        };

        cmd = cmd.arg("-o").arg(output).args(objects);

        for dir in &unit.library_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }
        for lib in &unit.libraries {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd.args(&unit.extra_link_args)
    }

    fn position_independent(&self) -> bool {
        !matches!(self.platform, TargetPlatform::Windows | TargetPlatform::Msys)
    }

    /// The compiler driver path.
    pub fn cxx(&self) -> &Path {
        &self.cxx
    }
}
