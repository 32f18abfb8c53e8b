//! The external package manager.
//!
//! Foundry never compiles anything itself. Exporting recipes, building
//! packages, uploading them and searching the local store are all
//! delegated to a Conan-compatible command-line tool.
//!
//! The tool is handed recipe directories, never individual files. Each
//! directory holds the `recipe.lua` foundry resolves from, and the tool is
//! expected to find its own recipe format (a conanfile) alongside it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::QualifiedPackageRef;
use crate::util::process::{find_executable, ProcessBuilder};

/// One step the package manager can perform for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// Register the recipe in the local store
    Export,
    /// Build the package from its recipe
    Build {
        profile: &'a str,
        options: &'a [String],
    },
    /// Push the built package to a remote
    Upload { remote: &'a str },
}

impl Invocation<'_> {
    /// Short name of the step, for messages.
    pub fn step(&self) -> &'static str {
        match self {
            Invocation::Export => "export",
            Invocation::Build { .. } => "build",
            Invocation::Upload { .. } => "upload",
        }
    }
}

/// Operations delegated to the external package manager.
pub trait PackageManager {
    /// Run one step for a package, failing if the tool reports failure.
    fn invoke(&self, pkg: &QualifiedPackageRef, invocation: &Invocation<'_>) -> Result<()>;

    /// The command line `invoke` would run, for dry runs and logs.
    fn describe(&self, pkg: &QualifiedPackageRef, invocation: &Invocation<'_>) -> String;

    /// Whether the store holds at least one binary for the package.
    fn search(&self, pkg: &QualifiedPackageRef) -> Result<bool>;
}

/// A Conan-compatible command-line package manager.
#[derive(Debug, Clone)]
pub struct ConanCli {
    program: String,
    /// Root holding `<name>/<version>/recipe.lua`
    recipes_root: PathBuf,
}

impl ConanCli {
    pub fn new(program: impl Into<String>, recipes_root: impl Into<PathBuf>) -> Self {
        ConanCli {
            program: program.into(),
            recipes_root: recipes_root.into(),
        }
    }

    fn recipe_dir(&self, pkg: &QualifiedPackageRef) -> PathBuf {
        self.recipes_root.join(pkg.name()).join(pkg.version())
    }

    /// Resolve the program in PATH, keeping the bare name if it isn't there
    /// so the spawn error names what the user configured.
    fn executable(&self) -> PathBuf {
        if Path::new(&self.program).components().count() > 1 {
            return PathBuf::from(&self.program);
        }
        find_executable(&self.program).unwrap_or_else(|| PathBuf::from(&self.program))
    }

    fn command(
        &self,
        program: impl AsRef<Path>,
        pkg: &QualifiedPackageRef,
        invocation: &Invocation<'_>,
    ) -> ProcessBuilder {
        let recipe_dir = self.recipe_dir(pkg);
        match invocation {
            Invocation::Export => ProcessBuilder::new(program)
                .arg("export")
                .arg(&recipe_dir)
                .arg(pkg.to_string()),
            Invocation::Build { profile, options } => {
                let mut cmd = ProcessBuilder::new(program)
                    .arg("create")
                    .arg(&recipe_dir)
                    .arg(pkg.namespace().to_string())
                    .args(["--profile", *profile]);
                for option in options.iter() {
                    cmd = cmd.args(["-o", option.as_str()]);
                }
                cmd
            }
            Invocation::Upload { remote } => ProcessBuilder::new(program)
                .arg("upload")
                .arg(pkg.to_string())
                .args(["--all", "--confirm", "-r", *remote]),
        }
    }
}

impl PackageManager for ConanCli {
    fn invoke(&self, pkg: &QualifiedPackageRef, invocation: &Invocation<'_>) -> Result<()> {
        let mut cmd = self.command(self.executable(), pkg, invocation);

        // Builds run from a scratch directory so build files never land in
        // the recipe tree or the user's working directory.
        let scratch = match invocation {
            Invocation::Build { .. } => {
                let dir = tempfile::Builder::new()
                    .prefix("foundry-build-")
                    .tempdir()
                    .context("failed to create build directory")?;
                cmd = cmd.cwd(dir.path());
                Some(dir)
            }
            _ => None,
        };

        let result = cmd.status_and_check();
        drop(scratch);
        result
    }

    fn describe(&self, pkg: &QualifiedPackageRef, invocation: &Invocation<'_>) -> String {
        self.command(&self.program, pkg, invocation).display_command()
    }

    fn search(&self, pkg: &QualifiedPackageRef) -> Result<bool> {
        let report = tempfile::Builder::new()
            .prefix("foundry-search-")
            .suffix(".json")
            .tempfile()
            .context("failed to create search report file")?;

        ProcessBuilder::new(self.executable())
            .arg("search")
            .arg(pkg.to_string())
            .arg("--json")
            .arg(report.path())
            .exec_and_check()?;

        let contents = std::fs::read_to_string(report.path())
            .with_context(|| format!("failed to read search report for {}", pkg))?;
        let json: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("malformed search report for {}", pkg))?;

        let found = has_binary_packages(&json);
        debug!("search {}: {}", pkg, if found { "found" } else { "not found" });
        Ok(found)
    }
}

/// Whether a search report lists at least one binary package.
///
/// The report looks like `{"results": [{"items": [{"packages": [...]}]}]}`.
pub fn has_binary_packages(report: &serde_json::Value) -> bool {
    report
        .pointer("/results/0/items/0/packages")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|packages| !packages.is_empty())
}
