//! Sequential execution of a build plan.

use std::sync::Arc;
use std::time::Instant;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::builder::events::BuildEvent;
use crate::builder::manager::{Invocation, PackageManager};
use crate::builder::plan::BuildPlan;
use crate::core::QualifiedPackageRef;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::shell::{Shell, Status};

/// How a plan is executed.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Print the commands instead of running them
    pub dry_run: bool,
    /// Package-manager profile used for builds
    pub profile: String,
    /// Options forwarded to every build
    pub build_options: Vec<String>,
    /// Upload every package here once all builds succeed
    pub upload_remote: Option<String>,
}

/// A package step failed. The rest of the run was abandoned.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("failed to build `{package}`: {reason}")]
    #[diagnostic(code(foundry::build::failed))]
    BuildFailed {
        package: QualifiedPackageRef,
        reason: String,
    },

    #[error("failed to upload `{package}` to `{remote}`: {reason}")]
    #[diagnostic(code(foundry::build::upload_failed))]
    UploadFailed {
        package: QualifiedPackageRef,
        remote: String,
        reason: String,
    },

    #[error("failed to export `{package}`: {reason}")]
    #[diagnostic(code(foundry::build::export_failed))]
    ExportFailed {
        package: QualifiedPackageRef,
        reason: String,
    },
}

impl BuildError {
    /// The package whose step failed.
    pub fn package(&self) -> &QualifiedPackageRef {
        match self {
            BuildError::BuildFailed { package, .. }
            | BuildError::UploadFailed { package, .. }
            | BuildError::ExportFailed { package, .. } => package,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (step, reason) = match self {
            BuildError::BuildFailed { reason, .. } => ("build", reason),
            BuildError::UploadFailed { reason, .. } => ("upload", reason),
            BuildError::ExportFailed { reason, .. } => ("export", reason),
        };

        Diagnostic::error(format!("{} step failed for `{}`", step, self.package()))
            .with_context(reason.clone())
            .with_context("no further packages were processed".to_string())
            .with_suggestion(suggestions::BUILD_FAILED)
    }
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub exported: Vec<QualifiedPackageRef>,
    pub built: Vec<QualifiedPackageRef>,
    pub uploaded: Vec<QualifiedPackageRef>,
    /// Command lines printed instead of run, in dry-run mode
    pub commands: Vec<String>,
}

/// Runs package-manager steps one package at a time.
pub struct BuildExecutor<'a> {
    manager: &'a dyn PackageManager,
    shell: Arc<Shell>,
    options: ExecutorOptions,
}

impl<'a> BuildExecutor<'a> {
    pub fn new(manager: &'a dyn PackageManager, shell: Arc<Shell>, options: ExecutorOptions) -> Self {
        BuildExecutor {
            manager,
            shell,
            options,
        }
    }

    /// Build every package in plan order, then upload them if a remote is
    /// configured.
    ///
    /// The first failing build stops the run; packages built before it stay
    /// built. Uploads only start once every build has succeeded, and the
    /// first failing upload stops the remaining uploads.
    pub fn run(&self, plan: &BuildPlan) -> Result<ExecutionReport, BuildError> {
        let start = Instant::now();
        let mut report = ExecutionReport::default();

        let result = self.run_inner(plan, &mut report);

        self.shell.json_event(
            &BuildEvent::Finished {
                success: result.is_ok(),
                duration_ms: start.elapsed().as_millis() as u64,
                built: report.built.len() as u64,
                uploaded: report.uploaded.len() as u64,
            }
            .to_value(),
        );

        result.map(|()| report)
    }

    fn run_inner(&self, plan: &BuildPlan, report: &mut ExecutionReport) -> Result<(), BuildError> {
        let packages = plan.qualified();

        let build = Invocation::Build {
            profile: &self.options.profile,
            options: &self.options.build_options,
        };
        for pkg in &packages {
            self.step(pkg, &build, Status::Building, report)
                .map_err(|reason| BuildError::BuildFailed {
                    package: pkg.clone(),
                    reason,
                })?;
            report.built.push(pkg.clone());
        }

        if let Some(remote) = &self.options.upload_remote {
            let upload = Invocation::Upload { remote };
            for pkg in &packages {
                self.step(pkg, &upload, Status::Uploading, report)
                    .map_err(|reason| BuildError::UploadFailed {
                        package: pkg.clone(),
                        remote: remote.clone(),
                        reason,
                    })?;
                report.uploaded.push(pkg.clone());
            }
        }

        Ok(())
    }

    /// Export recipes into the package store, stopping at the first failure.
    pub fn export(&self, packages: &[QualifiedPackageRef]) -> Result<ExecutionReport, BuildError> {
        let mut report = ExecutionReport::default();
        for pkg in packages {
            self.step(pkg, &Invocation::Export, Status::Exporting, &mut report)
                .map_err(|reason| BuildError::ExportFailed {
                    package: pkg.clone(),
                    reason,
                })?;
            report.exported.push(pkg.clone());
        }
        Ok(report)
    }

    /// Run (or, in a dry run, print) one step. Failures are returned as a
    /// rendered reason.
    fn step(
        &self,
        pkg: &QualifiedPackageRef,
        invocation: &Invocation<'_>,
        status: Status,
        report: &mut ExecutionReport,
    ) -> Result<(), String> {
        if self.options.dry_run {
            let command = self.manager.describe(pkg, invocation);
            self.shell.status(Status::Running, &command);
            self.shell.json_event(
                &BuildEvent::step_ok(pkg, invocation.step(), Some(command.clone())).to_value(),
            );
            report.commands.push(command);
            return Ok(());
        }

        debug!("{} {}", invocation.step(), pkg);
        let span = self.shell.span(status, pkg);
        match self.manager.invoke(pkg, invocation) {
            Ok(()) => {
                span.finish_with_message(pkg);
                info!("{} {}: done", invocation.step(), pkg);
                self.shell
                    .json_event(&BuildEvent::step_ok(pkg, invocation.step(), None).to_value());
                Ok(())
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                self.shell.json_event(
                    &BuildEvent::step_failed(pkg, invocation.step(), reason.clone()).to_value(),
                );
                Err(reason)
            }
        }
    }
}
