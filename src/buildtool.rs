//! Wrapper around the external build of the analysis pipeline.
//!
//! Thin subprocess glue: `build` generates the build system and runs the
//! install target, `clean` removes the build directory. A non-zero exit
//! from either tool propagates as [`Error::ExitStatus`] carrying the
//! status; there is no partial-failure handling beyond that.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::anyhow;

use crate::config::BuildConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Build,
    Clean,
}

impl FromStr for BuildAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "build" => Ok(BuildAction::Build),
            "clean" => Ok(BuildAction::Clean),
            other => Err(anyhow!("unsupported action: {other}")),
        }
    }
}

pub struct BuildTool {
    cfg: BuildConfig,
    generator: PathBuf,
    builder: PathBuf,
}

impl BuildTool {
    pub fn new(cfg: BuildConfig) -> Self {
        Self::with_programs(cfg, "cmake", "ninja")
    }

    /// Substitute the generator/build-tool programs (tests use this).
    pub fn with_programs(
        cfg: BuildConfig,
        generator: impl Into<PathBuf>,
        builder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cfg,
            generator: generator.into(),
            builder: builder.into(),
        }
    }

    pub fn run(&self, action: BuildAction) -> Result<()> {
        match action {
            BuildAction::Build => self.build(),
            BuildAction::Clean => self.clean(),
        }
    }

    /// Removing a build dir that does not exist is a no-op.
    fn clean(&self) -> Result<()> {
        if self.cfg.build_dir.exists() {
            tracing::info!(dir = %self.cfg.build_dir.display(), "removing build directory");
            std::fs::remove_dir_all(&self.cfg.build_dir)?;
        }
        Ok(())
    }

    fn build(&self) -> Result<()> {
        std::fs::create_dir_all(&self.cfg.build_dir)?;
        self.generate()?;
        self.install()
    }

    fn generate(&self) -> Result<()> {
        let mut cmd = Command::new(&self.generator);
        cmd.current_dir(&self.cfg.build_dir)
            .arg("-G")
            .arg("Ninja")
            .arg("-D")
            .arg(format!(
                "COMPONENTS_DIR={}",
                absolutize(&self.cfg.components_dir)?.display()
            ))
            .arg("-D")
            .arg(format!(
                "VENDOR_DIR={}",
                absolutize(&self.cfg.vendor_dir)?.display()
            ))
            .arg(absolutize(&self.cfg.source_dir)?);
        if let Some(cflags) = &self.cfg.cflags {
            cmd.env("CFLAGS", cflags);
        }
        if let Some(cxxflags) = &self.cfg.cxxflags {
            cmd.env("CXXFLAGS", cxxflags);
        }
        run_cmd(cmd)
    }

    fn install(&self) -> Result<()> {
        let mut cmd = Command::new(&self.builder);
        cmd.current_dir(&self.cfg.build_dir)
            .arg("install")
            .env("DESTDIR", absolutize(&self.cfg.install_root)?);
        run_cmd(cmd)
    }
}

/// The generator runs inside the build dir, so every configured path must
/// be handed over absolute.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn run_cmd(mut cmd: Command) -> Result<()> {
    tracing::debug!(?cmd, "running");
    let status = cmd.status()?;
    if !status.success() {
        return Err(Error::ExitStatus(status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse() {
        assert_eq!("build".parse::<BuildAction>().unwrap(), BuildAction::Build);
        assert_eq!("clean".parse::<BuildAction>().unwrap(), BuildAction::Clean);
        assert!("mrproper".parse::<BuildAction>().is_err());
    }
}
