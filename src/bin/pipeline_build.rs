use std::path::PathBuf;

use anyhow::{Result, anyhow};
use viz_replay::buildtool::{BuildAction, BuildTool};
use viz_replay::config;

#[derive(Debug, Default, Clone)]
struct Cli {
    config: Option<PathBuf>,
    action: Option<String>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --config"));
                };
                cli.config = Some(PathBuf::from(v));
                i += 2;
            }
            other if cli.action.is_none() && !other.starts_with("--") => {
                cli.action = Some(other.to_string());
                i += 1;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (usage: pipeline-build [--config <file>] <build|clean>)"
                ));
            }
        }
    }
    Ok(cli)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    let Some(action) = cli.action else {
        return Err(anyhow!("missing action (build, clean)"));
    };
    let action: BuildAction = action.parse()?;

    let cfg = match &cli.config {
        Some(path) => config::load_config_from_path(path)?,
        None => config::Config::default(),
    };

    match BuildTool::new(cfg.build).run(action) {
        Ok(()) => Ok(()),
        // The invoked tool already printed its diagnostics; forward its code.
        Err(viz_replay::Error::ExitStatus(status)) => {
            eprintln!("[build] tool failed: {status}");
            std::process::exit(status.code().unwrap_or(1));
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cli_action_and_config() {
        let args = vec![
            "--config".to_string(),
            "viz.json".to_string(),
            "build".to_string(),
        ];
        let cli = parse_cli(&args).unwrap();
        assert_eq!(cli.action.as_deref(), Some("build"));
        assert_eq!(cli.config.as_ref().unwrap(), &PathBuf::from("viz.json"));
    }

    #[test]
    fn parse_cli_rejects_second_positional() {
        let args = vec!["build".to_string(), "clean".to_string()];
        assert!(parse_cli(&args).is_err());
    }
}
