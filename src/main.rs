use std::{fs::File, io::Read, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use viz_replay::{chart, config, scene, stub, wire::ValueReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKind {
    Chart,
    Scene,
}

#[derive(Debug, Default, Clone)]
struct Cli {
    session: Option<SessionKind>,
    input: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--session" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --session"));
                };
                cli.session = Some(match v.as_str() {
                    "chart" => SessionKind::Chart,
                    "scene" => SessionKind::Scene,
                    other => return Err(anyhow!("unknown session kind: {other} (chart, scene)")),
                });
                i += 2;
            }
            "--input" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --input"));
                };
                cli.input = Some(PathBuf::from(v));
                i += 2;
            }
            "--config" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --config"));
                };
                cli.config = Some(PathBuf::from(v));
                i += 2;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --session <chart|scene>, --input <stream>, --config <file>)"
                ));
            }
        }
    }
    Ok(cli)
}

fn open_input(cli: &Cli) -> Result<Box<dyn Read>> {
    match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open stream at {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdin())),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    let Some(session) = cli.session else {
        return Err(anyhow!("missing --session <chart|scene>"));
    };

    let cfg = match &cli.config {
        Some(path) => config::load_config_from_path(path)?,
        None => config::Config::default(),
    };

    let input = open_input(&cli)?;
    let mut reader = ValueReader::new(input);

    match session {
        SessionKind::Chart => {
            let mut backend = stub::TraceChart::default();
            let stats = chart::replay_chart(&mut reader, &mut backend)?;
            println!(
                "[replay] chart session done: {} instructions",
                stats.dispatched
            );
        }
        SessionKind::Scene => {
            let mut backend = stub::FlatScene::default();
            let stats = scene::replay_scene(&mut reader, &cfg.rig, &mut backend)?;
            println!(
                "[replay] scene session done: {} rendered, {} skipped",
                stats.rendered, stats.skipped
            );
        }
    }

    Ok(())
}
