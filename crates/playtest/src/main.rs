use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use playtest::{run, CommandKind, RunOptions};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }
    let kind = parse_command(&args)?;
    run(kind, &mut io::stdout())
}

fn parse_command(args: &[String]) -> Result<CommandKind, String> {
    let command = args
        .first()
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[1..];

    match command {
        "run" => {
            let level = command_args
                .first()
                .ok_or_else(|| "run requires a level file path".to_string())?;
            let options = parse_run_options(&command_args[1..])?;
            Ok(CommandKind::Run {
                level: PathBuf::from(level),
                options,
            })
        }
        "convert" => match command_args {
            [input, output] => Ok(CommandKind::Convert {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
            }),
            _ => Err("convert requires <input.json> <output.json>".to_string()),
        },
        other => Err(format!("unknown subcommand '{other}'")),
    }
}

fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        let flag = args[index].as_str();
        let value = args
            .get(index + 1)
            .ok_or_else(|| format!("missing value for {flag}"))?;
        match flag {
            "--ticks" => {
                options.ticks = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --ticks value '{value}' (expected u32)"))?;
            }
            "--dt" => {
                options.dt = value
                    .parse::<f32>()
                    .ok()
                    .filter(|dt| dt.is_finite() && *dt > 0.0)
                    .ok_or_else(|| {
                        format!("invalid --dt value '{value}' (expected positive seconds)")
                    })?;
            }
            "--events" => {
                options.events = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --events value '{value}' (expected usize)"))?;
            }
            "--config" => {
                options.config_path = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown run argument '{other}'")),
        }
        index += 2;
    }
    Ok(options)
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "playtest - headless level runner",
        "",
        "Usage:",
        "  playtest run <level.json> [--ticks <u32>] [--dt <seconds>] [--events <n>] [--config <config.json>]",
        "  playtest convert <input.json> <output.json>",
        "",
        "Defaults:",
        "  --ticks 600",
        "  --dt 0.016667",
        "  --events 10",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn run_parses_all_flags() {
        let kind = parse_command(&args(&[
            "run",
            "level.json",
            "--ticks",
            "30",
            "--dt",
            "0.5",
            "--config",
            "core.json",
        ]))
        .expect("kind");
        assert_eq!(
            kind,
            CommandKind::Run {
                level: PathBuf::from("level.json"),
                options: RunOptions {
                    ticks: 30,
                    dt: 0.5,
                    config_path: Some(PathBuf::from("core.json")),
                    ..RunOptions::default()
                },
            }
        );
    }

    #[test]
    fn run_rejects_bad_values() {
        let err = parse_command(&args(&["run", "level.json", "--dt", "-1"])).expect_err("err");
        assert!(err.contains("--dt"), "{err}");
        let err = parse_command(&args(&["run", "level.json", "--ticks"])).expect_err("err");
        assert_eq!(err, "missing value for --ticks");
        let err = parse_command(&args(&["run", "level.json", "--fast", "1"])).expect_err("err");
        assert!(err.contains("--fast"), "{err}");
    }

    #[test]
    fn convert_needs_exactly_two_paths() {
        assert!(parse_command(&args(&["convert", "a.json"])).is_err());
        assert_eq!(
            parse_command(&args(&["convert", "a.json", "b.json"])).expect("kind"),
            CommandKind::Convert {
                input: PathBuf::from("a.json"),
                output: PathBuf::from("b.json"),
            }
        );
    }

    #[test]
    fn unknown_subcommand_is_reported() {
        let err = parse_command(&args(&["play"])).expect_err("err");
        assert_eq!(err, "unknown subcommand 'play'");
    }
}
