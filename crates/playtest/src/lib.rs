mod atomic_io;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use stagecore::level::{document_to_json_pretty, is_legacy, parse_level_value};
use stagecore::{CoreConfig, PlaySession, TemplateLibrary};
use tracing::info;

pub const DEFAULT_TICKS: u32 = 600;
pub const DEFAULT_DT: f32 = 1.0 / 60.0;
pub const DEFAULT_EVENTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub ticks: u32,
    pub dt: f32,
    pub events: usize,
    pub config_path: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            dt: DEFAULT_DT,
            events: DEFAULT_EVENTS,
            config_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Run { level: PathBuf, options: RunOptions },
    Convert { input: PathBuf, output: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub name: String,
    pub ticks: u64,
    pub elapsed_seconds: f64,
    pub entities: usize,
    pub player: Option<PlayerSummary>,
    pub level_complete: bool,
    pub recent_events: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSummary {
    pub health: u32,
    pub score: u32,
    pub alive: bool,
}

pub fn run<W: Write>(kind: CommandKind, stdout: &mut W) -> Result<(), String> {
    match kind {
        CommandKind::Run { level, options } => {
            let summary = play_level(&level, &options)?;
            write_summary(stdout, &summary)
        }
        CommandKind::Convert { input, output } => {
            let legacy = convert_file(&input, &output, &CoreConfig::default())?;
            let verb = if legacy { "converted" } else { "normalized" };
            writeln!(stdout, "{verb} {} -> {}", input.display(), output.display())
                .map_err(|error| format!("failed to write output: {error}"))
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<CoreConfig, String> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read config {}: {error}", path.display()))?;
    CoreConfig::from_json_str(&raw)
        .map_err(|error| format!("invalid config {}: {error}", path.display()))
}

pub fn play_level(path: &Path, options: &RunOptions) -> Result<RunSummary, String> {
    let config = load_config(options.config_path.as_deref())?;
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read level {}: {error}", path.display()))?;
    let mut session = PlaySession::from_json_str(&raw, config, &TemplateLibrary::builtin())
        .map_err(|error| format!("failed to load level {}: {error}", path.display()))?;

    for _ in 0..options.ticks {
        session.tick(options.dt);
        if session.level_complete() {
            break;
        }
    }

    let summary = RunSummary {
        name: session.name().to_string(),
        ticks: session.tick_count(),
        elapsed_seconds: session.elapsed_seconds(),
        entities: session.registry().len(),
        player: session.player_state().map(|state| PlayerSummary {
            health: state.health,
            score: state.score,
            alive: state.is_alive(),
        }),
        level_complete: session.level_complete(),
        recent_events: session
            .recent_events(options.events)
            .into_iter()
            .map(|event| {
                format!(
                    "tick={} t={:.3} {}#{} {}#{} {} side={}",
                    event.tick,
                    event.timestamp,
                    event.kind_a.as_str(),
                    event.entity_a.0,
                    event.kind_b.as_str(),
                    event.entity_b.0,
                    event.category.as_str(),
                    event.side.as_str(),
                )
            })
            .collect(),
    };
    session.teardown();
    Ok(summary)
}

/// Rewrites `input` in the current schema. Returns whether the input was in
/// the legacy layout.
pub fn convert_file(input: &Path, output: &Path, config: &CoreConfig) -> Result<bool, String> {
    let raw = fs::read_to_string(input)
        .map_err(|error| format!("failed to read level {}: {error}", input.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|error| format!("level {} is not valid JSON: {error}", input.display()))?;
    let legacy = is_legacy(&value);
    let document = parse_level_value(value, config)
        .map_err(|error| format!("failed to parse level {}: {error}", input.display()))?;
    let text = document_to_json_pretty(&document)
        .map_err(|error| format!("failed to serialize level: {error}"))?;
    atomic_io::write_text_atomic(output, &text)
        .map_err(|error| format!("failed to write {}: {error}", output.display()))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        legacy,
        objects = document.objects.len(),
        "level_file_written"
    );
    Ok(legacy)
}

fn write_summary<W: Write>(stdout: &mut W, summary: &RunSummary) -> Result<(), String> {
    let mut lines = vec![
        format!("level: {}", summary.name),
        format!(
            "ticks: {} elapsed: {:.3}s entities: {}",
            summary.ticks, summary.elapsed_seconds, summary.entities
        ),
    ];
    match summary.player {
        Some(player) => lines.push(format!(
            "player: health={} score={} alive={}",
            player.health, player.score, player.alive
        )),
        None => lines.push("player: none".to_string()),
    }
    lines.push(format!("level_complete: {}", summary.level_complete));
    lines.push(format!("recent collisions: {}", summary.recent_events.len()));
    lines.extend(summary.recent_events.iter().map(|line| format!("  {line}")));

    for line in lines {
        writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))?;
    }
    Ok(())
}
