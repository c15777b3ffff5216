mod logging;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use stroke_tutor::{LetterBank, Point, SessionEvent, SessionOutput, TracerConfig, TracingSession};

#[derive(Debug, Parser)]
#[command(name = "trace_replay")]
#[command(about = "Replay a recorded pointer trace against a letter and print session events")]
struct Cli {
    /// Letter bank JSON.
    letters: PathBuf,
    /// Pointer trace CSV.
    trace: PathBuf,
    /// Letter to trace; the first letter in the bank when omitted.
    #[arg(long)]
    letter: Option<String>,
    /// Tracer TOML config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Expected event kinds, one per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TraceAction {
    Down(Point),
    Move(Point),
    Up,
    Tick,
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TraceLine {
    ms: u64,
    action: TraceAction,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => TracerConfig::load(path)?,
        None => TracerConfig::default(),
    };
    let bank = LetterBank::load(&cli.letters)?;
    let letter = match &cli.letter {
        Some(name) => bank.by_name(name)?.clone(),
        None => bank
            .get(0)
            .cloned()
            .context("letter bank has no letters")?,
    };
    let trace = parse_trace(&cli.trace)?;

    let mut session = TracingSession::new(config);
    let start_ms = trace.first().map(|line| line.ms).unwrap_or(0);
    let mut rows = Vec::new();
    let output = session.load_letter(start_ms, letter)?;
    collect(&mut rows, start_ms, &output);

    for line in &trace {
        let output = match line.action {
            TraceAction::Down(point) => session.pointer_down(line.ms, point),
            TraceAction::Move(point) => session.pointer_move(line.ms, point),
            TraceAction::Up => session.pointer_up(line.ms),
            TraceAction::Tick => session.tick(line.ms),
            TraceAction::Skip => session.skip_demonstration(line.ms),
        };
        collect(&mut rows, line.ms, &output);
    }

    println!("event,ms,kind,chunk,detail");
    for (ms, event) in &rows {
        println!(
            "event,{},{},{},{}",
            ms,
            event.label(),
            chunk_column(event),
            detail_column(event)
        );
    }

    if let Some(expect_path) = &cli.expect {
        let expected = parse_expected_kinds(expect_path)?;
        let actual: Vec<&str> = rows.iter().map(|(_, event)| event.label()).collect();
        if actual != expected {
            eprintln!("expected kinds: {}", expected.join(","));
            eprintln!("actual kinds:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
    }

    Ok(())
}

fn collect(rows: &mut Vec<(u64, SessionEvent)>, ms: u64, output: &SessionOutput) {
    rows.extend(output.iter().map(|event| (ms, *event)));
}

fn chunk_column(event: &SessionEvent) -> String {
    match *event {
        SessionEvent::DemonstrationStarted { token }
        | SessionEvent::DemonstrationFinished { token }
        | SessionEvent::DemonstrationCancelled { token } => token.chunk_index.to_string(),
        SessionEvent::GestureStarted { chunk_index }
        | SessionEvent::InvalidStart { chunk_index }
        | SessionEvent::OffPath { chunk_index, .. }
        | SessionEvent::Progress { chunk_index, .. }
        | SessionEvent::ChunkEvaluated { chunk_index, .. }
        | SessionEvent::ChunkRetry { chunk_index, .. } => chunk_index.to_string(),
        SessionEvent::ChunkAdvanced {
            completed_chunk, ..
        } => completed_chunk.to_string(),
        SessionEvent::LetterComplete { .. } => "-".to_string(),
    }
}

fn detail_column(event: &SessionEvent) -> String {
    match *event {
        SessionEvent::DemonstrationStarted { token }
        | SessionEvent::DemonstrationFinished { token }
        | SessionEvent::DemonstrationCancelled { token } => format!("gen={}", token.generation),
        SessionEvent::GestureStarted { .. } | SessionEvent::InvalidStart { .. } => String::new(),
        SessionEvent::OffPath { point, .. } => format!("{:.1} {:.1}", point.x, point.y),
        SessionEvent::Progress {
            completed, total, ..
        } => format!("{completed}/{total}"),
        SessionEvent::ChunkEvaluated {
            completion_rate, ..
        }
        | SessionEvent::ChunkRetry {
            completion_rate, ..
        } => format!("{completion_rate:.1}"),
        SessionEvent::ChunkAdvanced { next_chunk, .. } => format!("next={next_chunk}"),
        SessionEvent::LetterComplete { letter_index } => format!("letter={letter_index}"),
    }
}

fn parse_trace(path: &Path) -> Result<Vec<TraceLine>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("failed to read {}:{}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed = parse_trace_line(trimmed)
            .with_context(|| format!("{}:{} invalid trace line", path.display(), line_no))?;
        if let Some(parsed) = parsed {
            out.push(parsed);
        }
    }

    Ok(out)
}

/// `pointer,<ms>,<down|move|up|tick|skip>[,x,y]`. Lines with another
/// record tag, like a header, yield `None`.
fn parse_trace_line(line: &str) -> Result<Option<TraceLine>> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts[0] != "pointer" || parts.get(1) == Some(&"ms") {
        return Ok(None);
    }
    if parts.len() < 3 {
        bail!("expected at least 3 columns, got {}", parts.len());
    }
    let ms: u64 = parts[1]
        .parse()
        .with_context(|| format!("invalid ms '{}'", parts[1]))?;

    let point = || -> Result<Point> {
        if parts.len() < 5 {
            bail!("`{}` needs x and y columns", parts[2]);
        }
        let x: f32 = parts[3]
            .parse()
            .with_context(|| format!("invalid x '{}'", parts[3]))?;
        let y: f32 = parts[4]
            .parse()
            .with_context(|| format!("invalid y '{}'", parts[4]))?;
        Ok(Point::new(x, y))
    };

    let action = match parts[2].to_ascii_lowercase().as_str() {
        "down" => TraceAction::Down(point()?),
        "move" => TraceAction::Move(point()?),
        "up" => TraceAction::Up,
        "tick" => TraceAction::Tick,
        "skip" => TraceAction::Skip,
        other => bail!("unknown action '{other}'"),
    };
    Ok(Some(TraceLine { ms, action }))
}

fn parse_expected_kinds(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut kinds = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}:{}", path.display(), line_no + 1))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        kinds.push(token.to_ascii_lowercase());
    }

    Ok(kinds)
}
