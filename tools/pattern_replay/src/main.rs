use std::{
    convert::Infallible,
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use embedded_graphics::{
    pixelcolor::{Rgb888, RgbColor},
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    Pixel,
};
use patternlock::{PatternLockEngine, PatternOutput, PatternViewState};

const DEFAULT_SIZE: Size = Size::new(300, 300);
const TRACE_HEADER: &str = "pointer,ms,kind,x,y";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReplayKind {
    Down(Point),
    Move(Point),
    Up,
    Tick,
    Reset,
    Advance,
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReplayStep {
    ms: u64,
    kind: ReplayKind,
}

struct Options {
    trace_path: PathBuf,
    expect_path: Option<PathBuf>,
    png_path: Option<PathBuf>,
    size: Size,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        println!("{}", usage());
        return Ok(());
    };

    let steps = parse_trace(&options.trace_path)?;
    let mut engine = PatternLockEngine::with_defaults();
    engine.layout(options.size);
    let emitted = replay(&mut engine, &steps);

    println!("state,ms,label");
    for (ms, state) in &emitted {
        println!("state,{ms},{}", state.label());
    }

    if let Some(png_path) = &options.png_path {
        let last_ms = steps.last().map(|s| s.ms).unwrap_or(0);
        write_png(&mut engine, options.size, last_ms, png_path)?;
    }

    if let Some(expect_path) = &options.expect_path {
        let expected = parse_expected_labels(expect_path)?;
        let actual: Vec<&'static str> = emitted.iter().map(|(_, s)| s.label()).collect();
        if actual != expected {
            eprintln!("expected states: {}", expected.join(","));
            eprintln!("actual states:   {}", actual.join(","));
            return Err("state sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: pattern_replay <trace.csv> [--expect expected_states.txt] [--png out.png] [--size WxH]"
        .to_string()
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;
    let mut png_path: Option<PathBuf> = None;
    let mut size = DEFAULT_SIZE;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" | "--png" | "--size" => {
                let flag = args[idx].as_str();
                idx += 1;
                let Some(value) = args.get(idx) else {
                    return Err(format!("missing value after {flag}"));
                };
                match flag {
                    "--expect" => expect_path = Some(PathBuf::from(value)),
                    "--png" => png_path = Some(PathBuf::from(value)),
                    _ => size = parse_size(value)?,
                }
            }
            "-h" | "--help" => return Ok(None),
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    Ok(Some(Options {
        trace_path,
        expect_path,
        png_path,
        size,
    }))
}

fn parse_size(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{raw}', expected WxH"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width '{w}': {e}"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height '{h}': {e}"))?;
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got {raw}"));
    }
    Ok(Size::new(width, height))
}

/// Feeds every step through the engine and collects emitted states. A
/// pending auto-reset is flushed after the last step.
fn replay(engine: &mut PatternLockEngine, steps: &[ReplayStep]) -> Vec<(u64, PatternViewState)> {
    let mut emitted: Vec<(u64, PatternViewState)> = Vec::new();
    for step in steps {
        let output = apply_step(engine, *step);
        emitted.extend(output.states.iter().map(|state| (step.ms, *state)));
    }

    if let Some(deadline) = engine.reset_deadline_ms() {
        let mut sink = |state: PatternViewState| emitted.push((deadline, state));
        engine.dispatch_to(&mut sink, |e| e.tick(deadline));
    }
    emitted
}

fn apply_step(engine: &mut PatternLockEngine, step: ReplayStep) -> PatternOutput {
    match step.kind {
        ReplayKind::Down(point) => engine.pointer_down(step.ms, point),
        ReplayKind::Move(point) => engine.pointer_move(step.ms, point),
        ReplayKind::Up => engine.pointer_up(step.ms),
        ReplayKind::Tick => engine.tick(step.ms),
        ReplayKind::Reset => engine.reset(),
        ReplayKind::Advance => engine.advance_stage().unwrap_or_else(|err| {
            log::warn!("replay: advance at {}ms rejected: {err}", step.ms);
            PatternOutput::default()
        }),
        ReplayKind::Restart => engine.restart(),
    }
}

fn parse_trace(path: &Path) -> Result<Vec<ReplayStep>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        if let Some(step) = parse_trace_line(&line)
            .map_err(|e| format!("{}:{} {e}", path.display(), line_no))?
        {
            out.push(step);
        }
    }
    Ok(out)
}

fn parse_trace_line(line: &str) -> Result<Option<ReplayStep>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == TRACE_HEADER {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return Err("invalid trace line, expected at least 3 columns".into());
    }
    if parts[0] != "pointer" {
        return Ok(None);
    }

    let ms = parts[1]
        .parse::<u64>()
        .map_err(|e| format!("invalid ms '{}': {e}", parts[1]))?;
    let point = || -> Result<Point, String> {
        if parts.len() < 5 {
            return Err(format!("{} needs x,y columns", parts[2]));
        }
        let x = parts[3]
            .parse::<i32>()
            .map_err(|e| format!("invalid x '{}': {e}", parts[3]))?;
        let y = parts[4]
            .parse::<i32>()
            .map_err(|e| format!("invalid y '{}': {e}", parts[4]))?;
        Ok(Point::new(x, y))
    };

    let kind = match parts[2].to_ascii_lowercase().as_str() {
        "down" => ReplayKind::Down(point()?),
        "move" => ReplayKind::Move(point()?),
        "up" => ReplayKind::Up,
        "tick" => ReplayKind::Tick,
        "reset" => ReplayKind::Reset,
        "advance" => ReplayKind::Advance,
        "restart" => ReplayKind::Restart,
        other => return Err(format!("unknown kind '{other}'")),
    };
    Ok(Some(ReplayStep { ms, kind }))
}

fn parse_expected_labels(path: &Path) -> Result<Vec<&'static str>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut labels = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let label = normalize_label(token).ok_or_else(|| {
            format!(
                "{}:{} invalid expected state: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        labels.push(label);
    }
    Ok(labels)
}

fn normalize_label(label: &str) -> Option<&'static str> {
    match label.trim().to_ascii_lowercase().as_str() {
        "initial" => Some("initial"),
        "started" => Some("started"),
        "success" => Some("success"),
        "error" => Some("error"),
        _ => None,
    }
}

struct RgbFrame {
    size: Size,
    bytes: Vec<u8>,
}

impl RgbFrame {
    fn new(size: Size) -> Self {
        Self {
            size,
            bytes: vec![0; (size.width * size.height * 3) as usize],
        }
    }
}

impl OriginDimensions for RgbFrame {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for RgbFrame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= self.size.width || y >= self.size.height {
                continue;
            }
            let offset = ((y * self.size.width + x) * 3) as usize;
            self.bytes[offset] = color.r();
            self.bytes[offset + 1] = color.g();
            self.bytes[offset + 2] = color.b();
        }
        Ok(())
    }
}

fn write_png(
    engine: &mut PatternLockEngine,
    size: Size,
    now_ms: u64,
    path: &Path,
) -> Result<(), String> {
    let mut frame = RgbFrame::new(size);
    let Ok(_) = engine.draw(&mut frame, now_ms);
    image::save_buffer(
        path,
        &frame.bytes,
        size.width,
        size.height,
        image::ColorType::Rgb8,
    )
    .map_err(|e| format!("save {}: {e}", path.display()))?;
    log::info!("replay: wrote {}", path.display());
    Ok(())
}
