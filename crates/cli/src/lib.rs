use anyhow::{Context, Result};
use areaclone_core::{
    assemble_lines, classify, clip::join_fragments, lines::dominant_fragment, normalize_runs,
    AreaCloner, Line, PageSnapshot, ReconstructConfig, Viewport,
};
use clap::{Parser, Subcommand};
use doc_model::{export_edits, Rect, SessionAction};
use pdf_engine::{
    default_engine, CaptureEngine, DocumentHandle, OpenSource, PdfEngine, RenderRequest,
};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use storage::Storage;

/// Overrides the per-user data directory holding `session.json` and `config.json`
pub const DATA_DIR_ENV: &str = "AREACLONE_DATA_DIR";

#[derive(Debug, Parser)]
#[command(name = "areaclone-cli")]
#[command(about = "Clone page areas into editable text items")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clone the text inside a rectangle into the session.
    Clone {
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Selection as x,y,w,h (points unless --px).
        #[arg(long, value_parser = parse_rect)]
        rect: Rect,
        /// Interpret --rect in rendered pixels.
        #[arg(long)]
        px: bool,
        /// Render scale in pixels per point.
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        #[arg(long)]
        session: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Pick font, size and color from the text nearest a point.
    Eyedrop {
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Point as x,y in page points.
        #[arg(long, value_parser = parse_point)]
        at: (f32, f32),
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Store the picked style as the session's style for new text.
        #[arg(long)]
        session: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the text lines assembled for a page.
    Lines {
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the session's items as export records.
    Export {
        #[arg(long)]
        session: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

/// How a successful invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    /// The command ran but found nothing to act on
    NothingFound,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Done => 0,
            Status::NothingFound => 2,
        }
    }
}

#[derive(Debug, Serialize)]
struct PickOutput {
    font: String,
    size: f32,
    color: String,
    source: String,
}

pub fn run<I, T>(args: I) -> Result<Status>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Clone { capture, page, rect, px, scale, session, config } => {
            run_clone(&capture, page, rect, px, scale, session, config.as_deref())
        }
        Commands::Eyedrop { capture, page, at, scale, session, config } => {
            run_eyedrop(&capture, page, at, scale, session, config.as_deref())
        }
        Commands::Lines { capture, page, config } => run_lines(&capture, page, config.as_deref()),
        Commands::Export { session } => run_export(session),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(Status::Done)
        }
    }
}

fn run_clone(
    capture: &Path,
    page: u32,
    rect: Rect,
    px: bool,
    scale: f32,
    session_path: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<Status> {
    ensure_scale(scale)?;
    let store = storage()?;
    let config = load_config(&store, config_path)?;
    let session_path = session_path.unwrap_or_else(|| store.session_path());
    let mut session = storage::read_session(&session_path)
        .with_context(|| format!("failed to read session {}", session_path.display()))?;

    let (mut engine, handle, page_index) = open_capture(capture, page)?;
    let selection_px =
        if px { rect } else { Viewport::from_render_scale(scale).rect_to_pixels(rect) };

    let outcome = AreaCloner::new(config)
        .clone_from_engine(&engine, handle, &mut session, page_index, scale, selection_px)
        .context("area clone failed")?;
    engine.close(handle)?;

    println!("{outcome}");
    if !outcome.is_cloned() {
        return Ok(Status::NothingFound);
    }

    session.apply(SessionAction::SetCurrentPage { page });
    storage::write_session(&session_path, &session)
        .with_context(|| format!("failed to write session {}", session_path.display()))?;

    Ok(Status::Done)
}

fn run_eyedrop(
    capture: &Path,
    page: u32,
    (x, y): (f32, f32),
    scale: f32,
    session_path: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<Status> {
    ensure_scale(scale)?;
    let store = storage()?;
    let cloner = AreaCloner::new(load_config(&store, config_path)?);

    let (mut engine, handle, page_index) = open_capture(capture, page)?;
    let size = engine.page_size(handle, page_index)?;
    let runs = engine.text_runs(handle, page_index)?;
    let raster = engine
        .render_page(handle, RenderRequest { page_index, scale })
        .context("failed to render page")?;
    engine.close(handle)?;

    let snapshot = PageSnapshot {
        page,
        height_pt: size.height_pt,
        runs: &runs,
        pixels: &raster,
        viewport: Viewport::from_render_scale(scale),
    };

    let pick = match session_path {
        Some(path) => {
            let mut session = storage::read_session(&path)
                .with_context(|| format!("failed to read session {}", path.display()))?;
            let pick = cloner.eyedrop(&mut session, &snapshot, x, y);
            storage::write_session(&path, &session)
                .with_context(|| format!("failed to write session {}", path.display()))?;
            pick
        }
        None => cloner.pick_style(&snapshot, x, y),
    };

    let Some(pick) = pick else {
        println!("No text on page {page}.");
        return Ok(Status::NothingFound);
    };

    let payload = PickOutput {
        font: pick.style.face.clone(),
        size: pick.size,
        color: pick.color.to_hex(),
        source: pick.source_text.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(Status::Done)
}

fn run_lines(capture: &Path, page: u32, config_path: Option<&Path>) -> Result<Status> {
    let store = storage()?;
    let config = load_config(&store, config_path)?;

    let (mut engine, handle, page_index) = open_capture(capture, page)?;
    let size = engine.page_size(handle, page_index)?;
    let runs = engine.text_runs(handle, page_index)?;
    engine.close(handle)?;

    let fragments = normalize_runs(&runs, size.height_pt, &config);
    let lines = assemble_lines(&fragments, &config);
    if lines.is_empty() {
        println!("No text on page {page}.");
        return Ok(Status::NothingFound);
    }

    for line in &lines {
        let face = line_face(line, &config);
        println!(
            "y={:.1} size={:.1} font={} face={} text={:?}",
            line.bbox.y,
            line.size,
            line.dominant_font_name,
            face,
            join_fragments(&line.fragments, &config),
        );
    }

    Ok(Status::Done)
}

/// Face a clone of `line` would be drawn with
fn line_face(line: &Line, config: &ReconstructConfig) -> String {
    let (bold, italic) =
        dominant_fragment(&line.fragments).map_or((false, false), |f| (f.bold, f.italic));
    classify(&line.dominant_font_name, bold, italic, &config.synthesis).face
}

fn run_export(session_path: Option<PathBuf>) -> Result<Status> {
    let session_path = match session_path {
        Some(path) => path,
        None => storage()?.session_path(),
    };
    let session = storage::read_session(&session_path)
        .with_context(|| format!("failed to read session {}", session_path.display()))?;

    let edits = export_edits(&session);
    println!("{}", serde_json::to_string_pretty(&edits)?);

    Ok(Status::Done)
}

fn storage() -> Result<Storage> {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(root) => Ok(Storage::with_root(PathBuf::from(root))),
        None => Storage::from_default_project().context("failed to locate data directory"),
    }
}

fn load_config(store: &Storage, explicit: Option<&Path>) -> Result<ReconstructConfig> {
    match explicit {
        Some(path) => storage::read_config(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => store.load_config().context("failed to read config"),
    }
}

fn open_capture(capture: &Path, page: u32) -> Result<(CaptureEngine, DocumentHandle, u32)> {
    ensure_file_exists(capture)?;

    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let mut engine = default_engine();
    let handle = engine.open(OpenSource::from(capture)).context("failed to open capture")?;

    let page_count = engine.page_count(handle)?;
    if page > page_count {
        anyhow::bail!("page {page} out of range (capture has {page_count} pages)");
    }

    Ok((engine, handle, page - 1))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn ensure_scale(scale: f32) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0) {
        anyhow::bail!("--scale must be a positive number");
    }
    Ok(())
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma-separated numbers, got {value:?}"));
    }

    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|_| format!("invalid number {part:?}"))?;
    }
    Ok(numbers)
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(value)?;
    Ok(Rect::from_edges(x, y, x + w, y + h))
}

fn parse_point(value: &str) -> Result<(f32, f32), String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok((x, y))
}
