use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_pagekit::{
    Action, BlankPageParams, CountingMode, CropParams, EditSession, GridParams, HorizontalAlign,
    InsertPosition, LogProgress, MacroLibrary, NumberFormat, NumberingParams, OffsetMode,
    OperationReport, PageDocument, PageSelection, PageSize, PaperSize, PdfDocument, RemovalParams,
    ResizeParams, RotateParams, SelectionSpec, ShiftParams, StopOutcome, VerticalPosition,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdft", about = "Page-level PDF editing with replayable macros", version)]
struct Cli {
    /// Macro library file
    #[arg(
        long,
        global = true,
        env = "PDFT_MACROS",
        default_value = pdf_pagekit::constants::DEFAULT_MACRO_FILE
    )]
    macros: PathBuf,

    /// Record this command into macro NAME (appended if NAME already exists)
    #[arg(long, global = true, value_name = "NAME")]
    record: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EditArgs {
    /// Input PDF file
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file
    #[arg(short, long)]
    output: PathBuf,

    /// Pages to edit: all, odd, even, portrait, landscape, or ranges like 1-3,5,8-
    #[arg(short, long, default_value = "all")]
    pages: String,
}

#[derive(Args)]
struct MarginArgs {
    /// Uniform margin in mm (overridden by the per-side options)
    #[arg(long, default_value = "0")]
    margin: f32,

    #[arg(long)]
    left: Option<f32>,

    #[arg(long)]
    right: Option<f32>,

    #[arg(long)]
    top: Option<f32>,

    #[arg(long)]
    bottom: Option<f32>,
}

impl MarginArgs {
    fn to_params(&self) -> CropParams {
        CropParams {
            left_mm: self.left.unwrap_or(self.margin),
            right_mm: self.right.unwrap_or(self.margin),
            top_mm: self.top.unwrap_or(self.margin),
            bottom_mm: self.bottom.unwrap_or(self.margin),
            reposition: None,
        }
    }
}

#[derive(Args)]
struct SizeArgs {
    /// Paper size
    #[arg(long, default_value = "a4", value_enum)]
    paper: PaperArg,

    /// Custom width in mm (use with --height-mm)
    #[arg(long, requires = "height_mm")]
    width_mm: Option<f32>,

    /// Custom height in mm (use with --width-mm)
    #[arg(long, requires = "width_mm")]
    height_mm: Option<f32>,

    #[arg(long, default_value = "portrait", value_enum)]
    orientation: OrientationArg,
}

impl SizeArgs {
    fn to_page_size(&self) -> PageSize {
        let paper = match (self.width_mm, self.height_mm) {
            (Some(width_mm), Some(height_mm)) => PaperSize::Custom {
                width_mm,
                height_mm,
            },
            _ => self.paper.into(),
        };
        PageSize::new(paper, self.orientation.into())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Soft crop: hide margins by setting the crop box
    Crop {
        #[command(flatten)]
        edit: EditArgs,

        #[command(flatten)]
        margins: MarginArgs,

        /// Shift content after cropping, in mm (x,y)
        #[arg(long, value_name = "DX,DY", value_parser = parse_pair)]
        offset: Option<(f32, f32)>,
    },

    /// Mask crop: cut the page down so the margins cannot be restored
    Mask {
        #[command(flatten)]
        edit: EditArgs,

        #[command(flatten)]
        margins: MarginArgs,
    },

    /// Change the page size
    Resize {
        #[command(flatten)]
        edit: EditArgs,

        #[command(flatten)]
        size: SizeArgs,

        /// Scale content to fit (aspect ratio kept, centered)
        #[arg(long)]
        scale: bool,

        /// Place unscaled content at this offset from the lower-left corner, in mm
        #[arg(long, value_name = "DX,DY", value_parser = parse_pair, conflicts_with = "scale")]
        offset: Option<(f32, f32)>,
    },

    /// Move page content
    Shift {
        #[command(flatten)]
        edit: EditArgs,

        /// Horizontal offset in mm
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dx: f32,

        /// Vertical offset in mm
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f32,
    },

    /// Rotate pages clockwise
    Rotate {
        #[command(flatten)]
        edit: EditArgs,

        /// Degrees, a multiple of 90 (negative turns counter-clockwise)
        #[arg(long, default_value = "90", allow_hyphen_values = true)]
        angle: i32,
    },

    /// Insert a blank page next to each selected page
    Blank {
        #[command(flatten)]
        edit: EditArgs,

        /// Insert before the page instead of after it
        #[arg(long)]
        before: bool,

        /// Use this size instead of copying the neighbouring page
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,
    },

    /// Merge pages onto N-up sheets
    Grid {
        #[command(flatten)]
        edit: EditArgs,

        #[arg(long, default_value = "2")]
        rows: usize,

        #[arg(long, default_value = "2")]
        cols: usize,

        #[command(flatten)]
        sheet: SizeArgs,

        /// Keep the source pages after the sheets
        #[arg(long)]
        keep_originals: bool,
    },

    /// Stamp page numbers
    Number {
        #[command(flatten)]
        edit: EditArgs,

        /// First number
        #[arg(long, default_value = "1")]
        start: usize,

        #[arg(long, default_value = "center", value_enum)]
        align: AlignArg,

        #[arg(long, default_value = "bottom", value_enum)]
        position: PositionArg,

        /// Alternate left/right alignment on every other page
        #[arg(long)]
        mirrored: bool,

        /// Swap left and right margins on every other page
        #[arg(long)]
        mirror_margins: bool,

        /// Left margin in mm
        #[arg(long, default_value = "10")]
        left: f32,

        /// Right margin in mm
        #[arg(long, default_value = "10")]
        right: f32,

        /// Distance from the top or bottom edge in mm
        #[arg(long, default_value = "10")]
        vertical: f32,

        #[arg(long, default_value = "10")]
        font_size: f32,

        #[arg(long, default_value = "number", value_enum)]
        format: FormatArg,
    },

    /// Erase header and footer bands
    Unnumber {
        #[command(flatten)]
        edit: EditArgs,

        /// Top band height in mm
        #[arg(long, default_value = "15")]
        top: f32,

        /// Bottom band height in mm
        #[arg(long, default_value = "15")]
        bottom: f32,

        #[arg(long, default_value = "0")]
        left: f32,

        #[arg(long, default_value = "0")]
        right: f32,
    },

    /// Delete pages
    Delete {
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Concatenate PDF files; unreadable inputs are skipped
    Merge {
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage and run macros
    Macro {
        #[command(subcommand)]
        command: MacroCommand,
    },
}

#[derive(Subcommand)]
enum MacroCommand {
    /// List stored macros
    List,

    /// Print a macro's actions as JSON
    Show { name: String },

    /// Replay a macro on a document
    Run {
        name: String,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove a macro
    Delete { name: String },

    /// Rename a macro
    Rename { from: String, to: String },

    /// Validate the macro file
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignArg {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum PositionArg {
    Top,
    Bottom,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// "N"
    Number,
    /// "Page N of M"
    PageOfTotal,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for pdf_pagekit::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<AlignArg> for HorizontalAlign {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Left => Self::Left,
            AlignArg::Center => Self::Center,
            AlignArg::Right => Self::Right,
        }
    }
}

impl From<PositionArg> for VerticalPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Top => Self::Top,
            PositionArg::Bottom => Self::Bottom,
        }
    }
}

impl From<FormatArg> for NumberFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Number => Self::Number,
            FormatArg::PageOfTotal => Self::PageOfTotal,
        }
    }
}

fn parse_pair(text: &str) -> std::result::Result<(f32, f32), String> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{}'", text))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|e| format!("'{}': {}", s.trim(), e))
    };
    Ok((parse(a)?, parse(b)?))
}

/// Turn a --pages value into a selection that can be recorded
fn selection_spec(text: &str, doc: &PdfDocument) -> Result<SelectionSpec> {
    let spec = match text.trim().to_ascii_lowercase().as_str() {
        "all" => SelectionSpec::All,
        "odd" => SelectionSpec::Odd,
        "even" => SelectionSpec::Even,
        "portrait" => SelectionSpec::Portrait,
        "landscape" => SelectionSpec::Landscape,
        ranges => {
            let selection = PageSelection::parse_ranges(ranges, doc.page_count())?;
            SelectionSpec::pages(&selection, doc)
        }
    };
    Ok(spec)
}

fn print_report(what: &str, report: &OperationReport) {
    println!("{}: {} page(s) changed", what, report.applied.len());
    if !report.created.is_empty() {
        let created: Vec<String> = report.created.iter().map(|i| (i + 1).to_string()).collect();
        println!("  New pages: {}", created.join(", "));
    }
    for skip in &report.skipped {
        println!("  Skipped page {}: {:?}", skip.index + 1, skip.reason);
    }
    if report.dropped > 0 {
        println!("  Ignored {} selected page(s) past the end", report.dropped);
    }
}

/// The selection and the action a page-editing subcommand stands for
fn edit_action(command: Commands) -> Result<(EditArgs, &'static str, Action)> {
    let planned = match command {
        Commands::Crop {
            edit,
            margins,
            offset,
        } => {
            let mut params = margins.to_params();
            params.reposition = offset.map(|(dx_mm, dy_mm)| OffsetMode::Custom { dx_mm, dy_mm });
            (edit, "Crop", Action::Crop(params))
        }
        Commands::Mask { edit, margins } => {
            (edit, "Mask crop", Action::MaskCrop(margins.to_params()))
        }
        Commands::Resize {
            edit,
            size,
            scale,
            offset,
        } => {
            let params = ResizeParams {
                target: size.to_page_size(),
                scale_content: scale,
                position: offset
                    .map(|(dx_mm, dy_mm)| OffsetMode::Custom { dx_mm, dy_mm })
                    .unwrap_or_default(),
            };
            (edit, "Resize", Action::Resize(params))
        }
        Commands::Shift { edit, dx, dy } => (
            edit,
            "Shift",
            Action::Shift(ShiftParams { dx_mm: dx, dy_mm: dy }),
        ),
        Commands::Rotate { edit, angle } => {
            let action = match angle {
                90 => Action::RotateRight,
                -90 => Action::RotateLeft,
                _ => Action::Rotate(RotateParams { angle }),
            };
            (edit, "Rotate", action)
        }
        Commands::Blank {
            edit,
            before,
            paper,
            orientation,
        } => {
            let params = BlankPageParams {
                size: paper.map(|p| PageSize::new(p.into(), orientation.into())),
                position: if before {
                    InsertPosition::Before
                } else {
                    InsertPosition::After
                },
            };
            (edit, "Insert blank", Action::InsertBlank(params))
        }
        Commands::Grid {
            edit,
            rows,
            cols,
            sheet,
            keep_originals,
        } => {
            let params = GridParams {
                rows,
                cols,
                sheet: sheet.to_page_size(),
                keep_originals,
            };
            (edit, "Grid", Action::GridMerge(params))
        }
        Commands::Number {
            edit,
            start,
            align,
            position,
            mirrored,
            mirror_margins,
            left,
            right,
            vertical,
            font_size,
            format,
        } => {
            let params = NumberingParams {
                start,
                mode: if mirrored {
                    CountingMode::Mirrored
                } else {
                    CountingMode::Normal
                },
                align: align.into(),
                vertical: position.into(),
                left_mm: left,
                right_mm: right,
                vertical_mm: vertical,
                mirror_margins,
                font_size,
                format: format.into(),
            };
            (edit, "Number", Action::InsertNumbers(params))
        }
        Commands::Unnumber {
            edit,
            top,
            bottom,
            left,
            right,
        } => {
            let params = RemovalParams {
                top_mm: top,
                bottom_mm: bottom,
                left_mm: left,
                right_mm: right,
            };
            (edit, "Remove numbers", Action::RemoveNumbers(params))
        }
        Commands::Delete { edit } => (edit, "Delete", Action::DeletePages),
        Commands::Merge { .. } | Commands::Macro { .. } => {
            bail!("not a page editing command")
        }
    };
    Ok(planned)
}

/// Store what this invocation recorded, appending to an existing macro of the same name
async fn finish_recording(
    session: &mut EditSession,
    library_before: &MacroLibrary,
    path: &PathBuf,
) -> Result<()> {
    let Some(name) = session.recorder().recording_name().map(str::to_owned) else {
        return Ok(());
    };
    let outcome = session.stop_recording()?;
    let StopOutcome::Saved(recorded) = outcome else {
        println!("Nothing recorded for macro '{}'", name);
        return Ok(());
    };

    if let Some(mut existing) = library_before.get(&name) {
        existing.actions.extend(recorded.actions);
        session.library_mut().edit(&name, existing.actions)?;
    }
    let total = session.library().get(&name).map(|m| m.len()).unwrap_or(0);
    pdf_pagekit::save_macros(session.library(), path).await?;
    println!("Macro '{}' now has {} action(s)", name, total);
    Ok(())
}

async fn run_macro_command(command: MacroCommand, macros: &PathBuf) -> Result<()> {
    match command {
        MacroCommand::List => {
            let library = pdf_pagekit::load_macros(macros).await?;
            if library.is_empty() {
                println!("No macros in {}", macros.display());
            }
            for name in library.names() {
                let len = library.get(name).map(|m| m.len()).unwrap_or(0);
                println!("{}  ({} action(s))", name, len);
            }
        }
        MacroCommand::Show { name } => {
            let library = pdf_pagekit::load_macros(macros).await?;
            let m = library
                .get(&name)
                .with_context(|| format!("no macro named '{}'", name))?;
            println!("{}", serde_json::to_string_pretty(&m.actions)?);
        }
        MacroCommand::Run {
            name,
            input,
            output,
        } => {
            let library = pdf_pagekit::load_macros(macros).await?;
            let mut doc = pdf_pagekit::load_pdf(&input).await?;
            let mut session = EditSession::new(library);
            let report = session.replay(&mut doc, &name, &mut LogProgress)?;
            pdf_pagekit::save_pdf(doc, &output).await?;
            print_report(&format!("Macro '{}'", name), &report);
            println!("Saved → {}", output.display());
        }
        MacroCommand::Delete { name } => {
            let mut library = pdf_pagekit::load_macros(macros).await?;
            library.remove(&name)?;
            pdf_pagekit::save_macros(&library, macros).await?;
            println!("Deleted macro '{}'", name);
        }
        MacroCommand::Rename { from, to } => {
            let mut library = pdf_pagekit::load_macros(macros).await?;
            library.rename(&from, &to)?;
            pdf_pagekit::save_macros(&library, macros).await?;
            println!("Renamed '{}' → '{}'", from, to);
        }
        MacroCommand::Check => {
            let library = MacroLibrary::load(macros)
                .await
                .with_context(|| format!("checking {}", macros.display()))?;
            println!("{}: {} macro(s) OK", macros.display(), library.len());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Macro { command } => {
            if cli.record.is_some() {
                bail!("--record cannot be used with macro commands");
            }
            run_macro_command(command, &cli.macros).await?;
        }

        Commands::Merge { input, output } => {
            if cli.record.is_some() {
                bail!("merging files cannot be recorded");
            }
            let (merged, report) = pdf_pagekit::merge_files(&input).await?;
            for (path, err) in &report.skipped {
                eprintln!("Skipped {}: {}", path.display(), err);
            }
            println!(
                "Merged {} file(s), {} page(s)",
                report.loaded.len(),
                merged.page_count()
            );
            pdf_pagekit::save_pdf(merged, &output).await?;
            println!("Saved → {}", output.display());
        }

        command => {
            let (edit, label, action) = edit_action(command)?;
            let library = pdf_pagekit::load_macros(&cli.macros).await?;
            let library_before = library.clone();
            let mut session = EditSession::new(library);
            if let Some(name) = &cli.record {
                session.start_recording(name.clone())?;
            }

            let mut doc = pdf_pagekit::load_pdf(&edit.input).await?;
            let spec = selection_spec(&edit.pages, &doc)?;
            log::debug!("{} on {:?}", label, spec);
            let selected = session.dispatch(&mut doc, Action::SelectPages(spec), &mut LogProgress)?;
            let mut report = session.dispatch(&mut doc, action, &mut LogProgress)?;
            report.dropped += selected.dropped;

            pdf_pagekit::save_pdf(doc, &edit.output).await?;
            print_report(label, &report);
            println!("Saved → {}", edit.output.display());

            finish_recording(&mut session, &library_before, &cli.macros).await?;
        }
    }

    Ok(())
}
