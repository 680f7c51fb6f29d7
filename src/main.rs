use box_reconciler::annotations::class_catalog::ClassCatalog;
use box_reconciler::batch::orchestrator;
use box_reconciler::batch::outcome::BatchReport;
use box_reconciler::postprocessing::suppression::SuppressionConfig;
use box_reconciler::rendering::font::load_label_font;
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "box-reconciler",
    about = "Merge, filter, and visualize YOLO-style bounding-box annotations."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge two annotation directories into one, pairing files by base name.
    Merge {
        primary_dir: PathBuf,
        secondary_dir: PathBuf,
        out_dir: PathBuf,
        /// Replace the confidence of every record coming from the secondary
        /// directory with this value.
        #[arg(long)]
        override_confidence: Option<f32>,
    },
    /// Filter a directory of annotation files with a score threshold and
    /// greedy non-maximum suppression.
    Suppress {
        src_dir: PathBuf,
        out_dir: PathBuf,
        #[arg(long, default_value_t = 0.05)]
        score_threshold: f32,
        #[arg(long, default_value_t = 0.5)]
        iou_threshold: f32,
        /// Only let boxes of the same class suppress each other.
        #[arg(long)]
        class_aware: bool,
    },
    /// Draw each annotation file's boxes onto its matching image.
    Render {
        bbox_dir: PathBuf,
        image_dir: PathBuf,
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value = "bunch-condition")]
        catalog: CatalogChoice,
        /// Load the class catalog from a json file instead of a built-in one.
        #[arg(long, conflicts_with = "catalog")]
        catalog_file: Option<PathBuf>,
        /// TTF/OTF font used for box labels; common system fonts are tried
        /// when omitted.
        #[arg(long)]
        font: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogChoice {
    HarvestStage,
    BunchCondition,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let (report, operation): (BatchReport, &str) = match cli.command {
        Command::Merge { primary_dir, secondary_dir, out_dir, override_confidence } => (
            orchestrator::merge_directories(
                &primary_dir,
                &secondary_dir,
                &out_dir,
                override_confidence,
            )?,
            "merge",
        ),
        Command::Suppress { src_dir, out_dir, score_threshold, iou_threshold, class_aware } => {
            let config = SuppressionConfig { score_threshold, iou_threshold, class_aware };
            (orchestrator::suppress_directory(&src_dir, &out_dir, &config)?, "suppress")
        }
        Command::Render { bbox_dir, image_dir, out_dir, catalog, catalog_file, font } => {
            let catalog = match catalog_file {
                Some(path) => ClassCatalog::from_json_file(&path)?,
                None => match catalog {
                    CatalogChoice::HarvestStage => ClassCatalog::harvest_stage(),
                    CatalogChoice::BunchCondition => ClassCatalog::bunch_condition(),
                },
            };
            let font = load_label_font(font.as_deref())?;
            (
                orchestrator::render_directory(&bbox_dir, &image_dir, &out_dir, &catalog, &font)?,
                "render",
            )
        }
    };

    report.log_summary(operation);
    let failed = report.failures().count();
    if failed > 0 {
        return Err(format!("{} file(s) failed; see the log for details", failed).into());
    }
    Ok(())
}
