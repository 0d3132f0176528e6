use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use jigsaw_core::grid::build_grid_choices;
use jigsaw_core::{
    grid_choice_label, render, PuzzleImage, PuzzleSession, Rules, DEFAULT_TARGET_COUNT,
};

mod bot;
mod store;
mod svg;

#[derive(Parser)]
#[command(name = "jigsaw-cli", version, about = "Generate, play and render jigsaw puzzles")]
struct Cli {
    /// TOML file overriding play rules; missing keys keep their defaults.
    #[arg(long, global = true, env = "JIGSAW_RULES")]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut a new puzzle and write its save file.
    New {
        #[command(flatten)]
        image: ImageArgs,
        #[arg(long, default_value_t = DEFAULT_TARGET_COUNT)]
        pieces: u32,
        #[command(flatten)]
        canvas: CanvasArgs,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
    /// List the difficulty menu for an image size.
    Levels {
        #[arg(long)]
        image_width: u32,
        #[arg(long)]
        image_height: u32,
    },
    /// Summarize a save file.
    Info { save: PathBuf },
    /// Restore a save, optionally against a different image, and write it back out.
    Restore {
        save: PathBuf,
        #[command(flatten)]
        image: ImageOverride,
        #[command(flatten)]
        canvas: CanvasArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Scatter pieces again; with --unlocked, only loose groups move.
    Reset {
        save: PathBuf,
        #[arg(long)]
        unlocked: bool,
        #[command(flatten)]
        image: ImageOverride,
        #[command(flatten)]
        canvas: CanvasArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Draw a save as SVG.
    Render {
        save: PathBuf,
        #[command(flatten)]
        image: ImageOverride,
        #[command(flatten)]
        canvas: CanvasArgs,
        /// Show the faded picture on the board.
        #[arg(long)]
        guide: bool,
        #[arg(long, default_value_t = 1.0)]
        zoom: f32,
        #[arg(long, default_value_t = 0.0)]
        pan_x: f32,
        #[arg(long, default_value_t = 0.0)]
        pan_y: f32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Automated players.
    Bot {
        #[command(subcommand)]
        command: bot::BotCommand,
    },
}

#[derive(Args)]
struct ImageArgs {
    #[arg(long)]
    image_width: u32,
    #[arg(long)]
    image_height: u32,
    /// Reference written into the save and used as the SVG image link.
    #[arg(long)]
    image_src: Option<String>,
}

/// Image to restore against; each missing value falls back to the save.
#[derive(Args)]
struct ImageOverride {
    #[arg(long)]
    image_width: Option<u32>,
    #[arg(long)]
    image_height: Option<u32>,
    #[arg(long)]
    image_src: Option<String>,
}

#[derive(Args, Clone, Copy)]
struct CanvasArgs {
    #[arg(long, env = "JIGSAW_CANVAS_WIDTH", default_value_t = 1280.0)]
    canvas_width: f32,
    #[arg(long, env = "JIGSAW_CANVAS_HEIGHT", default_value_t = 800.0)]
    canvas_height: f32,
}

impl CanvasArgs {
    fn size(self) -> (f32, f32) {
        (self.canvas_width, self.canvas_height)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let rules = store::load_rules(cli.rules.as_deref())?;

    match cli.command {
        Commands::New {
            image,
            pieces,
            canvas,
            seed,
            out,
        } => {
            let mut puzzle_image = PuzzleImage::new(image.image_width, image.image_height);
            puzzle_image.source = image.image_src;
            let session = match seed.as_deref() {
                Some(raw) => PuzzleSession::with_seed(
                    puzzle_image,
                    pieces,
                    canvas.size(),
                    rules,
                    parse_seed_arg(raw)?,
                )?,
                None => PuzzleSession::new(puzzle_image, pieces, canvas.size(), rules)?,
            };
            store::write_save(&out, &session.to_saved())?;
            println!("grid: {}", grid_choice_label(&session.grid()));
            print_layout(&session);
            println!("saved: {}", out.display());
        }
        Commands::Levels {
            image_width,
            image_height,
        } => {
            for choice in build_grid_choices(image_width, image_height, &rules) {
                println!("{}", grid_choice_label(&choice));
            }
        }
        Commands::Info { save } => {
            let saved = store::read_save(&save)?;
            let locked = saved.pieces.iter().filter(|piece| piece.locked).count();
            println!("version: {}", saved.version);
            println!(
                "grid: {}x{} ({} pieces, asked for {})",
                saved.cols,
                saved.rows,
                saved.pieces.len(),
                saved.target_piece_count
            );
            println!("image: {}x{}", saved.original_width, saved.original_height);
            if let Some(src) = &saved.image_src {
                println!("image_src: {src}");
            }
            println!("groups: {}", saved.groups.len());
            println!("locked: {locked}/{}", saved.pieces.len());
            println!("elapsed: {}", format_elapsed(saved.elapsed_time));
        }
        Commands::Restore {
            save,
            image,
            canvas,
            out,
        } => {
            let session = load_session(&save, image, canvas, rules)?;
            print_layout(&session);
            println!("complete: {}", session.is_complete());
            if let Some(out) = out {
                store::write_save(&out, &session.to_saved())?;
                println!("saved: {}", out.display());
            }
        }
        Commands::Reset {
            save,
            unlocked,
            image,
            canvas,
            out,
        } => {
            let mut session = load_session(&save, image, canvas, rules)?;
            let moved = if unlocked {
                session.reset_unlocked()
            } else {
                session.reset_all()
            };
            println!("moved: {moved} groups");
            let out = out.unwrap_or(save);
            store::write_save(&out, &session.to_saved())?;
            println!("saved: {}", out.display());
        }
        Commands::Render {
            save,
            image,
            canvas,
            guide,
            zoom,
            pan_x,
            pan_y,
            out,
        } => {
            let mut session = load_session(&save, image, canvas, rules)?;
            if guide {
                session.toggle_guide();
            }
            let viewport = session.viewport_mut();
            viewport.zoom_at(zoom, (0.0, 0.0));
            viewport.set_offset((pan_x, pan_y));
            let (canvas_w, canvas_h) = session.canvas_size();
            let mut surface = svg::SvgSurface::new(
                canvas_w,
                canvas_h,
                session.image().source.clone(),
                session.image().size(),
            );
            render(&session, None, &mut surface);
            std::fs::write(&out, surface.finish())?;
            println!("rendered: {}", out.display());
        }
        Commands::Bot { command } => bot::run(command, rules)?,
    }

    Ok(())
}

fn load_session(
    path: &Path,
    image: ImageOverride,
    canvas: CanvasArgs,
    rules: Rules,
) -> Result<PuzzleSession, Box<dyn std::error::Error>> {
    let saved = store::read_save(path)?;
    let mut puzzle_image = PuzzleImage::new(
        image.image_width.unwrap_or(saved.original_width),
        image.image_height.unwrap_or(saved.original_height),
    );
    puzzle_image.source = image.image_src;
    Ok(PuzzleSession::restore(&saved, puzzle_image, canvas.size(), rules)?)
}

fn print_layout(session: &PuzzleSession) {
    let board = session.board();
    let layout = session.layout();
    println!(
        "board: {}x{} at ({}, {})",
        board.w, board.h, board.x, board.y
    );
    println!(
        "piece: {}x{} image px, scale {:.4}",
        layout.piece_width, layout.piece_height, layout.scale
    );
    println!(
        "groups: {}, locked: {}/{}",
        session.groups().group_count(),
        session.locked_count(),
        session.pieces().len()
    );
}

fn format_elapsed(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn parse_seed_arg(raw: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u64>()?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn seeds_parse_as_hex_or_decimal() {
        assert_eq!(parse_seed_arg("0x1F").expect("hex"), 31);
        assert_eq!(parse_seed_arg(" 42 ").expect("dec"), 42);
        assert!(parse_seed_arg("0xZZ").is_err());
        assert!(parse_seed_arg("-1").is_err());
    }

    #[test]
    fn elapsed_reads_like_a_clock() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3_725), "1:02:05");
    }

    #[test]
    fn restore_falls_back_to_saved_image() {
        let saved = PuzzleSession::with_seed(
            PuzzleImage::new(500, 400).with_source("a.png"),
            12,
            (900.0, 700.0),
            Rules::default(),
            6,
        )
        .expect("session")
        .to_saved();
        let name = format!("jigsaw-cli-{}-main.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        store::write_save(&path, &saved).expect("write");
        let session = load_session(
            &path,
            ImageOverride {
                image_width: None,
                image_height: Some(200),
                image_src: None,
            },
            CanvasArgs {
                canvas_width: 900.0,
                canvas_height: 700.0,
            },
            Rules::default(),
        )
        .expect("restore");
        let _ = std::fs::remove_file(&path);
        assert_eq!(session.image().width, 500);
        assert_eq!(session.image().height, 200);
        assert_eq!(session.image().source.as_deref(), Some("a.png"));
    }
}
