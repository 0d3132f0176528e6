use jigsaw_core::{
    CompletionEvent, InputEvent, InteractionController, InteractionOutcome, PointerId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

const BOT_POINTER: PointerId = PointerId(0);
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(clap::Subcommand)]
pub(super) enum BotCommand {
    /// Drag every piece to its cell through the pointer controller.
    Solve {
        save: PathBuf,
        #[command(flatten)]
        image: ImageOverride,
        #[command(flatten)]
        canvas: CanvasArgs,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 6.0)]
        jitter: f32,
        #[arg(long, default_value_t = 8)]
        drag_steps: u32,
        /// Give up after this many drags; defaults to four per piece.
        #[arg(long)]
        max_moves: Option<usize>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub(super) fn run(command: BotCommand, rules: Rules) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        BotCommand::Solve {
            save,
            image,
            canvas,
            seed,
            jitter,
            drag_steps,
            max_moves,
            out,
        } => {
            let mut session = load_session(&save, image, canvas, rules)?;
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            log::info!("bot seed: {seed}");
            let mut rng = StdRng::seed_from_u64(seed);
            let config = SolveConfig {
                jitter,
                drag_steps,
                max_moves: max_moves.unwrap_or(session.pieces().len() * 4),
            };
            let mut controller = InteractionController::new();
            let report = solve(&mut session, &mut controller, config, &mut rng);
            println!("moves: {}, merges: {}", report.moves, report.merges);
            match report.completion {
                Some(event) => println!(
                    "completed {} pieces in {}",
                    event.difficulty,
                    format_elapsed(event.elapsed_seconds)
                ),
                None if session.is_complete() => println!("already complete"),
                None => println!(
                    "unfinished: {}/{} locked",
                    session.locked_count(),
                    session.pieces().len()
                ),
            }
            if let Some(out) = out {
                store::write_save(&out, &session.to_saved())?;
                println!("saved: {}", out.display());
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SolveConfig {
    /// Largest per-axis miss, in world units, when dropping a piece on its cell.
    pub(crate) jitter: f32,
    /// Pointer moves per drag; each one also advances a frame.
    pub(crate) drag_steps: u32,
    pub(crate) max_moves: usize,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SolveReport {
    pub(crate) moves: usize,
    pub(crate) merges: usize,
    pub(crate) completion: Option<CompletionEvent>,
}

/// Plays the puzzle through the pointer controller, carrying one group at a time
/// onto the board until every piece is locked.
pub(crate) fn solve(
    session: &mut PuzzleSession,
    controller: &mut InteractionController,
    config: SolveConfig,
    rng: &mut StdRng,
) -> SolveReport {
    let mut report = SolveReport::default();
    let jitter = config.jitter.abs().min(session.rules().snap_distance / 2.0);
    while !session.is_complete() && report.moves < config.max_moves {
        let loose: Vec<usize> = session
            .pieces()
            .iter()
            .filter(|piece| !piece.locked)
            .map(|piece| piece.id)
            .collect();
        if loose.is_empty() {
            break;
        }
        let chosen = loose[rng.random_range(0..loose.len())];
        report.moves += 1;

        let (cell_w, cell_h) = session.layout().scaled_cell();
        let grab_world = {
            let piece = &session.pieces()[chosen];
            (piece.x + cell_w / 2.0, piece.y + cell_h / 2.0)
        };
        let grab = session.viewport().world_to_screen(grab_world);
        let down = InputEvent::down(BOT_POINTER, grab.0, grab.1);
        let picked = match controller.handle(session, down) {
            InteractionOutcome::DragStarted { piece, .. } => piece,
            other => {
                log::debug!("bot missed piece {chosen}: {other:?}");
                continue;
            }
        };

        // Whatever ended up in hand goes to its own cell.
        let (from, target) = {
            let piece = &session.pieces()[picked];
            let target = session.layout().board_target(piece.row, piece.col);
            ((piece.x, piece.y), target)
        };
        let miss = if jitter > 0.0 {
            (
                rng.random_range(-jitter..=jitter),
                rng.random_range(-jitter..=jitter),
            )
        } else {
            (0.0, 0.0)
        };
        let drop_world = (
            grab_world.0 + target.0 - from.0 + miss.0,
            grab_world.1 + target.1 - from.1 + miss.1,
        );
        let steps = config.drag_steps.max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let world = (
                grab_world.0 + (drop_world.0 - grab_world.0) * t,
                grab_world.1 + (drop_world.1 - grab_world.1) * t,
            );
            let screen = session.viewport().world_to_screen(world);
            controller.handle(session, InputEvent::moved(BOT_POINTER, screen.0, screen.1));
            controller.frame(session, FRAME_DT);
        }
        let drop = session.viewport().world_to_screen(drop_world);
        if let InteractionOutcome::Released { snap, completion } =
            controller.handle(session, InputEvent::up(BOT_POINTER, drop.0, drop.1))
        {
            if snap.merged_with.is_some() {
                report.merges += 1;
            }
            if completion.is_some() {
                report.completion = completion;
            }
        }
        controller.frame(session, FRAME_DT);
    }
    if !session.is_complete() {
        log::warn!(
            "bot stopped after {} moves with {} of {} pieces locked",
            report.moves,
            session.locked_count(),
            session.pieces().len()
        );
    }
    report
}
