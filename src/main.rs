//! Endless Chase headless runner
//!
//! Plays one scripted session against the simulation core:
//! `endless-chase [config.json] [prefs.json]`

use std::process::ExitCode;

use glam::Vec3;

use endless_chase::persistence::JsonFileStore;
use endless_chase::shop::{ShopAction, ShopEvent};
use endless_chase::sim::{
    Contact, ControlInput, FlatGround, GameEvent, GroundProjector, Obstacle, ProgressionController,
    RecordingSink, SpawnRegistry, TickContext,
};
use endless_chase::{AudioSettings, GameConfig, UnlockCatalog};

/// Host frame rate
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames of free driving before the scripted crash
const DRIVE_FRAMES: u32 = 60 * 20;
/// Anchor speed along +Z, units per second
const DRIVE_SPEED: f32 = 12.0;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Endless Chase (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let prefs_path = args
        .next()
        .unwrap_or_else(|| "endless_chase_prefs.json".to_string());
    let mut store = JsonFileStore::open(&prefs_path)?;

    let audio = AudioSettings::load(&store);
    log::info!(
        "Audio: music {:.1}, sound {:.1}",
        audio.music_volume,
        audio.sound_volume
    );

    // Shop: show the persisted vehicle and start with it, buying it if we can
    let mut shop = UnlockCatalog::load(&config.shop, &store)?;
    let vehicle = if shop.is_empty() {
        None
    } else {
        let view = shop.open(&mut store)?;
        log::info!("Shop showing {} ({:?}), balance {}", view.id, view.offer, view.balance);
        match shop.confirm(&mut store) {
            Ok(ShopAction::Start(vehicle)) => Some(vehicle),
            Ok(ShopAction::Purchased(_)) => {
                for ShopEvent::Unlocked { id, price, balance } in shop.drain_events() {
                    log::info!("Bought {} for {}, {} left", id, price, balance);
                }
                shop.select().ok()
            }
            Err(e) => {
                log::warn!("{}; starting without a vehicle", e);
                None
            }
        }
    };

    let mut registry = SpawnRegistry::configure(&config.spawn_groups, config.seed)?;
    let projector = GroundProjector::new(FlatGround::default(), config.ground);
    let mut sink = RecordingSink::default();
    let mut controller = ProgressionController::new(config.controller.clone(), &store)?;
    controller.start(&mut registry, vehicle)?;

    let mut anchor = Vec3::ZERO;
    let mut frame = 0u32;
    loop {
        // Once the drive is over, keep ramming until the vehicle is gone
        if frame >= DRIVE_FRAMES && !controller.state().is_game_over() {
            controller.on_contact(&Contact::Obstacle(Obstacle {
                damage: 1.0,
                hit_effect: true,
                remove_on_hit: true,
            }));
            if controller.state().vehicle.is_none() {
                controller.game_over(controller.config().death_delay)?;
            }
        }

        let mut ctx = TickContext {
            registry: &mut registry,
            projector: &projector,
            sink: &mut sink,
            store: &mut store,
            anchor,
        };
        let report = controller.tick(FRAME_DT, &ControlInput::default(), &mut ctx);
        anchor.z += DRIVE_SPEED * controller.clock().delta_time();
        frame += 1;

        for event in controller.drain_events() {
            if let GameEvent::GameOverFinalized {
                score,
                high_score,
                new_high_score,
                money,
            } = event
            {
                log::info!(
                    "Run over: score {}, high score {}{}, money {}",
                    score,
                    high_score,
                    if new_high_score { " (new!)" } else { "" },
                    money
                );
            }
        }
        if report.finalized {
            break;
        }
    }

    log::info!(
        "Spawned {} entities over {} frames",
        sink.spawned.len(),
        frame
    );
    store.flush()?;
    log::info!("Preferences saved to {}", store.path().display());
    Ok(())
}
