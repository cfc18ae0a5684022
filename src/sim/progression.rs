//! Session progression: start delay, scoring, pause, game over
//!
//! `NotStarted -> Running -> (Paused <-> Running) -> GameOver -> Finished`
//!
//! The controller drives each tick. While running it accrues per-second score and
//! ticks the spawn registry around the anchor. Game over freezes the simulation
//! and finalizes after a delay measured in real time, writing money and the
//! level's high score to the preference store.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::contact::{self, Contact, ContactOutcome, Vehicle};
use super::ground::{GroundProjector, GroundQuery};
use super::spawn::{SpawnRecord, SpawnRegistry, WorldSink};
use crate::clock::Clock;
use crate::consts::{DEFAULT_DEATH_DELAY, DEFAULT_SCORE_PER_SECOND, DEFAULT_START_DELAY};
use crate::error::{ConfigError, TransitionError};
use crate::highscores::HighScore;
use crate::persistence::{PrefKey, PrefsStore};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    /// Frozen, waiting for the finalize delay to pass
    GameOver,
    /// Results recorded; only restart/menu input is accepted
    Finished,
}

/// Notifications for UI, audio and scene collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { vehicle: Option<String> },
    ScoreChanged { score: i32 },
    HealthChanged { health: f32 },
    Paused { show_menu: bool },
    Resumed,
    GameOverBegan { score: i32 },
    GameOverFinalized {
        score: i32,
        high_score: i32,
        new_high_score: bool,
        money: i32,
    },
    HitEffect,
    PickupEffect,
    RestartRequested,
    MainMenuRequested,
}

/// Button presses for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlInput {
    /// Toggle pause while playing; back to menu after game over
    pub pause: bool,
    /// Restart after game over
    pub confirm: bool,
}

/// Controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Level name used for the high score key
    pub level_name: String,
    /// "Ready? GO!" delay before gameplay, seconds
    pub start_delay: f32,
    /// Points added once per simulated second (0 disables)
    pub score_per_second: i32,
    /// Real seconds between the vehicle being destroyed and the results
    pub death_delay: f32,
    /// Preference name of the cumulative money total
    pub money_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            level_name: "Level1".to_string(),
            start_delay: DEFAULT_START_DELAY,
            score_per_second: DEFAULT_SCORE_PER_SECOND,
            death_delay: DEFAULT_DEATH_DELAY,
            money_key: "Money".to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("start_delay", self.start_delay),
            ("death_delay", self.death_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }
        Ok(())
    }
}

/// Everything the controller owns about the running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionState {
    pub phase: Phase,
    pub score: i32,
    /// Stored but not applied to score deltas
    pub score_multiplier: i32,
    /// Seconds of start delay left
    pub start_delay: f32,
    pub high_score: HighScore,
    /// Vehicle copied from the shop selection at start
    pub vehicle: Option<Vehicle>,
}

impl ProgressionState {
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver | Phase::Finished)
    }

    /// Past the start delay and neither paused nor over
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Running && self.start_delay <= 0.0
    }
}

/// Collaborators borrowed for one tick
pub struct TickContext<'a, G> {
    pub registry: &'a mut SpawnRegistry,
    pub projector: &'a GroundProjector<G>,
    pub sink: &'a mut dyn WorldSink,
    pub store: &'a mut dyn PrefsStore,
    /// Position spawns are placed around (usually the player)
    pub anchor: Vec3,
}

/// What happened during one tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub spawned: Vec<SpawnRecord>,
    pub finalized: bool,
}

#[derive(Debug)]
pub struct ProgressionController {
    config: ControllerConfig,
    state: ProgressionState,
    clock: Clock,
    /// Scaled seconds until the next per-second award
    score_timer: f32,
    /// Real seconds until game over is finalized
    finalize_in: f32,
    events: Vec<GameEvent>,
}

impl ProgressionController {
    /// Build a controller for `config.level_name`, loading its high score
    pub fn new(config: ControllerConfig, store: &dyn PrefsStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let high_score = HighScore::load(store, &config.level_name);
        let state = ProgressionState {
            phase: Phase::NotStarted,
            score: 0,
            score_multiplier: 1,
            start_delay: config.start_delay,
            high_score,
            vehicle: None,
        };
        Ok(Self {
            config,
            state,
            clock: Clock::new(),
            score_timer: 0.0,
            finalize_in: 0.0,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> i32 {
        self.state.score
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Take all queued notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn reject(&self, action: &'static str) -> TransitionError {
        log::debug!("Ignoring {} while {:?}", action, self.state.phase);
        TransitionError::InvalidTransition {
            action,
            phase: self.state.phase,
        }
    }

    /// Begin the session: arm the start delay, zero the score, enable spawning
    pub fn start(
        &mut self,
        registry: &mut SpawnRegistry,
        vehicle: Option<Vehicle>,
    ) -> Result<(), TransitionError> {
        if self.state.phase != Phase::NotStarted {
            return Err(self.reject("start"));
        }
        self.state.phase = Phase::Running;
        self.state.start_delay = self.config.start_delay;
        self.state.score = 0;
        self.score_timer = 0.0;
        self.clock.set_time_scale(1.0);
        registry.set_enabled(true);

        let id = vehicle.as_ref().map(|v| v.id.clone());
        log::info!(
            "Session started on {} with vehicle {:?}",
            self.config.level_name,
            id
        );
        self.state.vehicle = vehicle;
        self.events.push(GameEvent::Started { vehicle: id });
        self.events.push(GameEvent::ScoreChanged { score: 0 });
        Ok(())
    }

    /// Add `delta` to the score as-is
    pub fn change_score(&mut self, delta: i32) {
        self.state.score = self.state.score.saturating_add(delta);
        self.events.push(GameEvent::ScoreChanged {
            score: self.state.score,
        });
    }

    pub fn set_score_multiplier(&mut self, multiplier: i32) {
        self.state.score_multiplier = multiplier.max(1);
    }

    /// Change the vehicle's health; destroying it while running ends the game
    pub fn change_health(&mut self, delta: f32) {
        let Some(vehicle) = self.state.vehicle.as_mut() else {
            return;
        };
        vehicle.health += delta;
        let health = vehicle.health;
        let destroyed = vehicle.is_destroyed();
        self.events.push(GameEvent::HealthChanged { health });

        if destroyed && self.state.phase == Phase::Running {
            log::info!("Vehicle destroyed");
            // Phase was checked above, so this cannot be rejected
            if let Err(e) = self.game_over(self.config.death_delay) {
                log::warn!("{}", e);
            }
        }
    }

    /// Apply a player contact. Ignored unless gameplay is live.
    pub fn on_contact(&mut self, contact: &Contact) -> Option<ContactOutcome> {
        if !self.state.is_playing() {
            return None;
        }
        let outcome = contact::resolve(contact, self.state.vehicle.as_ref());
        if outcome.score_delta != 0 {
            self.change_score(outcome.score_delta);
        }
        if let Some(multiplier) = outcome.multiplier {
            self.set_score_multiplier(multiplier);
        }
        if outcome.health_delta != 0.0 {
            self.change_health(outcome.health_delta);
        }
        if outcome.vehicle_hit_effect {
            self.events.push(GameEvent::HitEffect);
        }
        if outcome.other_effect {
            self.events.push(match contact {
                Contact::Item(_) => GameEvent::PickupEffect,
                Contact::Obstacle(_) => GameEvent::HitEffect,
            });
        }
        Some(outcome)
    }

    /// Freeze the clock without touching any timers
    pub fn pause(&mut self, show_menu: bool) -> Result<(), TransitionError> {
        if self.state.phase != Phase::Running {
            return Err(self.reject("pause"));
        }
        self.state.phase = Phase::Paused;
        self.clock.set_time_scale(0.0);
        log::info!("Paused");
        self.events.push(GameEvent::Paused { show_menu });
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), TransitionError> {
        if self.state.phase != Phase::Paused {
            return Err(self.reject("unpause"));
        }
        self.state.phase = Phase::Running;
        self.clock.set_time_scale(1.0);
        log::info!("Resumed");
        self.events.push(GameEvent::Resumed);
        Ok(())
    }

    /// End the run now; results are recorded after `delay` real seconds
    pub fn game_over(&mut self, delay: f32) -> Result<(), TransitionError> {
        if self.state.phase != Phase::Running {
            return Err(self.reject("end the game"));
        }
        self.state.phase = Phase::GameOver;
        self.finalize_in = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        log::info!(
            "Game over at score {}, finalizing in {:.2}s",
            self.state.score,
            self.finalize_in
        );
        self.events.push(GameEvent::GameOverBegan {
            score: self.state.score,
        });
        Ok(())
    }

    /// Advance one frame of `real_dt` seconds
    pub fn tick<G: GroundQuery>(
        &mut self,
        real_dt: f32,
        input: &ControlInput,
        ctx: &mut TickContext<'_, G>,
    ) -> TickReport {
        self.clock.advance(real_dt);
        // Captured before input so a pause toggle never leaks into this frame
        let dt = self.clock.delta_time();
        let mut report = TickReport::default();

        match self.state.phase {
            Phase::NotStarted => {}
            Phase::GameOver | Phase::Finished => {
                ctx.registry.set_enabled(false);
                if self.consume_start_delay(dt) {
                    return report;
                }
                if self.state.phase == Phase::GameOver {
                    self.finalize_in -= self.clock.real_delta_time();
                    if self.finalize_in <= 0.0 {
                        self.finalize(ctx.store);
                        report.finalized = true;
                    }
                }
                if input.confirm {
                    self.events.push(GameEvent::RestartRequested);
                }
                if input.pause {
                    self.events.push(GameEvent::MainMenuRequested);
                }
            }
            Phase::Running | Phase::Paused => {
                if self.consume_start_delay(dt) {
                    return report;
                }

                if input.pause {
                    let toggled = if self.state.is_paused() {
                        self.unpause()
                    } else {
                        self.pause(true)
                    };
                    // Both branches match the current phase
                    if let Err(e) = toggled {
                        log::warn!("{}", e);
                    }
                }
                if self.state.phase != Phase::Running {
                    return report;
                }

                self.accrue_score(dt);
                report.spawned = ctx
                    .registry
                    .tick(dt, ctx.anchor, ctx.projector, &mut *ctx.sink);
            }
        }

        report
    }

    /// While the start delay runs, a tick only counts it down
    fn consume_start_delay(&mut self, dt: f32) -> bool {
        if self.state.start_delay > 0.0 {
            self.state.start_delay -= dt;
            true
        } else {
            false
        }
    }

    /// Award every whole second that elapsed in one change, however long the frame was
    fn accrue_score(&mut self, dt: f32) {
        if self.config.score_per_second <= 0 {
            return;
        }
        self.score_timer -= dt;
        if self.score_timer > 0.0 {
            return;
        }
        let overdue = -self.score_timer;
        let awards = overdue.floor() as i32;
        self.score_timer = 1.0 - overdue.fract();
        self.change_score(
            awards
                .saturating_add(1)
                .saturating_mul(self.config.score_per_second),
        );
    }

    fn finalize(&mut self, store: &mut dyn PrefsStore) {
        let money_key = PrefKey::Money(self.config.money_key.clone());
        let money = store
            .get_int(&money_key, 0)
            .saturating_add(self.state.score);
        store.set_int(&money_key, money);

        let new_high_score = self.state.high_score.submit(self.state.score, store);
        self.state.phase = Phase::Finished;

        log::info!(
            "Results: score {}, high score {}, money {} ({:.1}s played, {:.1}s total)",
            self.state.score,
            self.state.high_score.best,
            money,
            self.clock.scaled_elapsed,
            self.clock.real_elapsed
        );
        self.events.push(GameEvent::GameOverFinalized {
            score: self.state.score,
            high_score: self.state.high_score.best,
            new_high_score,
            money,
        });
    }
}
