//! Composition root
//!
//! `Host` owns everything with a lifetime longer than one frame: the ambient
//! visualizer and its loop, the optional game session and its loop, the
//! keyboard recognizer and the render surfaces. Platform code feeds it raw
//! events and frame callbacks; it never reaches back into the platform except
//! through the `FrameScheduler` it was given.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;
use thiserror::Error;

use crate::renderer::{FieldView, RenderSurface, draw_game, draw_visualizer};
use crate::settings::Settings;
use crate::sim::geom::Rect;
use crate::sim::{
    FixedStep, FrameHandle, FrameLoop, FrameScheduler, GameConfig, GameEvent, GamePhase, GameSession, HeldKeys,
    KeyCode, LoopControl, SequenceRecognizer, Visualizer, tick,
};

/// What opened the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSource {
    /// The secret key sequence was typed
    Sequence,
    /// Someone called `Activator::activate`
    Signal,
}

/// Lifecycle notifications for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    GameOpened(ActivationSource),
    RoundStarted,
    RoundEnded { phase: GamePhase, score: u64 },
    GameClosed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("no render surface attached")]
    MissingSurface,
    #[error("host is not mounted")]
    NotMounted,
    #[error("game is not open")]
    GameClosed,
}

/// Cloneable handle that opens the game without the key sequence
#[derive(Debug, Clone)]
pub struct Activator {
    tx: Sender<ActivationSource>,
}

impl Activator {
    /// Queue an activation; returns false once the host is gone
    pub fn activate(&self) -> bool {
        self.tx.send(ActivationSource::Signal).is_ok()
    }
}

type Listener = Box<dyn FnMut(&HostEvent)>;

pub struct Host<S: RenderSurface, K: FrameScheduler> {
    settings: Settings,
    scheduler: K,
    background: Option<S>,
    overlay: Option<S>,
    mounted: bool,
    viewport: Vec2,
    seed: u64,
    games_opened: u64,

    visualizer: Visualizer,
    visual_loop: FrameLoop,
    visual_clock: FixedStep,

    game: Option<GameSession>,
    game_loop: FrameLoop,
    game_clock: FixedStep,

    recognizer: SequenceRecognizer,
    held: HeldKeys,
    activator: Sender<ActivationSource>,
    activations: Receiver<ActivationSource>,
    listeners: Vec<Listener>,
}

impl<S: RenderSurface, K: FrameScheduler> fmt::Debug for Host<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("mounted", &self.mounted)
            .field("viewport", &self.viewport)
            .field("visual_loop", &self.visual_loop)
            .field("game_phase", &self.game.as_ref().map(|g| g.phase))
            .field("game_loop", &self.game_loop)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: RenderSurface, K: FrameScheduler> Host<S, K> {
    pub fn new(settings: Settings, scheduler: K, width: f32, height: f32) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let bounds = Rect::sanitized(width, height);
        let (activator, activations) = mpsc::channel();
        Self {
            visualizer: Visualizer::new(settings.visualizer_config(), bounds.width(), bounds.height(), seed),
            settings,
            scheduler,
            background: None,
            overlay: None,
            mounted: false,
            viewport: bounds.size,
            seed,
            games_opened: 0,
            visual_loop: FrameLoop::new(),
            visual_clock: FixedStep::default(),
            game: None,
            game_loop: FrameLoop::new(),
            game_clock: FixedStep::default(),
            recognizer: SequenceRecognizer::default(),
            held: HeldKeys::default(),
            activator,
            activations,
            listeners: Vec::new(),
        }
    }

    /// Attach the surface the visualizer paints on
    pub fn with_background(mut self, surface: S) -> Self {
        self.background = Some(surface);
        self
    }

    /// Attach the surface the game paints on
    pub fn with_overlay(mut self, surface: S) -> Self {
        self.overlay = Some(surface);
        self
    }

    // === Lifecycle ===

    /// Start the visualizer loop. Requires a background surface.
    pub fn mount(&mut self) -> Result<(), HostError> {
        if self.background.is_none() {
            return Err(HostError::MissingSurface);
        }
        if self.mounted {
            return Ok(());
        }
        self.mounted = true;
        self.visual_clock.reset();
        self.visual_loop.start(&mut self.scheduler);
        log::info!("Host mounted ({}x{}, seed {})", self.viewport.x, self.viewport.y, self.seed);
        Ok(())
    }

    /// Stop every loop and close the game. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.close_game();
        self.visual_loop.stop(&mut self.scheduler);
        self.recognizer.reset();
        self.held.clear();
        self.mounted = false;
        log::info!("Host unmounted");
    }

    /// Show the game in its idle state; Ok(false) if it was already open
    pub fn open_game(&mut self, source: ActivationSource) -> Result<bool, HostError> {
        if !self.mounted {
            return Err(HostError::NotMounted);
        }
        if self.game.is_some() {
            return Ok(false);
        }
        self.games_opened += 1;
        let config = GameConfig {
            variant: self.settings.variant,
            burst_size: self.settings.quality.burst_size(),
            seed: self.seed.wrapping_add(self.games_opened),
            ..GameConfig::default()
        };
        log::info!("Opening {:?} via {:?}", config.variant, source);
        self.game = Some(GameSession::new(config));
        self.recognizer.reset();
        self.held.clear();
        self.emit(HostEvent::GameOpened(source));
        Ok(true)
    }

    /// Tear down the session and cancel its loop; false if nothing was open
    pub fn close_game(&mut self) -> bool {
        let Some(mut session) = self.game.take() else {
            return false;
        };
        self.game_loop.stop(&mut self.scheduler);
        self.game_clock.reset();
        session.teardown();
        self.held.clear();
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear([0.0; 4]);
        }
        log::info!("Game closed with score {}", session.score);
        self.emit(HostEvent::GameClosed);
        true
    }

    /// Idle/terminal -> Running; Ok(false) while a round is already running
    pub fn start_round(&mut self) -> Result<bool, HostError> {
        self.begin_round(GameSession::start_round)
    }

    /// Re-run the round initializer; Ok(false) if no round was ever started
    pub fn restart_round(&mut self) -> Result<bool, HostError> {
        self.begin_round(GameSession::restart_round)
    }

    fn begin_round(&mut self, init: fn(&mut GameSession) -> bool) -> Result<bool, HostError> {
        let Some(session) = self.game.as_mut() else {
            return Err(HostError::GameClosed);
        };
        if self.overlay.is_none() {
            return Err(HostError::MissingSurface);
        }
        if !init(session) {
            return Ok(false);
        }
        self.game_clock.reset();
        self.game_loop.start(&mut self.scheduler);
        self.forward_game_events();
        Ok(true)
    }

    // === Input ===

    /// Viewport changed size; degenerate sizes are clamped, never rejected
    ///
    /// The game keeps its logical field and is only drawn at a new scale.
    pub fn resize(&mut self, width: f32, height: f32) {
        let bounds = Rect::sanitized(width, height);
        self.viewport = bounds.size;
        self.visualizer.resize(bounds.width(), bounds.height());
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.mounted {
            self.visualizer.pointer_move(Vec2::new(x, y));
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.mounted {
            self.visualizer.pointer_down(Vec2::new(x, y));
        }
    }

    /// Route a DOM key code: to the game while it is shown, else to the recognizer
    pub fn key_down(&mut self, code: &str) {
        let Some(key) = KeyCode::from_dom_code(code) else {
            return;
        };
        if let Some(phase) = self.game.as_ref().map(|g| g.phase) {
            match key {
                KeyCode::Escape => {
                    self.close_game();
                }
                KeyCode::Enter => {
                    let result = match phase {
                        GamePhase::Idle => self.start_round(),
                        GamePhase::Won | GamePhase::Lost => self.restart_round(),
                        GamePhase::Running => Ok(false),
                    };
                    if let Err(e) = result {
                        log::warn!("Cannot start round: {}", e);
                    }
                }
                _ => self.held.press(key),
            }
            return;
        }
        if self.mounted && self.recognizer.push(key) {
            if let Err(e) = self.open_game(ActivationSource::Sequence) {
                log::warn!("Secret sequence ignored: {}", e);
            }
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = KeyCode::from_dom_code(code) {
            self.held.release(key);
        }
    }

    /// Sender for the explicit activate signal
    pub fn activator(&self) -> Activator {
        Activator {
            tx: self.activator.clone(),
        }
    }

    /// Open the game for any queued activation; returns how many were queued
    pub fn poll_activations(&mut self) -> usize {
        let queued: Vec<ActivationSource> = self.activations.try_iter().collect();
        for source in &queued {
            match self.open_game(*source) {
                Ok(_) => {}
                Err(e) => log::warn!("Activation ignored: {}", e),
            }
        }
        queued.len()
    }

    /// Register an observer for lifecycle events
    pub fn subscribe<F: FnMut(&HostEvent) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    // === Frames ===

    /// Dispatch one fired frame callback; returns false if the handle was stale
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> bool {
        self.poll_activations();
        let glow = self.settings.effective_glow();

        if let Some(ticket) = self.visual_loop.begin_frame(handle) {
            let ticks = self.visual_clock.advance(now_ms);
            for _ in 0..ticks {
                self.visualizer.step();
            }
            if let Some(surface) = self.background.as_mut() {
                draw_visualizer(surface, &self.visualizer, glow);
            }
            self.visual_loop.end_frame(ticket, &mut self.scheduler, LoopControl::Continue);
            return true;
        }

        if let Some(ticket) = self.game_loop.begin_frame(handle) {
            let ticks = self.game_clock.advance(now_ms);
            for _ in 0..ticks {
                let Some(session) = self.game.as_mut() else {
                    break;
                };
                // Snapshot once per tick
                let input = self.held.snapshot();
                tick(session, &input);
                self.forward_game_events();
                if self.game.as_ref().is_some_and(|g| g.phase.is_terminal()) {
                    break;
                }
            }

            let mut control = LoopControl::Continue;
            if let Some(session) = self.game.as_ref() {
                if let Some(surface) = self.overlay.as_mut() {
                    draw_game(&mut FieldView::fit(surface, session.field(), self.viewport), session, glow);
                }
                if session.phase.is_terminal() {
                    control = LoopControl::Stop;
                }
            } else {
                control = LoopControl::Stop;
            }
            self.game_loop.end_frame(ticket, &mut self.scheduler, control);
            return true;
        }

        log::trace!("Ignoring stale frame {:?}", handle);
        false
    }

    fn forward_game_events(&mut self) {
        let Some(session) = self.game.as_mut() else {
            return;
        };
        for event in session.drain_events() {
            match event {
                GameEvent::RoundStarted => self.emit(HostEvent::RoundStarted),
                GameEvent::Won { score } => self.emit(HostEvent::RoundEnded {
                    phase: GamePhase::Won,
                    score,
                }),
                GameEvent::Lost { score } => self.emit(HostEvent::RoundEnded {
                    phase: GamePhase::Lost,
                    score,
                }),
                other => log::trace!("{:?}", other),
            }
        }
    }

    fn emit(&mut self, event: HostEvent) {
        log::debug!("Host event: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // === Accessors ===

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_visualizer_running(&self) -> bool {
        self.visual_loop.is_running()
    }

    pub fn is_game_running(&self) -> bool {
        self.game_loop.is_running()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn visualizer(&self) -> &Visualizer {
        &self.visualizer
    }

    pub fn game(&self) -> Option<&GameSession> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut GameSession> {
        self.game.as_mut()
    }

    pub fn background(&self) -> Option<&S> {
        self.background.as_ref()
    }

    pub fn overlay(&self) -> Option<&S> {
        self.overlay.as_ref()
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }
}

impl<S: RenderSurface, K: FrameScheduler> Drop for Host<S, K> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::VertexBatch;
    use crate::sim::{ManualScheduler, SECRET_SEQUENCE};
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestHost = Host<VertexBatch, ManualScheduler>;

    fn host() -> TestHost {
        let settings = Settings {
            seed: Some(9),
            ..Settings::default()
        };
        Host::new(settings, ManualScheduler::new(), 1024.0, 768.0)
            .with_background(VertexBatch::new())
            .with_overlay(VertexBatch::new())
    }

    fn dom_code(key: KeyCode) -> &'static str {
        match key {
            KeyCode::ArrowUp => "ArrowUp",
            KeyCode::ArrowDown => "ArrowDown",
            KeyCode::ArrowLeft => "ArrowLeft",
            KeyCode::ArrowRight => "ArrowRight",
            KeyCode::KeyA => "KeyA",
            KeyCode::KeyB => "KeyB",
            KeyCode::KeyD => "KeyD",
            KeyCode::Space => "Space",
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Escape",
        }
    }

    #[test]
    fn test_mount_requires_background() {
        let mut bare: TestHost = Host::new(Settings::default(), ManualScheduler::new(), 800.0, 600.0);
        assert_eq!(bare.mount(), Err(HostError::MissingSurface));
        assert!(!bare.is_mounted());
        assert!(bare.scheduler().queued().is_empty());
    }

    #[test]
    fn test_secret_sequence_opens_game_once() {
        let mut h = host();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        h.subscribe(move |e| sink.borrow_mut().push(*e));
        h.mount().unwrap();
        for key in SECRET_SEQUENCE {
            h.key_down(dom_code(key));
        }
        assert!(h.game().is_some());
        assert_eq!(*seen.borrow(), vec![HostEvent::GameOpened(ActivationSource::Sequence)]);
    }

    #[test]
    fn test_keys_go_to_game_while_open() {
        let mut h = host();
        h.mount().unwrap();
        h.open_game(ActivationSource::Signal).unwrap();
        h.key_down("Enter");
        assert_eq!(h.game().unwrap().phase, GamePhase::Running);
        assert!(h.is_game_running());
        h.key_down("Escape");
        assert!(h.game().is_none());
        assert!(!h.is_game_running());
    }

    #[test]
    fn test_unmounted_host_rejects_game() {
        let mut h = host();
        assert_eq!(h.open_game(ActivationSource::Signal), Err(HostError::NotMounted));
        assert_eq!(h.start_round(), Err(HostError::GameClosed));
    }
}
