//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Handlers send `UiEvent`s to `inbox_tx`
//! - The runtime drains `inbox_rx` each loop iteration
//! - Request tasks are wrapped in a `TaskStarted`/`TaskCompleted` lifecycle so
//!   the reducer can drop results of superseded or cancelled requests
//!
//! Structure:
//! - `mod.rs`: Core runtime (TuiRuntime, event loop, effect dispatch)
//! - `inbox.rs`: Inbox channel types
//! - `handlers/`: Effect handler implementations (HTTP, token store, reveal)

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use delia_core::api::{Agent, ApiClient};
use delia_core::auth::TokenStore;
use delia_core::config::Config;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_util::sync::CancellationToken;

use crate::common::{Clipboard, TaskCompleted, TaskKind, TaskMeta, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Frame cadence while something is moving (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle (no request, reveal or timer pending).
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state (split: tui + overlay).
    pub state: AppState,
    /// Client template; each request gets a copy carrying the current token.
    client: ApiClient,
    tokens: TokenStore,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    /// Last terminal event (keeps polling fast while the user interacts).
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or the terminal cannot be set up.
    pub fn new(config: Config, agent: Agent, token: Option<String>) -> Result<Self> {
        let client = ApiClient::from_config(&config).context("Failed to create API client")?;

        // Panic hook first, so a failure after entering raw mode still restores.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = inbox::channel();
        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(config, agent, token),
            client,
            tokens: TokenStore::default(),
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if reading terminal events or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let effects = update::init(&self.state);
        self.execute_effects(effects);
        let result = self.event_loop();

        self.shutdown();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Layout updates happen before anything reads the viewport.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick triggers render; other events batch into the next frame.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty && !self.state.tui.should_quit {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Cancels every task still running so nothing outlives the screen.
    fn shutdown(&mut self) {
        let mut tokens = self.state.tui.transcript.teardown_all();
        tokens.extend(self.state.tui.tasks.chat.cancel.take());
        for token in tokens {
            token.cancel();
        }
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn needs_fast_poll(&self) -> bool {
        let tui = &self.state.tui;
        tui.tasks.is_any_running()
            || tui.transcript.has_running_reveal()
            || tui.transcript.has_pending_copy_reset()
            || tui.knowledge.notice.is_some()
            || self.last_terminal_event.elapsed() < IDLE_POLL_DURATION
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        let tick_interval = if self.needs_fast_poll() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick is due unless there is already work.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Client for the next request, carrying the session token.
    fn client(&self) -> ApiClient {
        self.client.clone().with_token(self.state.tui.token.clone())
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&mut self, kind: TaskKind, meta: TaskMeta, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let id = self.state.tui.task_seq.next_id();
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
            meta,
        };
        // Applied right away so the reducer sees the task before any key
        // event of the same batch.
        let effects = update::update(&mut self.state, UiEvent::TaskStarted { kind, started });
        self.execute_effects(effects);

        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::CancelTask { token } => {
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }

            // Requests
            UiEffect::SendChat {
                cell,
                agent,
                level,
                question,
            } => {
                let client = self.client();
                self.spawn_task(TaskKind::Chat, TaskMeta::None, true, move |cancel| {
                    handlers::ask_agent(client, cell, agent, level, question, cancel)
                });
            }
            UiEffect::Login { username, password } => {
                let client = self.client.clone();
                let store = self.tokens.clone();
                self.spawn_task(TaskKind::Login, TaskMeta::None, false, move |_| {
                    handlers::login(client, store, username, password)
                });
            }
            UiEffect::LoadStats => {
                let client = self.client();
                self.spawn_task(TaskKind::Stats, TaskMeta::None, false, move |_| {
                    handlers::load_stats(client)
                });
            }
            UiEffect::ListDocuments => {
                let client = self.client();
                self.spawn_task(TaskKind::Documents, TaskMeta::None, false, move |_| {
                    handlers::list_documents(client)
                });
            }
            UiEffect::UploadDocument { path } => {
                let client = self.client();
                let meta = TaskMeta::Upload {
                    file: handlers::display_name(&path),
                };
                self.spawn_task(TaskKind::Upload, meta, false, move |_| {
                    handlers::upload_document(client, path)
                });
            }
            UiEffect::ClearDatabase => {
                let client = self.client();
                self.spawn_task(TaskKind::ClearDatabase, TaskMeta::None, false, move |_| {
                    handlers::clear_database(client)
                });
            }

            // Local effects
            UiEffect::ClearToken => handlers::clear_token(&self.tokens),
            UiEffect::StartReveal {
                cell,
                generation,
                steps,
                interval,
            } => handlers::spawn_reveal(&self.inbox_tx, cell, generation, steps, interval),
            UiEffect::CopyToClipboard { text } => {
                if let Err(err) = Clipboard::copy(&text) {
                    tracing::warn!("clipboard copy failed: {err}");
                }
            }
            UiEffect::PersistUserLevel { level } => {
                // The level is already applied in state.
                if let Err(err) = Config::save_user_level(level) {
                    tracing::warn!("could not save user level: {err:#}");
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
