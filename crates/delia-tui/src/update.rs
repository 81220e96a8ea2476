//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use delia_core::api::{Agent, ApiError, is_supported_upload};
use delia_core::sanitize::sanitize;
use ratatui::layout::{Position, Rect};
use tracing::{debug, warn};

use crate::common::commands::{self, SlashCommand};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::knowledge::{Notice, format_document_list};
use crate::mutations::{SessionMutation, StateMutation, TranscriptMutation};
use crate::overlays::{self, LoginState, Overlay, OverlayRequest, OverlayTransition};
use crate::state::{AppState, TuiState};
use crate::transcript::reveal::{reveal_steps, should_animate};
use crate::transcript::{CellId, MessageCell};
use crate::{input, render};

/// Assistant message shown when a chat request fails.
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your message. Please try again.";

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Lines moved per mouse wheel step.
const SCROLL_LINES: usize = 3;

/// Effects to run once before the first frame.
pub fn init(app: &AppState) -> Vec<UiEffect> {
    if app.tui.token.is_some() {
        vec![UiEffect::LoadStats]
    } else {
        vec![]
    }
}

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            let now = Instant::now();
            app.tui.transcript.expire_copied(now);
            app.tui.knowledge.expire_notice(now);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(&mut app.tui, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                debug!(?kind, "dropping result of superseded task");
                vec![]
            }
        }
        UiEvent::ChatResult { cell, result } => handle_chat_result(app, cell, result),
        UiEvent::LoginResult(result) => handle_login_result(app, result),
        UiEvent::StatsLoaded(result) => match result {
            Ok(stats) => {
                app.tui.knowledge.stats = Some(stats);
                vec![]
            }
            Err(err) if err.is_unauthorized() => session_expired(app),
            Err(err) => {
                warn!("loading document stats failed: {err}");
                vec![]
            }
        },
        UiEvent::DocumentsListed(result) => match result {
            Ok(documents) => {
                push_system(&mut app.tui, format_document_list(&documents));
                vec![]
            }
            Err(err) => api_failure(app, "Could not list documents", &err),
        },
        UiEvent::UploadResult { file, result } => match result {
            Ok(()) => {
                app.tui
                    .knowledge
                    .show(Notice::success(format!("Uploaded {file}"), Instant::now()));
                vec![UiEffect::LoadStats]
            }
            Err(err) => api_failure(app, &format!("Upload of {file} failed"), &err),
        },
        UiEvent::DatabaseCleared(result) => match result {
            Ok(()) => {
                let mut effects = clear_conversation(&mut app.tui);
                app.tui.knowledge.show(Notice::success(
                    "Knowledge base cleared",
                    Instant::now(),
                ));
                effects.push(UiEffect::LoadStats);
                effects
            }
            Err(err) => api_failure(app, "Clearing the knowledge base failed", &err),
        },
        UiEvent::RevealStarted {
            cell,
            generation,
            cancel,
        } => {
            let attached = match app.tui.transcript.cell_mut(cell) {
                Some(target) => target.attach_reveal(generation, cancel),
                None => Err(cancel),
            };
            match attached {
                Ok(()) => vec![],
                Err(stale) => vec![UiEffect::CancelTask { token: Some(stale) }],
            }
        }
        UiEvent::RevealTick { cell, generation } => {
            if let Some(target) = app.tui.transcript.cell_mut(cell) {
                target.advance_reveal(generation);
            }
            vec![]
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

fn send_message(app: &mut AppState, text: String) -> Vec<UiEffect> {
    if app.tui.token.is_none() {
        app.tui.input.set_text(&text);
        app.overlay = Some(Overlay::Login(LoginState::new(Some(
            "Please log in first.".to_string(),
        ))));
        return vec![];
    }

    let question = text.trim().to_string();
    app.tui.transcript.push(MessageCell::user(question.clone()));
    let cell = app.tui.transcript.push(MessageCell::pending_assistant());
    app.tui.chat_cell = Some(cell);

    vec![UiEffect::SendChat {
        cell,
        agent: app.tui.agent,
        level: app.tui.level,
        question,
    }]
}

fn handle_chat_result(
    app: &mut AppState,
    cell: CellId,
    result: Result<String, ApiError>,
) -> Vec<UiEffect> {
    if app.tui.chat_cell == Some(cell) {
        app.tui.chat_cell = None;
    }
    let typewriter = app.tui.config.render.typewriter;
    let interval = app.tui.config.render.reveal_interval();

    match result {
        Ok(raw) => match app.tui.transcript.cell_mut(cell) {
            Some(target) => show_answer(target, sanitize(&raw), typewriter, interval),
            None => vec![],
        },
        Err(err) => {
            warn!("chat request failed: {err}");
            let mut effects = match app.tui.transcript.cell_mut(cell) {
                Some(target) => {
                    UiEffect::cancel_all(target.set_content(CHAT_ERROR_MESSAGE.to_string()))
                }
                None => vec![],
            };
            if err.is_unauthorized() {
                effects.extend(session_expired(app));
            }
            effects
        }
    }
}

/// Replaces the content of an assistant cell, starting a reveal when the
/// text is eligible for one.
pub fn show_answer(
    cell: &mut MessageCell,
    answer: String,
    typewriter: bool,
    interval: Duration,
) -> Vec<UiEffect> {
    let animate = !answer.is_empty() && should_animate(typewriter, &answer);
    let mut effects = UiEffect::cancel_all(cell.set_content(answer));
    if animate {
        let (generation, stale) = cell.start_reveal();
        effects.extend(UiEffect::cancel_all(stale));
        effects.push(UiEffect::StartReveal {
            cell: cell.id(),
            generation,
            steps: reveal_steps(cell.content()),
            interval,
        });
    }
    effects
}

fn cancel_chat(tui: &mut TuiState) -> Vec<UiEffect> {
    let Some(cell) = tui.chat_cell.take() else {
        return vec![];
    };
    let token = tui.tasks.chat.cancel.clone();
    tui.tasks.chat.clear();
    let mut effects = UiEffect::cancel_all(tui.transcript.remove(cell));
    effects.push(UiEffect::CancelTask { token });
    push_system(tui, "Request cancelled.".to_string());
    effects
}

fn clear_conversation(tui: &mut TuiState) -> Vec<UiEffect> {
    let mut effects = cancel_chat(tui);
    effects.extend(UiEffect::cancel_all(tui.transcript.clear()));
    effects
}

// ============================================================================
// Auth
// ============================================================================

fn handle_login_result(app: &mut AppState, result: Result<String, ApiError>) -> Vec<UiEffect> {
    match result {
        Ok(token) => {
            app.tui.token = Some(token);
            let username = match app.overlay.take() {
                Some(Overlay::Login(login)) => login.username,
                other => {
                    app.overlay = other;
                    String::new()
                }
            };
            if !username.is_empty() {
                push_system(&mut app.tui, format!("Logged in as {username}."));
            }
            vec![UiEffect::LoadStats]
        }
        Err(err) => {
            let message = if err.is_unauthorized() {
                "Incorrect username or password.".to_string()
            } else {
                format!("Login failed: {err}")
            };
            match app.overlay.as_mut().and_then(Overlay::as_login_mut) {
                Some(login) => login.fail(message),
                None => app.tui.knowledge.show(Notice::error(message)),
            }
            vec![]
        }
    }
}

/// Forgets the token and sends the user back to the login form.
fn session_expired(app: &mut AppState) -> Vec<UiEffect> {
    app.tui.token = None;
    app.overlay = Some(Overlay::Login(LoginState::new(Some(
        SESSION_EXPIRED.to_string(),
    ))));
    vec![UiEffect::ClearToken]
}

fn api_failure(app: &mut AppState, context: &str, err: &ApiError) -> Vec<UiEffect> {
    if err.is_unauthorized() {
        return session_expired(app);
    }
    warn!("{context}: {err}");
    app.tui.knowledge.show(Notice::error(format!("{context}: {err}")));
    vec![]
}

fn require_login(app: &mut AppState) -> bool {
    if app.tui.token.is_some() {
        return true;
    }
    app.overlay = Some(Overlay::Login(LoginState::new(Some(
        "Please log in first.".to_string(),
    ))));
    false
}

// ============================================================================
// Slash Commands
// ============================================================================

fn handle_command(app: &mut AppState, command: SlashCommand) -> Vec<UiEffect> {
    match command {
        SlashCommand::Agent(agent) => {
            let agent = agent.unwrap_or(match app.tui.agent {
                Agent::Documents => Agent::Edsl,
                Agent::Edsl => Agent::Documents,
            });
            app.tui.agent = agent;
            push_system(&mut app.tui, format!("Now talking to the {}.", agent.label()));
            vec![]
        }
        SlashCommand::Level(Some(level)) => {
            apply_overlay_update(app, overlays::level_picker::select_level(level))
        }
        SlashCommand::Level(None) => open_overlay(app, OverlayRequest::LevelPicker),
        SlashCommand::Upload(path) => {
            if !is_supported_upload(&path) {
                let err = ApiError::UnsupportedFile(path.display().to_string());
                app.tui.knowledge.show(Notice::error(err.to_string()));
                return vec![];
            }
            if app.tui.tasks.upload.is_running() {
                app.tui
                    .knowledge
                    .show(Notice::error("An upload is already in progress."));
                return vec![];
            }
            if !require_login(app) {
                return vec![];
            }
            vec![UiEffect::UploadDocument { path }]
        }
        SlashCommand::Docs => {
            if require_login(app) {
                vec![UiEffect::ListDocuments]
            } else {
                vec![]
            }
        }
        SlashCommand::Stats => {
            if require_login(app) {
                vec![UiEffect::LoadStats]
            } else {
                vec![]
            }
        }
        SlashCommand::ClearDatabase => {
            if require_login(app) {
                open_overlay(app, OverlayRequest::ConfirmClear)
            } else {
                vec![]
            }
        }
        SlashCommand::Clear => clear_conversation(&mut app.tui),
        SlashCommand::Login => open_overlay(app, OverlayRequest::Login),
        SlashCommand::Logout => {
            app.tui.token = None;
            app.tui.knowledge.stats = None;
            app.overlay = Some(Overlay::Login(LoginState::new(None)));
            let mut effects = cancel_chat(&mut app.tui);
            effects.push(UiEffect::ClearToken);
            effects
        }
        SlashCommand::Help => {
            push_system(&mut app.tui, commands::help_text());
            vec![]
        }
        SlashCommand::Quit => quit(&mut app.tui),
    }
}

fn quit(tui: &mut TuiState) -> Vec<UiEffect> {
    let mut effects = UiEffect::cancel_all(tui.transcript.teardown_all());
    effects.push(UiEffect::CancelTask {
        token: tui.tasks.chat.cancel.clone(),
    });
    effects.push(UiEffect::Quit);
    effects
}

// ============================================================================
// StateMutation Dispatcher
// ============================================================================

fn push_system(tui: &mut TuiState, text: String) {
    tui.transcript.push(MessageCell::system(text));
}

fn apply_mutations(tui: &mut TuiState, mutations: Vec<StateMutation>) {
    for mutation in mutations {
        match mutation {
            StateMutation::Transcript(TranscriptMutation::AppendSystemMessage(text)) => {
                push_system(tui, text);
            }
            StateMutation::Session(SessionMutation::SetUserLevel(level)) => tui.level = level,
        }
    }
}

fn apply_overlay_update(app: &mut AppState, update: overlays::OverlayUpdate) -> Vec<UiEffect> {
    apply_mutations(&mut app.tui, update.mutations);
    if matches!(update.transition, OverlayTransition::Close) {
        app.overlay = None;
    }
    update.effects
}

fn open_overlay(app: &mut AppState, request: OverlayRequest) -> Vec<UiEffect> {
    app.overlay = Some(Overlay::open(request, &app.tui));
    vec![]
}

// ============================================================================
// Frame Handler
// ============================================================================

/// Keeps the transcript viewport in sync with the terminal size.
fn handle_frame(tui: &mut TuiState, width: u16, height: u16) {
    let layout = render::layout(tui, Rect::new(0, 0, width, height));
    tui.transcript.set_viewport(
        usize::from(layout.transcript.width),
        usize::from(layout.transcript.height),
    );
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(&mut app.tui, mouse),
        Event::Paste(text) => {
            match app.overlay.as_mut() {
                Some(Overlay::Login(login)) => login.paste(&text),
                Some(_) => {}
                None => input::handle_paste(&mut app.tui.input, &text),
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key) {
        return apply_overlay_update(app, update);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return quit(&mut app.tui),
        KeyCode::Char('d') if ctrl && app.tui.input.text().is_empty() => {
            return quit(&mut app.tui);
        }
        KeyCode::Char('y') if ctrl => return copy_latest_code_block(&mut app.tui),
        KeyCode::PageUp => {
            let page = app.tui.transcript.page();
            app.tui.transcript.scroll_up(page);
            return vec![];
        }
        KeyCode::PageDown => {
            let page = app.tui.transcript.page();
            app.tui.transcript.scroll_down(page);
            return vec![];
        }
        KeyCode::End if ctrl => {
            app.tui.transcript.scroll_to_bottom();
            return vec![];
        }
        KeyCode::Esc => return handle_escape(&mut app.tui),
        _ => {}
    }

    let enabled = !app.tui.is_waiting();
    match input::handle_key(&mut app.tui.input, key, enabled) {
        input::InputAction::None => vec![],
        input::InputAction::Submit(text) => match commands::parse(&text) {
            Some(Ok(command)) => handle_command(app, command),
            Some(Err(message)) => {
                push_system(&mut app.tui, message);
                vec![]
            }
            None => send_message(app, text),
        },
    }
}

/// Esc dismisses an error, then cancels the request in flight, then skips
/// running reveals.
fn handle_escape(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.knowledge.dismiss_error() {
        return vec![];
    }
    if tui.is_waiting() {
        return cancel_chat(tui);
    }
    UiEffect::cancel_all(tui.transcript.teardown_all())
}

fn handle_mouse(tui: &mut TuiState, mouse: MouseEvent) -> Vec<UiEffect> {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            tui.transcript.scroll_up(SCROLL_LINES);
            vec![]
        }
        MouseEventKind::ScrollDown => {
            tui.transcript.scroll_down(SCROLL_LINES);
            vec![]
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let area = tui.transcript_area.get();
            if !area.contains(Position::new(mouse.column, mouse.row)) {
                return vec![];
            }
            match tui.transcript.copy_target_at(mouse.row) {
                Some(target) => copy_code_block(tui, target.cell, target.block),
                None => vec![],
            }
        }
        _ => vec![],
    }
}

// ============================================================================
// Copy
// ============================================================================

fn copy_latest_code_block(tui: &mut TuiState) -> Vec<UiEffect> {
    match tui.transcript.latest_code_block() {
        Some((cell, block)) => copy_code_block(tui, cell, block),
        None => vec![],
    }
}

/// Flags the block as copied right away, then asks the runtime to copy it.
fn copy_code_block(tui: &mut TuiState, cell: CellId, block: usize) -> Vec<UiEffect> {
    let width = tui.transcript.width();
    let window = tui.config.render.copy_feedback();
    let Some(target) = tui.transcript.cell_mut(cell) else {
        return vec![];
    };
    let Some(text) = target.code_block_text(block, width) else {
        return vec![];
    };
    target.mark_copied(block, Instant::now(), window);
    vec![UiEffect::CopyToClipboard { text }]
}
