//! Typewriter reveal of assistant messages.
//!
//! Only plain text is animated: anything that could be Markdown renders in
//! one go. An animated cell starts empty and a periodic task appends one
//! character per tick until the whole message is visible.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// True iff `text` has none of the characters that make Markdown interesting.
pub fn is_plain_text(text: &str) -> bool {
    !text.contains(['\n', '*', '#', '`'])
}

pub fn should_animate(typewriter: bool, text: &str) -> bool {
    typewriter && is_plain_text(text)
}

/// Reveal progress of a single cell.
///
/// The generation changes whenever the cell's content is replaced or the
/// reveal is settled, so ticks from an older task can be told apart.
#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    generation: u64,
    /// Byte length of the visible prefix.
    shown: usize,
    running: bool,
    cancel: Option<CancellationToken>,
}

impl Typewriter {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The part of `content` that is currently visible.
    pub fn visible<'a>(&self, content: &'a str) -> &'a str {
        if self.running {
            content.get(..self.shown).unwrap_or(content)
        } else {
            content
        }
    }

    /// Starts over from an empty buffer. Returns the new generation and the
    /// token of the task that must be cancelled, if any.
    pub fn restart(&mut self) -> (u64, Option<CancellationToken>) {
        let stale = self.cancel.take();
        self.generation += 1;
        self.shown = 0;
        self.running = true;
        (self.generation, stale)
    }

    /// Shows everything at once and detaches the running task.
    pub fn settle(&mut self) -> Option<CancellationToken> {
        if self.running {
            self.generation += 1;
        }
        self.running = false;
        self.cancel.take()
    }

    /// Records the token of the task driving `generation`.
    ///
    /// Hands the token back when the generation is stale so the caller can
    /// cancel it.
    pub fn attach(
        &mut self,
        generation: u64,
        token: CancellationToken,
    ) -> Result<(), CancellationToken> {
        if !self.running || generation != self.generation {
            return Err(token);
        }
        self.cancel = Some(token);
        Ok(())
    }

    /// Appends exactly one character of `content`.
    ///
    /// Returns `None` for a stale generation, otherwise whether the reveal is
    /// still running afterwards.
    pub fn advance(&mut self, generation: u64, content: &str) -> Option<bool> {
        if !self.running || generation != self.generation {
            return None;
        }
        if let Some(ch) = content[self.shown..].chars().next() {
            self.shown += ch.len_utf8();
        }
        if self.shown >= content.len() {
            self.running = false;
            self.cancel = None;
        }
        Some(self.running)
    }
}

/// Number of ticks a reveal of `content` needs.
pub fn reveal_steps(content: &str) -> usize {
    content.chars().count()
}

/// Drives a reveal: calls `on_tick` every `interval`, `steps` times, until
/// `cancel` fires or `on_tick` returns false.
pub async fn drive_reveal<F>(
    steps: usize,
    interval: Duration,
    cancel: CancellationToken,
    mut on_tick: F,
) where
    F: FnMut() -> bool,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    for _ in 0..steps {
        tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if !on_tick() {
            return;
        }
    }
}
