//! Typing Effect
//!
//! Reveals an already-complete answer one word at a time. Each step replaces
//! the answer region with every word so far, joined by single spaces. The
//! pause between steps goes through a [`Delay`] so tests can run without
//! waiting on the wall clock.

use crate::display::DisplaySurface;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_WORD_DELAY: Duration = Duration::from_millis(50);

/// Strategy for "wait this long".
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

#[derive(Clone)]
pub struct TypingRenderer {
    delay: Arc<dyn Delay>,
    word_delay: Duration,
}

impl Default for TypingRenderer {
    fn default() -> Self {
        Self::new(Arc::new(TokioDelay), DEFAULT_WORD_DELAY)
    }
}

impl TypingRenderer {
    pub fn new(delay: Arc<dyn Delay>, word_delay: Duration) -> Self {
        Self { delay, word_delay }
    }

    pub fn word_delay(&self) -> Duration {
        self.word_delay
    }

    /// Emits one cumulative replacement per word, pausing between emissions.
    /// Returns only after the last word is shown. Empty or all-whitespace text
    /// emits nothing.
    pub async fn render<S>(&self, text: &str, surface: &mut S)
    where
        S: DisplaySurface + ?Sized,
    {
        let mut shown = String::with_capacity(text.len());
        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 {
                self.delay.wait(self.word_delay).await;
                shown.push(' ');
            }
            shown.push_str(word);
            surface.replace_answer(&shown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingDelay, RecordingSurface, SurfaceEvent};

    fn renderer(delay: Arc<RecordingDelay>) -> TypingRenderer {
        TypingRenderer::new(delay, DEFAULT_WORD_DELAY)
    }

    #[tokio::test]
    async fn test_empty_text_emits_nothing_and_never_waits() {
        let delay = Arc::new(RecordingDelay::default());
        let mut surface = RecordingSurface::default();

        renderer(delay.clone()).render("", &mut surface).await;
        renderer(delay.clone()).render("  \n\t ", &mut surface).await;

        assert!(surface.events().is_empty());
        assert!(delay.waits().is_empty());
    }

    #[tokio::test]
    async fn test_emits_cumulative_prefixes_in_order() {
        let delay = Arc::new(RecordingDelay::default());
        let mut surface = RecordingSurface::default();

        renderer(delay.clone()).render("a b c", &mut surface).await;

        assert_eq!(surface.answers(), ["a", "a b", "a b c"]);
        assert_eq!(delay.waits(), [DEFAULT_WORD_DELAY; 2]);
    }

    #[tokio::test]
    async fn test_delays_sit_between_emissions() {
        let mut surface = RecordingSurface::default();
        let delay = Arc::new(RecordingDelay::sharing(&surface));

        renderer(delay).render("one two", &mut surface).await;

        assert_eq!(
            surface.events(),
            [
                SurfaceEvent::Answer("one".into()),
                SurfaceEvent::Waited,
                SurfaceEvent::Answer("one two".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_whitespace_runs_collapse_to_single_spaces() {
        let delay = Arc::new(RecordingDelay::default());
        let mut surface = RecordingSurface::default();

        renderer(delay)
            .render("  Tax\n\nrelief:\t 25%  ", &mut surface)
            .await;

        assert_eq!(surface.answers(), ["Tax", "Tax relief:", "Tax relief: 25%"]);
    }

    #[tokio::test]
    async fn test_renderer_is_restartable() {
        let delay = Arc::new(RecordingDelay::default());
        let renderer = renderer(delay);
        let mut surface = RecordingSurface::default();

        renderer.render("first", &mut surface).await;
        renderer.render("second answer", &mut surface).await;

        assert_eq!(surface.answers(), ["first", "second", "second answer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_waits_configured_time() {
        let renderer = TypingRenderer::default();
        let mut surface = RecordingSurface::default();
        let started = tokio::time::Instant::now();

        renderer.render("a b c", &mut surface).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_WORD_DELAY * 2);
        assert!(elapsed < DEFAULT_WORD_DELAY * 3);
        assert_eq!(surface.answers(), ["a", "a b", "a b c"]);
    }
}
