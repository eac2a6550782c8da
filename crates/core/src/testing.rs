//! Recording doubles shared by the unit tests.

use crate::display::{Banner, DisplaySurface};
use crate::typing::Delay;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Title(String),
    Text(String),
    Banner(Banner),
    Progress(String),
    AskEnabled(bool),
    Answer(String),
    Waited,
}

type EventLog = Arc<Mutex<Vec<SurfaceEvent>>>;

#[derive(Default)]
pub struct RecordingSurface {
    log: EventLog,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Answer(content) => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn banners(&self) -> Vec<Banner> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Banner(banner) => Some(banner),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SurfaceEvent) {
        self.log.lock().unwrap().push(event);
    }
}

impl DisplaySurface for RecordingSurface {
    fn title(&mut self, title: &str) {
        self.push(SurfaceEvent::Title(title.into()));
    }

    fn text(&mut self, text: &str) {
        self.push(SurfaceEvent::Text(text.into()));
    }

    fn banner(&mut self, banner: Banner) {
        self.push(SurfaceEvent::Banner(banner));
    }

    fn progress(&mut self, message: &str) {
        self.push(SurfaceEvent::Progress(message.into()));
    }

    fn set_ask_enabled(&mut self, enabled: bool) {
        self.push(SurfaceEvent::AskEnabled(enabled));
    }

    fn replace_answer(&mut self, content: &str) {
        self.push(SurfaceEvent::Answer(content.into()));
    }
}

/// Records requested waits without sleeping. When built with
/// [`RecordingDelay::sharing`], each wait also lands in the surface's log.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
    log: Option<EventLog>,
}

impl RecordingDelay {
    pub fn sharing(surface: &RecordingSurface) -> Self {
        Self {
            waits: Mutex::default(),
            log: Some(surface.log.clone()),
        }
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(SurfaceEvent::Waited);
        }
    }
}
