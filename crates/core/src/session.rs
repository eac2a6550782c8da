//! Session Controller
//!
//! Drives one user session through `LoggedOut -> LoggedInIdle <-> LoggedInProcessing`.
//! The session's flags live in an explicit [`SessionState`] owned by the
//! caller and passed into every controller operation; the controller itself
//! only holds the read-only collaborators and can be shared between sessions.
//!
//! At most one question is in flight per session. The `processing` flag is
//! taken with a compare-and-swap before the outbound request and released by
//! a guard on every exit path, including a dropped future.

use crate::{
    auth::Authenticator,
    display::{Banner, DisplaySurface},
    query::Selection,
    response::{FailureKind, ResponseResult, ResponseService},
    typing::TypingRenderer,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{info, instrument, warn};

pub const LOGIN_TITLE: &str = "Login";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password. Please try again.";
pub const QUESTION_TITLE: &str = "AI Tax Donation Question";
pub const QUESTION_INSTRUCTIONS: &str =
    "Select your country of residence and the country you're donating to.";
pub const RESIDENCE_LABEL: &str = "I live in:";
pub const DESTINATION_LABEL: &str = "I am donating money to:";
pub const PROGRESS_MESSAGE: &str = "Generating response...";
pub const ANSWER_BANNER: &str = "AI's Response:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    LoggedInIdle,
    LoggedInProcessing,
}

/// Per-session flags. Both start false; `authenticated` never reverts.
#[derive(Debug, Default)]
pub struct SessionState {
    authenticated: AtomicBool,
    processing: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_authenticated(), self.is_processing()) {
            (false, _) => SessionPhase::LoggedOut,
            (true, false) => SessionPhase::LoggedInIdle,
            (true, true) => SessionPhase::LoggedInProcessing,
        }
    }

    fn mark_authenticated(&self) {
        self.authenticated.store(true, Ordering::Release);
    }

    /// Claims the in-flight slot, or `None` if a request already holds it.
    fn begin_processing(&self) -> Option<ProcessingGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard { state: self })
    }
}

/// Clears `processing` when dropped.
struct ProcessingGuard<'a> {
    state: &'a SessionState,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.state.processing.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Rejected,
    AlreadyAuthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The trimmed answer was typed out in full.
    Answered(String),
    /// The failure detail was shown in place of an answer.
    Failed { kind: FailureKind, detail: String },
    /// Another question is still in flight for this session.
    Busy,
    NotAuthenticated,
}

pub struct SessionController {
    authenticator: Arc<Authenticator>,
    responses: ResponseService,
    renderer: TypingRenderer,
}

impl SessionController {
    pub fn new(
        authenticator: Arc<Authenticator>,
        responses: ResponseService,
        renderer: TypingRenderer,
    ) -> Self {
        Self {
            authenticator,
            responses,
            renderer,
        }
    }

    pub fn show_login_page<S>(&self, surface: &mut S)
    where
        S: DisplaySurface + ?Sized,
    {
        surface.title(LOGIN_TITLE);
    }

    /// Checks submitted credentials. A failure leaves the session logged out;
    /// there is no attempt counting.
    #[instrument(name = "session_login", skip_all)]
    pub fn login<S>(
        &self,
        state: &SessionState,
        username: &str,
        password: &str,
        surface: &mut S,
    ) -> LoginOutcome
    where
        S: DisplaySurface + ?Sized,
    {
        if state.is_authenticated() {
            return LoginOutcome::AlreadyAuthenticated;
        }

        if self.authenticator.verify(username, password) {
            state.mark_authenticated();
            info!("Login succeeded");
            surface.banner(Banner::Success(LOGIN_SUCCESS_MESSAGE.to_string()));
            LoginOutcome::Authenticated
        } else {
            warn!("Login rejected");
            surface.banner(Banner::Error(LOGIN_FAILED_MESSAGE.to_string()));
            LoginOutcome::Rejected
        }
    }

    /// Renders the question page for the current picks and returns the
    /// composed question. The ask trigger is enabled only while idle.
    pub fn show_question_page<S>(
        &self,
        state: &SessionState,
        selection: &Selection,
        surface: &mut S,
    ) -> String
    where
        S: DisplaySurface + ?Sized,
    {
        let question = selection.question();
        surface.title(QUESTION_TITLE);
        surface.text(QUESTION_INSTRUCTIONS);
        surface.text(&format!("Your Question: {question}"));
        surface.set_ask_enabled(state.phase() == SessionPhase::LoggedInIdle);
        question
    }

    /// Runs one ask -> fetch -> render cycle.
    ///
    /// Returns `Busy` without contacting the service when a request is
    /// already in flight for `state`. The call completes only after the
    /// answer has been typed out or the failure shown.
    #[instrument(
        name = "session_ask",
        skip_all,
        fields(residence = selection.residence(), destination = selection.destination())
    )]
    pub async fn ask<S>(
        &self,
        state: &SessionState,
        selection: &Selection,
        surface: &mut S,
    ) -> AskOutcome
    where
        S: DisplaySurface + ?Sized,
    {
        if !state.is_authenticated() {
            warn!("Ask rejected: session is not logged in");
            return AskOutcome::NotAuthenticated;
        }
        let Some(guard) = state.begin_processing() else {
            info!("Ask ignored: a request is already in flight");
            return AskOutcome::Busy;
        };

        surface.set_ask_enabled(false);
        surface.progress(PROGRESS_MESSAGE);

        let outcome = match self.responses.ask(&selection.question()).await {
            ResponseResult::Answer(text) => {
                surface.banner(Banner::Success(ANSWER_BANNER.to_string()));
                self.renderer.render(&text, surface).await;
                AskOutcome::Answered(text)
            }
            ResponseResult::Failure { kind, detail } => {
                surface.banner(Banner::Error(detail.clone()));
                AskOutcome::Failed { kind, detail }
            }
        };

        drop(guard);
        surface.set_ask_enabled(true);
        outcome
    }
}
