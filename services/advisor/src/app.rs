//! Terminal session host: startup wiring plus the login -> pick -> ask loop.

use crate::{
    config::Config,
    terminal::{LineInput, TerminalSurface},
};
use advisor_core::{
    AskOutcome, Authenticator, Banner, Credentials, DisplaySurface, LoginOutcome, ReferenceList,
    ReferenceListError, ResponseService, Selection, SessionController, SessionState,
    TypingRenderer,
    llm_client::LLMClient,
    reference::{BuiltinCountries, FileReferenceSource},
    session::{DESTINATION_LABEL, RESIDENCE_LABEL},
    typing::TokioDelay,
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::{io::Write, sync::Arc};
use tokio::io::AsyncBufRead;
use tracing::{info, instrument, warn};

const ASK_PROMPT: &str = "Ask? [Y/n/q]:";

/// Produces the reference list once, from the configured file or the
/// built-in country names.
pub fn load_references(config: &Config) -> Result<ReferenceList, ReferenceListError> {
    match &config.reference_list_path {
        Some(path) => ReferenceList::load(&FileReferenceSource::new(path)),
        None => ReferenceList::load(&BuiltinCountries),
    }
}

pub fn build_controller(config: &Config, client: Arc<dyn LLMClient>) -> SessionController {
    let credentials = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );
    SessionController::new(
        Arc::new(Authenticator::new(credentials)),
        ResponseService::new(client),
        TypingRenderer::new(Arc::new(TokioDelay), config.typing_delay),
    )
}

/// Loads the reference list and serves one session. A reference list
/// failure returns before anything is drawn.
pub async fn start<R, W>(
    config: &Config,
    client: Arc<dyn LLMClient>,
    input: &mut LineInput<R>,
    surface: &mut TerminalSurface<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let references = load_references(config).context("Failed to load reference list")?;
    let host = SessionHost::new(build_controller(config, client), references);
    host.run(input, surface).await
}

pub struct SessionHost {
    controller: SessionController,
    references: ReferenceList,
}

impl SessionHost {
    pub fn new(controller: SessionController, references: ReferenceList) -> Self {
        Self {
            controller,
            references,
        }
    }

    /// Runs one session until the user quits or input ends.
    #[instrument(name = "terminal_session", skip_all)]
    pub async fn run<R, W>(
        &self,
        input: &mut LineInput<R>,
        surface: &mut TerminalSurface<W>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        let state = SessionState::new();

        if !self.login(&state, input, surface).await? {
            info!("Input closed before login");
            return Ok(());
        }

        let mut selection = self.references.default_selection();
        loop {
            let Some(residence) = self
                .pick(RESIDENCE_LABEL, selection.residence(), input, surface)
                .await?
            else {
                break;
            };
            selection = selection.with_residence(residence);

            let Some(destination) = self
                .pick(DESTINATION_LABEL, selection.destination(), input, surface)
                .await?
            else {
                break;
            };
            selection = selection.with_destination(destination);

            self.controller
                .show_question_page(&state, &selection, surface);
            if !surface.ask_enabled() {
                continue;
            }

            surface.prompt(ASK_PROMPT);
            let Some(answer) = input.next_line().await? else {
                break;
            };
            match answer.trim().to_lowercase().as_str() {
                "q" | "quit" => break,
                "n" | "no" => continue,
                _ => {
                    self.ask(&state, &selection, surface).await;
                }
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Shows the login form until a submission succeeds. Returns false if
    /// input ends first.
    async fn login<R, W>(
        &self,
        state: &SessionState,
        input: &mut LineInput<R>,
        surface: &mut TerminalSurface<W>,
    ) -> Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        loop {
            self.controller.show_login_page(surface);
            surface.prompt("Username:");
            let Some(username) = input.next_line().await? else {
                return Ok(false);
            };
            surface.prompt("Password:");
            let Some(password) = input.next_line().await? else {
                return Ok(false);
            };

            match self.controller.login(state, &username, &password, surface) {
                LoginOutcome::Authenticated | LoginOutcome::AlreadyAuthenticated => {
                    return Ok(true);
                }
                LoginOutcome::Rejected => {}
            }
        }
    }

    /// Reads one picker value. Enter keeps `current`, `?` lists the options.
    async fn pick<R, W>(
        &self,
        label: &str,
        current: &str,
        input: &mut LineInput<R>,
        surface: &mut TerminalSurface<W>,
    ) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        loop {
            surface.prompt(&format!("{label} [{current}]"));
            let Some(line) = input.next_line().await? else {
                return Ok(None);
            };
            let query = line.trim();

            if query.is_empty() {
                return Ok(Some(current.to_string()));
            }
            if query == "?" {
                surface.options(self.references.list());
                continue;
            }
            match self.references.resolve(query) {
                Some(name) => return Ok(Some(name.to_string())),
                None => surface.banner(Banner::Error(format!(
                    "No match for '{}'. Enter a name, a number from 1 to {}, or ? to list them.",
                    query,
                    self.references.len()
                ))),
            }
        }
    }

    async fn ask<W>(
        &self,
        state: &SessionState,
        selection: &Selection,
        surface: &mut TerminalSurface<W>,
    ) where
        W: Write + Send,
    {
        match self.controller.ask(state, selection, surface).await {
            AskOutcome::Answered(answer) => info!(answer_len = answer.len(), "Answer shown"),
            AskOutcome::Failed { kind, .. } => info!(?kind, "Failure shown"),
            AskOutcome::Busy => info!("Ask ignored while a request is in flight"),
            AskOutcome::NotAuthenticated => warn!("Ask attempted before login"),
        }
    }
}
