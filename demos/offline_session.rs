//! Runs one scripted session against a canned answer, no network needed.
//!
//! cargo run --example offline_session

use advisor_core::{
    Authenticator, Banner, Credentials, DisplaySurface, ReferenceList, ResponseService,
    SessionController, SessionState, TypingRenderer,
    llm_client::{CompletionRequest, LLMClient, ProviderFault},
    reference::BuiltinCountries,
    typing::{DEFAULT_WORD_DELAY, TokioDelay},
};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;

struct CannedClient;

#[async_trait]
impl LLMClient for CannedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderFault> {
        tracing::info!(question = %request.user_message, "Canned client asked");
        Ok("Donations abroad are usually not deductible unless a tax treaty \
            or a recognised local intermediary applies. Expect 0% relief by default."
            .to_string())
    }
}

/// Prints everything, redrawing the answer line on each replacement.
struct StdoutSurface;

impl DisplaySurface for StdoutSurface {
    fn title(&mut self, title: &str) {
        println!("\n# {title}");
    }

    fn text(&mut self, text: &str) {
        println!("{text}");
    }

    fn banner(&mut self, banner: Banner) {
        match banner {
            Banner::Success(message) => println!("[ok] {message}"),
            Banner::Error(message) => println!("[error] {message}"),
        }
    }

    fn progress(&mut self, message: &str) {
        println!("... {message}");
    }

    fn set_ask_enabled(&mut self, enabled: bool) {
        if enabled {
            println!();
        }
    }

    fn replace_answer(&mut self, content: &str) {
        print!("\r{content}");
        let _ = std::io::stdout().flush();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let references = ReferenceList::load(&BuiltinCountries)?;
    let controller = SessionController::new(
        Arc::new(Authenticator::new(Credentials::new("demo", "demo"))),
        ResponseService::new(Arc::new(CannedClient)),
        TypingRenderer::new(Arc::new(TokioDelay), DEFAULT_WORD_DELAY),
    );

    let state = SessionState::new();
    let mut surface = StdoutSurface;

    controller.show_login_page(&mut surface);
    controller.login(&state, "demo", "wrong", &mut surface);
    controller.login(&state, "demo", "demo", &mut surface);

    let selection = references
        .default_selection()
        .with_destination(references.resolve("germany").unwrap_or("Germany"));
    controller.show_question_page(&state, &selection, &mut surface);
    let outcome = controller.ask(&state, &selection, &mut surface).await;
    println!("outcome: {outcome:?}, phase: {:?}", state.phase());
    Ok(())
}
