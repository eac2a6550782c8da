/// A transient status message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// The presentation layer the session renders into.
///
/// Input (credential form, pickers, the ask trigger) is collected by the host
/// and handed to the `SessionController`; this trait only covers output.
pub trait DisplaySurface: Send {
    /// Starts a new page with the given title.
    fn title(&mut self, title: &str);
    /// A line of static body text.
    fn text(&mut self, text: &str);
    fn banner(&mut self, banner: Banner);
    /// A spinner-style message shown while a request is outstanding.
    fn progress(&mut self, message: &str);
    /// Enables or disables the ask trigger.
    fn set_ask_enabled(&mut self, enabled: bool);
    /// Replaces the whole answer region with `content`.
    fn replace_answer(&mut self, content: &str);
}
