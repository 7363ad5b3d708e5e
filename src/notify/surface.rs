use anyhow::Result;

/// What the incoming-call dialog displays. Missing caller/lead fields are
/// rendered as "Unknown" before this is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationContent {
    pub title: String,
    pub caller_number: String,
    pub lead_name: String,
    /// Whether the details control leads anywhere.
    pub has_details: bool,
}

/// A constructed, showable notification dialog. Dropping the handle releases
/// the underlying resource.
pub trait Presentation: Send {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Constructs notification dialogs.
pub trait PresentationSurface: Send {
    fn create(&self, content: PresentationContent) -> Box<dyn Presentation>;
}

/// A looping ringtone. `play` may fail; the caller logs and carries on
/// without sound.
pub trait AudibleAlert: Send {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    /// Rewind to the start so the resource is fully released, not merely
    /// paused, before it is discarded.
    fn reset(&mut self);
}

/// Constructs audible alerts from a resource locator.
pub trait AlertSurface: Send {
    fn create(&self, locator: &str) -> Box<dyn AudibleAlert>;
}

/// Routes the user's view to a CRM record.
pub trait Navigator: Send {
    fn open_record(&self, doctype: &str, name: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Green,
    Orange,
    Red,
    Blue,
}

/// Transient user-visible notices (the CRM's toast alerts).
pub trait NoticeSink: Send {
    fn notice(&self, message: &str, indicator: Indicator);
}
