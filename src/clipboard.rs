use anyhow::{Result, anyhow};
use cli_clipboard::{ClipboardContext, ClipboardProvider};

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard. Opened per copy so a missing display only fails `/copy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new()
            .map_err(|err| anyhow!("Failed to open system clipboard: {err}"))?;
        ctx.set_contents(text.to_string())
            .map_err(|err| anyhow!("Failed to write to system clipboard: {err}"))
    }
}
