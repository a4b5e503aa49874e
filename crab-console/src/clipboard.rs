//! Clipboard access for copying scan links

use crate::{ClientError, ClientResult};

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> ClientResult<()>;
}

/// In-process clipboard, for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> ClientResult<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// The desktop session's clipboard
///
/// On Linux the X11 and Wayland clipboards are served by the owning process,
/// so `set_text` blocks until another program takes the clipboard over.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> ClientResult<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| ClientError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn set_text(&mut self, text: &str) -> ClientResult<()> {
        use arboard::SetExtLinux;

        self.inner
            .set()
            .wait()
            .text(text)
            .map_err(|e| ClientError::Clipboard(e.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&mut self, text: &str) -> ClientResult<()> {
        self.inner
            .set_text(text)
            .map_err(|e| ClientError::Clipboard(e.to_string()))
    }
}

/// Always refuses; stands in for a denied clipboard permission
#[derive(Debug, Default)]
pub struct DeniedClipboard;

impl Clipboard for DeniedClipboard {
    fn set_text(&mut self, _text: &str) -> ClientResult<()> {
        Err(ClientError::Clipboard("access denied".to_string()))
    }
}
