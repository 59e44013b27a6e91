use crate::utils::KitError;

/// Host clipboard access. One-shot modes fall back to the clipboard when no
/// text argument is given, and interactive modes copy each reply out.
pub trait ClipboardSource {
    fn read(&self) -> Result<String, KitError>;
    fn write(&self, text: &str) -> Result<(), KitError>;
}

/// System clipboard backed by `arboard`. A fresh handle is opened per call;
/// on headless hosts every call fails with `ClipboardUnavailable`.
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read(&self) -> Result<String, KitError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| KitError::ClipboardUnavailable(e.to_string()))?;
        clipboard
            .get_text()
            .map_err(|e| KitError::ClipboardUnavailable(e.to_string()))
    }

    fn write(&self, text: &str) -> Result<(), KitError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| KitError::ClipboardUnavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| KitError::ClipboardUnavailable(e.to_string()))
    }
}
