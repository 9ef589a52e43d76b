//! Copy text to the clipboard.
//!
//! Tries the system clipboard first; when that is unavailable (headless
//! sessions, SSH) falls back to an OSC 52 escape sequence, which most
//! terminal emulators forward to the local clipboard.

use std::io::Write;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::{error, info};

/// How the text reached the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    System,
    Osc52,
}

/// OSC 52 sequence setting the clipboard to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64.encode(text))
}

fn copy_system(text: &str) -> Result<(), arboard::Error> {
    arboard::Clipboard::new()?.set_text(text.to_string())
}

/// Copy `text`, writing the fallback sequence to `terminal` if needed.
pub fn copy_to_clipboard(text: &str, terminal: &mut impl Write) -> anyhow::Result<CopyMethod> {
    match copy_system(text) {
        Ok(()) => {
            info!("Copied to clipboard: {text}");
            Ok(CopyMethod::System)
        }
        Err(e) => {
            error!(error = %e, "Copy operation failed");
            info!("Trying secondary approach to copy");
            copy_osc52(text, terminal)
        }
    }
}

/// Hand `text` to the terminal emulator's clipboard through OSC 52.
pub fn copy_osc52(text: &str, terminal: &mut impl Write) -> anyhow::Result<CopyMethod> {
    let outcome = terminal
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|()| terminal.flush());
    match outcome {
        Ok(()) => {
            info!("Copy operation successful");
            Ok(CopyMethod::Osc52)
        }
        Err(e) => {
            error!(error = %e, "Copy operation failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenTerminal;

    impl Write for BrokenTerminal {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn osc52_encodes_base64() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn osc52_fallback_writes_sequence() {
        let mut out = Vec::new();
        let method = copy_osc52("https://forum.test/question/1/", &mut out).unwrap();
        assert_eq!(method, CopyMethod::Osc52);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            osc52_sequence("https://forum.test/question/1/")
        );
    }

    #[test]
    fn osc52_fallback_reports_write_error() {
        let err = copy_osc52("hi", &mut BrokenTerminal).unwrap_err();
        assert!(err.to_string().contains("terminal gone"));
    }
}
