//! ANSI escape stripping for probed prompt text.
//!
//! Device prompts frequently arrive wrapped in color and cursor control
//! sequences. Prompt classification only cares about the printable
//! text, so raw probe output is run through a terminal parser that
//! keeps printable characters and line breaks and drops every escape
//! sequence.

use vte::{Params, Parser, Perform};

/// Strip ANSI escape sequences from `data`, keeping printable text,
/// newlines, carriage returns, and tabs.
pub(crate) fn strip(data: &[u8]) -> Vec<u8> {
    let mut plain = Plain::default();
    let mut parser = Parser::new();
    parser.advance(&mut plain, data);
    plain.out
}

/// Performer that collects printable output and ignores every dispatch.
#[derive(Default)]
struct Plain {
    out: Vec<u8>,
}

impl Perform for Plain {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        // Keep the control bytes that shape lines
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}
    fn put(&mut self, _byte: u8) {}
    fn unhook(&mut self) {}
    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}
    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }
    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip(b"router#"), b"router#");
    }

    #[test]
    fn test_color_codes_stripped() {
        assert_eq!(strip(b"\x1b[32mrouter#\x1b[0m"), b"router#");
    }

    #[test]
    fn test_cursor_controls_stripped() {
        assert_eq!(strip(b"\x1b[2Jrouter\x1b[1A(config)#"), b"router(config)#");
    }

    #[test]
    fn test_osc_title_stripped() {
        assert_eq!(strip(b"\x1b]0;session\x07router#"), b"router#");
    }

    #[test]
    fn test_line_breaks_kept() {
        assert_eq!(
            strip(b"show version\r\n\x1b[1mCisco IOS\x1b[0m\nrouter#"),
            b"show version\r\nCisco IOS\nrouter#"
        );
    }

    #[test]
    fn test_other_control_bytes_dropped() {
        assert_eq!(strip(b"rou\x07ter\x08#"), b"router#");
    }
}
