//! Console logging for every extension context

use std::io::{self, Write};
use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Route panics and `tracing` events to the DevTools console
pub fn init() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();

        let level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleWriter::default)
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .try_init();
    });
}

/// Buffers one formatted event and logs it when dropped
#[derive(Default)]
struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
    }
}
