use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ConsoleLevel {
    Debug,
    Log,
    Warn,
    Error,
}

fn console_level(level: &Level) -> ConsoleLevel {
    if *level == Level::ERROR {
        ConsoleLevel::Error
    } else if *level == Level::WARN {
        ConsoleLevel::Warn
    } else if *level == Level::INFO {
        ConsoleLevel::Log
    } else {
        ConsoleLevel::Debug
    }
}

/// One formatted event, trailing newline stripped. `None` for blank output.
fn finish_line(buf: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

/// Buffers one formatted event and hands it to the browser console on drop.
pub struct ConsoleWriter {
    level: ConsoleLevel,
    buf: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = finish_line(&self.buf) else {
            return;
        };
        let line = JsValue::from_str(&line);
        match self.level {
            ConsoleLevel::Debug => web_sys::console::debug_1(&line),
            ConsoleLevel::Log => web_sys::console::log_1(&line),
            ConsoleLevel::Warn => web_sys::console::warn_1(&line),
            ConsoleLevel::Error => web_sys::console::error_1(&line),
        }
    }
}

/// Routes `tracing` output from the library crates to `console.*`, picking
/// the console method from the event level.
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::Log,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: console_level(meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Installs the console subscriber. Later calls are no-ops.
pub fn init() {
    // Wall-clock time is unavailable to std on wasm32-unknown-unknown.
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .try_init();
}
