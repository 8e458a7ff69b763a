//! Keyboard abort: 'q' or Ctrl-C on the terminal cancels the running scan.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Listens for abort keys while alive. Raw mode is left again on drop.
pub struct InputHandle {
    done: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// Starts listening when stdin is a terminal; otherwise returns `None`.
    pub fn start(cancel: CancellationToken) -> Option<Self> {
        if !io::stdin().is_terminal() {
            return None;
        }

        if let Err(e) = enable_raw_mode() {
            warn!("Keyboard abort unavailable: {}", e);
            return None;
        }

        let done: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        let done_ref: Arc<AtomicBool> = done.clone();

        let thread: JoinHandle<()> = thread::spawn(move || {
            while !done_ref.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }

                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q: bool = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c: bool = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        debug!("Abort requested from the keyboard");
                        cancel.cancel();
                        break;
                    }
                }
            }
        });

        Some(Self {
            done,
            thread: Some(thread),
        })
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        let _ = disable_raw_mode();
    }
}
