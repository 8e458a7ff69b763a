//! Scanner subprocess plumbing: spawning and bounded stderr capture.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ScanError;

const CHUNK_SIZE: usize = 4096;

/// Starts `program` with piped stdout and stderr and no stdin.
///
/// The child is killed if its handle is dropped.
pub fn spawn(program: &Path, args: &[String]) -> Result<Child, ScanError> {
    debug!("Spawning {} {}", program.display(), args.join(" "));

    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ScanError::Spawn {
            program: program.to_path_buf(),
            source,
        })
}

/// Captured stderr, bounded to `cap` bytes. Anything past the cap is counted but discarded.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuffer {
    bytes: Vec<u8>,
    cap: usize,
    truncated: bool,
}

impl DiagnosticBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
            truncated: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        let room: usize = self.cap.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Reads `reader` into a buffer capped at `cap` bytes, until the end of input or
/// until `stop` has fired and nothing more is ready.
pub async fn drain_stderr<R>(mut reader: R, cap: usize, stop: CancellationToken) -> DiagnosticBuffer
where
    R: AsyncRead + Unpin,
{
    let mut buffer: DiagnosticBuffer = DiagnosticBuffer::new(cap);
    let mut chunk: [u8; CHUNK_SIZE] = [0; CHUNK_SIZE];

    loop {
        tokio::select! {
            biased;
            read = reader.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => buffer.push(&chunk[..n]),
                Err(e) => {
                    warn!("Failed to read scanner diagnostics: {}", e);
                    break;
                }
            },
            _ = stop.cancelled() => break,
        }
    }

    if buffer.is_truncated() {
        debug!("Scanner diagnostics exceeded {} bytes and were truncated", cap);
    }
    buffer
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_everything_under_cap() {
        let mut buffer: DiagnosticBuffer = DiagnosticBuffer::new(16);
        buffer.push(b"Starting ");
        buffer.push(b"Nmap");
        assert_eq!(buffer.text(), "Starting Nmap");
        assert!(!buffer.is_truncated());
    }

    #[test]
    fn buffer_discards_bytes_past_cap() {
        let mut buffer: DiagnosticBuffer = DiagnosticBuffer::new(8);
        buffer.push(b"0123456789");
        buffer.push(b"abc");
        assert_eq!(buffer.text(), "01234567");
        assert!(buffer.is_truncated());
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let mut buffer: DiagnosticBuffer = DiagnosticBuffer::new(4);
        buffer.push(b"four");
        buffer.push(b"");
        assert!(!buffer.is_truncated());
    }

    #[tokio::test]
    async fn drain_reads_until_eof() {
        let input: &[u8] = b"You requested a scan type which requires root privileges.\n";
        let buffer: DiagnosticBuffer = drain_stderr(input, 1024, CancellationToken::new()).await;
        assert!(buffer.text().contains("requires root"));
    }

    #[tokio::test]
    async fn drain_caps_large_streams() {
        let input: Vec<u8> = vec![b'x'; CHUNK_SIZE * 3 + 17];
        let buffer: DiagnosticBuffer = drain_stderr(input.as_slice(), 100, CancellationToken::new()).await;
        assert_eq!(buffer.text().len(), 100);
        assert!(buffer.is_truncated());
    }

    #[tokio::test]
    async fn drain_stops_when_cancelled() {
        let (_writer, reader) = tokio::io::duplex(64);
        let stop: CancellationToken = CancellationToken::new();
        stop.cancel();
        let buffer: DiagnosticBuffer = drain_stderr(reader, 64, stop).await;
        assert!(buffer.text().is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let result = spawn(Path::new("/nonexistent/netry-scanner"), &[]);
        assert!(matches!(result, Err(ScanError::Spawn { .. })));
    }
}
