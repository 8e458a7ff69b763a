//! # Nmap XML Report Decoder
//!
//! Turns the XML report written by `nmap -oX -` into [`HostRecord`]s **while the
//! scanner is still running**.
//!
//! The decoder is purely structural. It waits for the start of a `host` element,
//! decodes that subtree and drops everything else (scan info, run statistics).
//! The read buffer is cleared after each event, so memory use is bounded by a
//! single host no matter how large the report grows.
//!
//! Failure handling:
//! * A report that stops in the middle of a `host` (the scanner was killed) ends
//!   the stream cleanly. The unfinished host is discarded.
//! * A host that cannot be decoded is skipped. A [`HostDecodeError`] is recorded
//!   and decoding resumes at the next `host` start tag.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tokio::io::AsyncBufRead;
use tracing::{debug, error, warn};

use netry_common::network::host::{Address, HostRecord, PortRecord, Protocol};
use netry_common::scan::HostDecodeError;

const HOST: &[u8] = b"host";
const PORT: &[u8] = b"port";

/// A lazy, finite and non-restartable sequence of hosts read from a report.
pub struct HostStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    errors: Vec<HostDecodeError>,
    /// Syntax error raised inside a host, held back until we know whether
    /// the report was merely truncated.
    deferred: Option<HostDecodeError>,
    last_fault_at: Option<u64>,
    finished: bool,
}

enum Step {
    Continue,
    Emit(HostRecord),
    Skip(String),
    Syntax(String),
    Eof,
}

impl<R: AsyncBufRead + Unpin> HostStream<R> {
    pub fn new(inner: R) -> Self {
        let mut reader: Reader<R> = Reader::from_reader(inner);
        reader.config_mut().trim_text(true);

        Self {
            reader,
            buf: Vec::new(),
            errors: Vec::new(),
            deferred: None,
            last_fault_at: None,
            finished: false,
        }
    }

    /// Reads until the next complete host, or `None` once the report has ended.
    pub async fn next_host(&mut self) -> Option<HostRecord> {
        if self.finished {
            return None;
        }

        let mut pending: Option<PendingHost> = None;

        loop {
            self.buf.clear();
            let step: Step = match self.reader.read_event_into_async(&mut self.buf).await {
                Ok(Event::Eof) => Step::Eof,
                Ok(Event::Start(element)) => open_element(&mut pending, &element, false),
                Ok(Event::Empty(element)) => open_element(&mut pending, &element, true),
                Ok(Event::End(element)) => close_element(&mut pending, element.local_name().as_ref()),
                Ok(_) => Step::Continue,
                Err(err) => Step::Syntax(err.to_string()),
            };
            let position: u64 = self.reader.buffer_position() as u64;

            let stalled: bool = matches!(step, Step::Syntax(_)) && self.last_fault_at == Some(position);

            if let Some(fault) = self.deferred.take() {
                if matches!(step, Step::Eof) || stalled {
                    debug!("Report truncated inside a host element: {}", fault.reason);
                } else {
                    self.record(fault);
                }
            }

            match step {
                Step::Continue => {}
                Step::Emit(host) => return Some(host),
                Step::Skip(reason) => self.record(HostDecodeError { position, reason }),
                Step::Syntax(reason) => {
                    if stalled {
                        error!("XML reader is stuck at byte {position}, giving up on the report");
                        self.finished = true;
                        return None;
                    }
                    self.last_fault_at = Some(position);

                    if pending.take().is_some() {
                        self.deferred = Some(HostDecodeError { position, reason });
                    } else {
                        warn!("Ignoring malformed report markup at byte {position}: {reason}");
                    }
                }
                Step::Eof => {
                    if pending.is_some() {
                        debug!("Report ended inside a host element at byte {position}, discarding it");
                    }
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    pub fn into_errors(self) -> Vec<HostDecodeError> {
        self.errors
    }

    fn record(&mut self, fault: HostDecodeError) {
        error!("{fault}");
        self.errors.push(fault);
    }
}

/// Decodes a whole report. Mostly useful for reports that are already in memory.
pub async fn decode_all<R: AsyncBufRead + Unpin>(inner: R) -> (Vec<HostRecord>, Vec<HostDecodeError>) {
    let mut stream: HostStream<R> = HostStream::new(inner);
    let mut hosts: Vec<HostRecord> = Vec::new();
    while let Some(host) = stream.next_host().await {
        hosts.push(host);
    }
    (hosts, stream.into_errors())
}

fn open_element(pending: &mut Option<PendingHost>, element: &BytesStart<'_>, empty: bool) -> Step {
    if let Some(host) = pending.as_mut() {
        host.open(element, empty);
        return Step::Continue;
    }

    if element.local_name().as_ref() != HOST {
        return Step::Continue;
    }
    if empty {
        return PendingHost::default().finish();
    }

    *pending = Some(PendingHost::default());
    Step::Continue
}

fn close_element(pending: &mut Option<PendingHost>, name: &[u8]) -> Step {
    let Some(host) = pending else {
        return Step::Continue;
    };

    if host.depth > 0 {
        host.close(name);
        return Step::Continue;
    }

    match pending.take() {
        Some(host) => host.finish(),
        None => Step::Continue,
    }
}

/// The host being decoded. `depth` counts open elements below `host`.
#[derive(Default)]
struct PendingHost {
    record: HostRecord,
    port: Option<PendingPort>,
    depth: usize,
    fault: Option<String>,
}

struct PendingPort {
    port: u16,
    protocol: Protocol,
    state: Option<String>,
    service: Option<String>,
}

impl PendingHost {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) {
        let name = element.local_name();

        let result: Result<(), String> = match name.as_ref() {
            b"status" => attribute(element, "state").map(|state| self.record.status = state),
            b"address" => self.add_address(element),
            b"hostname" => attribute(element, "name").map(|name| self.record.hostnames.extend(name)),
            PORT => self.open_port(element),
            b"state" => self.set_port_state(element),
            b"service" => self.set_port_service(element),
            _ => Ok(()),
        };

        if let Err(reason) = result {
            self.fault.get_or_insert(reason);
        }

        if !empty {
            self.depth += 1;
        } else if name.as_ref() == PORT {
            self.close_port();
        }
    }

    fn close(&mut self, name: &[u8]) {
        self.depth -= 1;
        if name == PORT {
            self.close_port();
        }
    }

    fn finish(self) -> Step {
        if let Some(reason) = self.fault {
            return Step::Skip(reason);
        }
        if self.record.addresses.is_empty() {
            return Step::Skip("host has no address".to_string());
        }
        Step::Emit(self.record)
    }

    fn add_address(&mut self, element: &BytesStart<'_>) -> Result<(), String> {
        let addr: String = required(element, "addr")?;
        let addr_type: String = attribute(element, "addrtype")?.unwrap_or_else(|| "ipv4".to_string());
        self.record.addresses.push(Address { addr, addr_type });
        Ok(())
    }

    fn open_port(&mut self, element: &BytesStart<'_>) -> Result<(), String> {
        let portid: String = required(element, "portid")?;
        let port: u16 = portid
            .parse()
            .map_err(|_| format!("invalid port number '{portid}'"))?;
        let protocol: Protocol = required(element, "protocol")?.parse()?;

        self.port = Some(PendingPort {
            port,
            protocol,
            state: None,
            service: None,
        });
        Ok(())
    }

    fn set_port_state(&mut self, element: &BytesStart<'_>) -> Result<(), String> {
        if let Some(port) = self.port.as_mut() {
            port.state = Some(required(element, "state")?);
        }
        Ok(())
    }

    fn set_port_service(&mut self, element: &BytesStart<'_>) -> Result<(), String> {
        if let Some(port) = self.port.as_mut() {
            port.service = attribute(element, "name")?;
        }
        Ok(())
    }

    fn close_port(&mut self) {
        let Some(port) = self.port.take() else {
            return;
        };

        match port.state {
            Some(state) => self.record.ports.push(PortRecord {
                port: port.port,
                protocol: port.protocol,
                state,
                service: port.service,
            }),
            None => {
                self.fault
                    .get_or_insert(format!("port {}/{} has no state", port.port, port.protocol));
            }
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    match element.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|value| Some(value.into_owned()))
            .map_err(|err| format!("invalid '{name}' attribute: {err}")),
        Ok(None) => Ok(None),
        Err(err) => Err(format!("invalid attributes: {err}")),
    }
}

fn required(element: &BytesStart<'_>, name: &str) -> Result<String, String> {
    attribute(element, name)?.ok_or_else(|| {
        let element_name = element.local_name();
        format!(
            "<{}> is missing the '{name}' attribute",
            String::from_utf8_lossy(element_name.as_ref())
        )
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
