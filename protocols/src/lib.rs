//! # Netry Protocols
//!
//! Decoders for the formats exchanged with the external scanner.
//!
//! * **[`nmap_xml`]**: incremental decoding of the XML report streamed on the scanner's stdout.

pub mod nmap_xml;
