//! Line-oriented exchange format.
//!
//! One block per event:
//!
//! ```text
//! E <event_number> <vertex_count> <particle_count>
//! T <version_name> <version_index>
//! V <barcode> [<in1>,<in2>,...]            (+ " @ <x> <y> <z> <t>" when positioned)
//! P <barcode> <production_ref> <pdg_id> <px> <py> <pz> <e> <mass> <status>
//! ```
//!
//! Particles are emitted in creation order. A vertex line is emitted just
//! before the first particle it produces, tracked by a running minimum
//! over vertex barcodes (initialized to 0; vertex barcodes are negative).
//! Floating fields use scientific notation with configurable precision.
//! The read side inverts this grammar exactly.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::event::Event;
use crate::model::{FourVector, Particle, ParticleId, Vertex, VertexId};
use crate::{Error, Result};

use super::buffer::WriteBuffer;
use super::{EventIo, IoMode};

/// Default significant digits for floating fields.
pub const DEFAULT_PRECISION: usize = 16;
/// Cap keeping any single field inside the buffer's headroom bound.
pub const MAX_PRECISION: usize = 24;

enum Stream {
    Writer(Box<dyn Write>),
    Reader(Box<dyn BufRead>),
}

/// The line-oriented codec. One instance per stream, one direction each.
pub struct TextIo {
    stream: Stream,
    buffer: WriteBuffer,
    precision: usize,
    failed: bool,
    closed: bool,
    line_no: usize,
    /// Header line of the next block, read while finishing the previous one.
    lookahead: Option<String>,
}

impl TextIo {
    /// Open a file-backed stream in the given direction.
    pub fn open(path: impl AsRef<Path>, mode: IoMode) -> Result<Self> {
        match mode {
            IoMode::Write => Ok(Self::from_writer(File::create(path)?)),
            IoMode::Read => Ok(Self::from_reader(BufReader::new(File::open(path)?))),
        }
    }

    /// Write-mode codec over any byte sink.
    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self::with_stream(Stream::Writer(Box::new(writer)))
    }

    /// Read-mode codec over any buffered byte source.
    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self::with_stream(Stream::Reader(Box::new(reader)))
    }

    fn with_stream(stream: Stream) -> Self {
        Self {
            stream,
            buffer: WriteBuffer::new(),
            precision: DEFAULT_PRECISION,
            failed: false,
            closed: false,
            line_no: 0,
            lookahead: None,
        }
    }

    /// Significant digits for floating fields, capped at [`MAX_PRECISION`].
    pub fn with_precision(mut self, digits: usize) -> Self {
        self.precision = digits.min(MAX_PRECISION);
        self
    }

    pub fn mode(&self) -> IoMode {
        match self.stream {
            Stream::Writer(_) => IoMode::Write,
            Stream::Reader(_) => IoMode::Read,
        }
    }

    // ========================================================================
    // Write side
    // ========================================================================

    fn write_event_block(&mut self, event: &Event) -> io::Result<()> {
        let precision = self.precision;
        let Stream::Writer(out) = &mut self.stream else { return Ok(()) };
        let out = out.as_mut();
        let buf = &mut self.buffer;

        buf.push_field(out, format_args!(
            "E {} {} {}\n",
            event.event_number(),
            event.vertices_count(),
            event.particles_count(),
        ))?;

        let version_name = event.versions().first().map_or("Version", |v| v.name());
        buf.push_str(out, &format!("T {version_name} 0\n"))?;

        let mut lowest_vertex = 0i32;
        for particle in event.particles() {
            let mut production_ref = 0i32;
            if let Some(vertex_id) = particle.production_vertex {
                production_ref = vertex_id.0;
                if vertex_id.0 < lowest_vertex {
                    if let Some(vertex) = event.vertex(vertex_id) {
                        write_vertex_line(buf, out, precision, vertex)?;
                    }
                }
                lowest_vertex = vertex_id.0;
            }
            write_particle_line(buf, out, precision, particle, production_ref)?;
        }

        Ok(())
    }

    // ========================================================================
    // Read side
    // ========================================================================

    fn read_event_block(&mut self, event: &mut Event) -> Result<bool> {
        // Locate the next header, honoring lookahead from the previous block.
        let header = loop {
            let Some(line) = self.next_line()? else { return Ok(false) };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match text.split_whitespace().next() {
                Some("E") => break self.parse_header(text)?,
                _ => return Err(self.parse_error("expected event header")),
            }
        };
        event.set_event_number(header.event_number);

        // Incoming-particle lists refer forward; resolve after the block.
        let mut end_links: Vec<(VertexId, Vec<ParticleId>)> = Vec::new();

        loop {
            let Some(line) = self.next_line()? else { break };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match text.split_whitespace().next().unwrap_or("") {
                "E" => {
                    self.lookahead = Some(text.to_string());
                    break;
                }
                "T" => self.parse_version_line(text, event)?,
                "V" => {
                    let links = self.parse_vertex_line(text, event)?;
                    end_links.push(links);
                }
                "P" => self.parse_particle_line(text, event)?,
                other => {
                    return Err(self.parse_error(format!("unknown record tag '{other}'")));
                }
            }
        }

        for (vertex, incoming) in end_links {
            for particle in incoming {
                event.add_incoming(vertex, particle).map_err(|_| {
                    self.parse_error(format!(
                        "incoming particle {particle} of vertex {vertex} is not in this event"
                    ))
                })?;
            }
        }

        if event.vertices_count() != header.vertex_count
            || event.particles_count() != header.particle_count
        {
            tracing::debug!(
                declared_vertices = header.vertex_count,
                declared_particles = header.particle_count,
                "header counts differ from parsed block"
            );
        }

        Ok(true)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.lookahead.take() {
            return Ok(Some(line));
        }
        let Stream::Reader(reader) = &mut self.stream else { return Ok(None) };
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(line))
    }

    fn parse_error(&self, message: impl Into<String>) -> Error {
        Error::ParseError { line: self.line_no, message: message.into() }
    }

    fn parse_num<T: std::str::FromStr>(&self, token: Option<&str>, what: &str) -> Result<T> {
        let token = token.ok_or_else(|| self.parse_error(format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| self.parse_error(format!("malformed {what}: '{token}'")))
    }

    fn parse_header(&self, text: &str) -> Result<BlockHeader> {
        let mut tokens = text.split_whitespace();
        tokens.next(); // "E"
        Ok(BlockHeader {
            event_number: self.parse_num(tokens.next(), "event number")?,
            vertex_count: self.parse_num(tokens.next(), "vertex count")?,
            particle_count: self.parse_num(tokens.next(), "particle count")?,
        })
    }

    fn parse_version_line(&self, text: &str, event: &mut Event) -> Result<()> {
        let mut tokens = text.split_whitespace();
        tokens.next(); // "T"
        let name = tokens
            .next()
            .ok_or_else(|| self.parse_error("missing version name"))?;
        let _index: usize = self.parse_num(tokens.next(), "version index")?;
        event.set_version_name(0, name);
        Ok(())
    }

    fn parse_vertex_line(
        &self,
        text: &str,
        event: &mut Event,
    ) -> Result<(VertexId, Vec<ParticleId>)> {
        let mut tokens = text.split_whitespace();
        tokens.next(); // "V"
        let barcode: i32 = self.parse_num(tokens.next(), "vertex barcode")?;

        let bracket = tokens
            .next()
            .ok_or_else(|| self.parse_error("missing incoming list"))?;
        let inner = bracket
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| self.parse_error(format!("malformed incoming list: '{bracket}'")))?;
        let mut incoming = Vec::new();
        if !inner.is_empty() {
            for part in inner.split(',') {
                let id: i32 = part.parse().map_err(|_| {
                    self.parse_error(format!("malformed incoming barcode: '{part}'"))
                })?;
                incoming.push(ParticleId(id));
            }
        }

        let position = match tokens.next() {
            None => FourVector::zero(),
            Some("@") => FourVector::new(
                self.parse_num(tokens.next(), "vertex x")?,
                self.parse_num(tokens.next(), "vertex y")?,
                self.parse_num(tokens.next(), "vertex z")?,
                self.parse_num(tokens.next(), "vertex t")?,
            ),
            Some(other) => {
                return Err(self.parse_error(format!("unexpected token '{other}'")));
            }
        };

        let id = event
            .insert_vertex(barcode, position)
            .map_err(|err| self.parse_error(err.to_string()))?;
        Ok((id, incoming))
    }

    fn parse_particle_line(&self, text: &str, event: &mut Event) -> Result<()> {
        let mut tokens = text.split_whitespace();
        tokens.next(); // "P"
        let barcode: i32 = self.parse_num(tokens.next(), "particle barcode")?;
        let production_ref: i32 = self.parse_num(tokens.next(), "production reference")?;
        let pdg_id: i32 = self.parse_num(tokens.next(), "particle type")?;
        let momentum = FourVector::new(
            self.parse_num(tokens.next(), "momentum px")?,
            self.parse_num(tokens.next(), "momentum py")?,
            self.parse_num(tokens.next(), "momentum pz")?,
            self.parse_num(tokens.next(), "momentum e")?,
        );
        let generated_mass: f64 = self.parse_num(tokens.next(), "generated mass")?;
        let status: i32 = self.parse_num(tokens.next(), "status")?;

        let id = event
            .insert_particle(barcode, pdg_id, momentum, generated_mass, status)
            .map_err(|err| self.parse_error(err.to_string()))?;
        if production_ref != 0 {
            // The writer emits a vertex before its first outgoing particle,
            // so the reference must already resolve.
            event.add_outgoing(VertexId(production_ref), id).map_err(|_| {
                self.parse_error(format!("production vertex {production_ref} precedes no V record"))
            })?;
        }
        Ok(())
    }
}

struct BlockHeader {
    event_number: i32,
    vertex_count: usize,
    particle_count: usize,
}

fn write_vertex_line(
    buf: &mut WriteBuffer,
    out: &mut dyn Write,
    precision: usize,
    vertex: &Vertex,
) -> io::Result<()> {
    buf.push_field(out, format_args!("V {} [", vertex.id))?;
    for (i, id) in vertex.particles_in.iter().enumerate() {
        if i == 0 {
            buf.push_field(out, format_args!("{id}"))?;
        } else {
            buf.push_field(out, format_args!(",{id}"))?;
        }
    }
    if vertex.has_position() {
        let pos = &vertex.position;
        buf.push_field(out, format_args!("] @ {:.precision$e}", pos.x))?;
        buf.push_field(out, format_args!(" {:.precision$e}", pos.y))?;
        buf.push_field(out, format_args!(" {:.precision$e}", pos.z))?;
        buf.push_field(out, format_args!(" {:.precision$e}\n", pos.t))?;
    } else {
        buf.push_field(out, format_args!("]\n"))?;
    }
    Ok(())
}

fn write_particle_line(
    buf: &mut WriteBuffer,
    out: &mut dyn Write,
    precision: usize,
    particle: &Particle,
    production_ref: i32,
) -> io::Result<()> {
    buf.push_field(out, format_args!("P {}", particle.id))?;
    buf.push_field(out, format_args!(" {production_ref}"))?;
    buf.push_field(out, format_args!(" {}", particle.pdg_id))?;
    buf.push_field(out, format_args!(" {:.precision$e}", particle.momentum.px()))?;
    buf.push_field(out, format_args!(" {:.precision$e}", particle.momentum.py()))?;
    buf.push_field(out, format_args!(" {:.precision$e}", particle.momentum.pz()))?;
    buf.push_field(out, format_args!(" {:.precision$e}", particle.momentum.e()))?;
    buf.push_field(out, format_args!(" {:.precision$e}", particle.generated_mass))?;
    buf.push_field(out, format_args!(" {}\n", particle.status))?;
    Ok(())
}

// ============================================================================
// EventIo impl
// ============================================================================

impl EventIo for TextIo {
    fn write_event(&mut self, event: &Event) {
        if self.closed || self.failed {
            return;
        }
        if !matches!(self.stream, Stream::Writer(_)) {
            tracing::warn!("attempting to write to an input stream");
            return;
        }
        if !self.buffer.allocate() {
            self.failed = true;
            return;
        }
        if let Err(err) = self.write_event_block(event) {
            tracing::error!(error = %err, "event write failed");
            self.failed = true;
        }
    }

    fn fill_next_event(&mut self, event: &mut Event) -> bool {
        if self.closed || self.failed {
            return false;
        }
        if !matches!(self.stream, Stream::Reader(_)) {
            tracing::warn!("attempting to read from an output stream");
            return false;
        }
        match self.read_event_block(event) {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(error = %err, "event parse failed");
                self.failed = true;
                false
            }
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Stream::Writer(out) = &mut self.stream {
            tracing::debug!(pending = self.buffer.pending(), "closing event stream");
            if let Err(err) = self.buffer.forced_flush(out.as_mut()).and_then(|()| out.flush()) {
                tracing::error!(error = %err, "final flush failed");
                self.failed = true;
            }
        }
        self.buffer.release();
    }

    fn failed(&self) -> bool {
        self.failed
    }
}

impl Drop for TextIo {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &'static [u8]) -> (TextIo, Event, bool) {
        let mut codec = TextIo::from_reader(input);
        let mut event = Event::new(0);
        let read = codec.fill_next_event(&mut event);
        (codec, event, read)
    }

    #[test]
    fn test_read_minimal_block() {
        let (codec, event, read) = read_all(b"E 7 0 0\nT Version 0\n");
        assert!(read);
        assert!(!codec.failed());
        assert_eq!(event.event_number(), 7);
        assert_eq!(event.particles_count(), 0);
    }

    #[test]
    fn test_read_restores_version_name() {
        let (_codec, event, read) = read_all(b"E 1 0 0\nT hardscatter 0\n");
        assert!(read);
        assert_eq!(event.versions()[0].name(), "hardscatter");
    }

    #[test]
    fn test_read_empty_stream_is_exhaustion_not_failure() {
        let (codec, _event, read) = read_all(b"");
        assert!(!read);
        assert!(!codec.failed());
    }

    #[test]
    fn test_read_malformed_header_fails() {
        let (codec, _event, read) = read_all(b"E one 0 0\n");
        assert!(!read);
        assert!(codec.failed());
    }

    #[test]
    fn test_read_unknown_tag_fails() {
        let (codec, _event, read) = read_all(b"E 1 0 0\nQ what\n");
        assert!(!read);
        assert!(codec.failed());
    }

    #[test]
    fn test_read_rejects_positive_vertex_barcode() {
        let (codec, _event, read) = read_all(b"E 1 1 0\nT Version 0\nV 3 []\n");
        assert!(!read);
        assert!(codec.failed());
    }

    #[test]
    fn test_read_rejects_unknown_production_vertex() {
        let input: &[u8] =
            b"E 1 0 1\nT Version 0\nP 1 -5 22 0e0 0e0 0e0 0e0 0e0 1\n";
        let (codec, _event, read) = read_all(input);
        assert!(!read);
        assert!(codec.failed());
    }

    #[test]
    fn test_read_rejects_unknown_incoming_particle() {
        let input: &[u8] = b"E 1 1 0\nT Version 0\nV -1 [9]\n";
        let (codec, _event, read) = read_all(input);
        assert!(!read);
        assert!(codec.failed());
    }

    #[test]
    fn test_wrong_direction_write_is_noop() {
        let mut codec = TextIo::from_reader(&b"E 1 0 0\n"[..]);
        let event = Event::new(1);
        codec.write_event(&event);
        assert!(!codec.failed(), "direction misuse is a usage error, not a stream fault");
    }

    #[test]
    fn test_wrong_direction_read_returns_false() {
        let mut codec = TextIo::from_writer(Vec::new());
        let mut event = Event::new(1);
        assert!(!codec.fill_next_event(&mut event));
        assert!(!codec.failed());
    }

    #[test]
    fn test_precision_is_capped() {
        let codec = TextIo::from_writer(Vec::new()).with_precision(99);
        assert_eq!(codec.precision, MAX_PRECISION);
    }
}
