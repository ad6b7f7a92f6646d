//! VST FXP/FXB preset container.
//!
//! A container starts with `CcnK`, a byte size and a format tag, then
//! fields that depend on the tag:
//!
//! | Tag    | Kind                        | Body                                  |
//! |--------|-----------------------------|---------------------------------------|
//! | `FPCh` | program with opaque chunk   | program count, name[28], chunk        |
//! | `FBCh` | bank with opaque chunk      | program count, future[128], chunk     |
//! | `FxCk` | program with parameters     | parameter count, name[28], f32 values |
//! | `FxBk` | bank of parameter programs  | program count, future[128], programs  |
//!
//! Container fields are big-endian; chunk payloads are stored byte-reversed.

use std::fmt;

use arrayvec::ArrayVec;

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::chunk_xml::XmlDocument;
use crate::FormatError;

/// Magic at the start of every container.
pub const CHUNK_MAGIC: FourCc = FourCc(*b"CcnK");

const PROGRAM_CHUNK_TAG: FourCc = FourCc(*b"FPCh");
const BANK_CHUNK_TAG: FourCc = FourCc(*b"FBCh");
const PROGRAM_TAG: FourCc = FourCc(*b"FxCk");
const BANK_TAG: FourCc = FourCc(*b"FxBk");

const NAME_LEN: usize = 28;
const FUTURE_LEN: usize = 128;

// Fixed bytes counted by the size field, per variant.
const PROGRAM_CHUNK_FIXED: u32 = 52;
const BANK_CHUNK_FIXED: u32 = 152;
const PROGRAM_FIXED: u32 = 48;
const BANK_FIXED: u32 = 156;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Four-byte ASCII tag.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// First four bytes of `text`, zero-padded when shorter.
    pub fn from_text(text: &str) -> Self {
        let mut bytes = [0u8; 4];
        for (dst, src) in bytes.iter_mut().zip(text.bytes()) {
            *dst = src;
        }
        FourCc(bytes)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(String::from_utf8_lossy(&self.0).trim_end_matches('\0'))
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({:?})", self.to_string())
    }
}

/// Fixed-width text field, kept as the stored bytes minus trailing NULs.
///
/// Names from older hosts are often Latin-1, so the bytes are only decoded
/// for display and written back unchanged.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedName<const N: usize>(ArrayVec<u8, N>);

impl<const N: usize> FixedName<N> {
    /// Longest prefix of `text` that fits in `N` bytes without splitting a
    /// character.
    pub fn from_text(text: &str) -> Self {
        let mut bytes = ArrayVec::new();
        for c in text.chars() {
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf).as_bytes();
            if bytes.try_extend_from_slice(encoded).is_err() {
                break;
            }
        }
        FixedName(bytes)
    }

    /// Field contents as stored, NUL padding removed.
    pub fn from_stored(stored: &[u8]) -> Self {
        let end = stored.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        FixedName(stored[..end.min(N)].iter().copied().collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> fmt::Display for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl<const N: usize> fmt::Debug for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedName({:?})", self.to_string())
    }
}

/// Fields shared by every container variant.
#[derive(Clone, Debug, PartialEq)]
pub struct FxHeader {
    /// Must be [`CHUNK_MAGIC`] for the container to be written
    pub chunk_magic: FourCc,
    /// Size as read; recomputed on every write
    pub byte_size: u32,
    /// Container format version
    pub version: u32,
    /// Plugin unique id
    pub fx_id: FourCc,
    /// Plugin version
    pub fx_version: u32,
}

impl FxHeader {
    pub fn new(fx_id: FourCc, version: u32, fx_version: u32) -> Self {
        Self {
            chunk_magic: CHUNK_MAGIC,
            byte_size: 0,
            version,
            fx_id,
            fx_version,
        }
    }
}

/// Program whose state is an opaque chunk (`FPCh`).
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramChunk {
    pub header: FxHeader,
    pub program_count: u32,
    pub name: FixedName<NAME_LEN>,
    /// Payload in plugin byte order (already un-reversed)
    pub chunk: Vec<u8>,
}

/// Bank whose state is an opaque chunk (`FBCh`).
#[derive(Clone, Debug, PartialEq)]
pub struct BankChunk {
    pub header: FxHeader,
    pub program_count: u32,
    pub future: FixedName<FUTURE_LEN>,
    pub chunk: Vec<u8>,
}

/// Program stored as a flat parameter list (`FxCk`).
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub header: FxHeader,
    pub name: FixedName<NAME_LEN>,
    pub parameters: Vec<f32>,
}

/// Bank of parameter programs (`FxBk`).
#[derive(Clone, Debug, PartialEq)]
pub struct Bank {
    pub header: FxHeader,
    pub future: FixedName<FUTURE_LEN>,
    pub programs: Vec<Program>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FxContent {
    ProgramChunk(ProgramChunk),
    BankChunk(BankChunk),
    Program(Program),
    Bank(Bank),
}

impl FxContent {
    pub fn header(&self) -> &FxHeader {
        match self {
            FxContent::ProgramChunk(c) => &c.header,
            FxContent::BankChunk(c) => &c.header,
            FxContent::Program(p) => &p.header,
            FxContent::Bank(b) => &b.header,
        }
    }

    /// Format tag written after the size field.
    pub fn tag(&self) -> FourCc {
        match self {
            FxContent::ProgramChunk(_) => PROGRAM_CHUNK_TAG,
            FxContent::BankChunk(_) => BANK_CHUNK_TAG,
            FxContent::Program(_) => PROGRAM_TAG,
            FxContent::Bank(_) => BANK_TAG,
        }
    }

    /// Opaque payload of the chunk variants.
    pub fn chunk(&self) -> Option<&[u8]> {
        match self {
            FxContent::ProgramChunk(c) => Some(&c.chunk),
            FxContent::BankChunk(c) => Some(&c.chunk),
            _ => None,
        }
    }
}

/// A decoded container plus the XML view of its chunk, if it holds one.
#[derive(Clone, Debug, PartialEq)]
pub struct Fxp {
    pub content: FxContent,
    /// When set, written in place of the raw chunk of chunk variants
    pub xml: Option<XmlDocument>,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

impl Fxp {
    pub fn new(content: FxContent) -> Self {
        Self { content, xml: None }
    }

    /// Decode a container. Returns `Ok(None)` when the data is not one.
    pub fn read(data: &[u8]) -> Result<Option<Fxp>, FormatError> {
        if !data.starts_with(&CHUNK_MAGIC.0) {
            log::debug!("not a preset container: missing {} header", CHUNK_MAGIC);
            return Ok(None);
        }
        let mut r = BinaryReader::new(data, Endian::Big);
        Ok(read_content(&mut r)?.map(|(content, xml)| Fxp { content, xml }))
    }

    /// Encode the container, recomputing every size field.
    pub fn write(&self) -> Result<Vec<u8>, FormatError> {
        let mut w = BinaryWriter::new(Endian::Big);
        write_content(&mut w, &self.content, self.xml.as_ref())?;
        Ok(w.into_bytes())
    }
}

/// Undo (or apply) the byte reversal of stored chunk payloads.
pub fn reverse_chunk(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

fn read_tag(r: &mut BinaryReader) -> Result<FourCc, FormatError> {
    Ok(FourCc(r.read_array::<4>()?))
}

fn read_fixed<const N: usize>(r: &mut BinaryReader) -> Result<FixedName<N>, FormatError> {
    Ok(FixedName::from_stored(r.read_bytes(N)?))
}

fn read_header(r: &mut BinaryReader, chunk_magic: FourCc, byte_size: u32) -> Result<FxHeader, FormatError> {
    Ok(FxHeader {
        chunk_magic,
        byte_size,
        version: r.read_u32()?,
        fx_id: read_tag(r)?,
        fx_version: r.read_u32()?,
    })
}

/// Chunk payload in plugin byte order, plus its XML reading if any.
fn read_chunk(r: &mut BinaryReader) -> Result<(Vec<u8>, Option<XmlDocument>), FormatError> {
    let size = r.read_u32()? as usize;
    let stored = r.read_bytes(size)?;
    let chunk = reverse_chunk(stored);
    // XML chunks are written front to back, so try the stored order as well.
    let xml = XmlDocument::sniff(&chunk).or_else(|| XmlDocument::sniff(stored));
    Ok((chunk, xml))
}

fn read_content(
    r: &mut BinaryReader,
) -> Result<Option<(FxContent, Option<XmlDocument>)>, FormatError> {
    let chunk_magic = read_tag(r)?;
    if chunk_magic != CHUNK_MAGIC {
        return Err(FormatError::UnrecognizedFormat {
            expected: "CcnK",
            found: chunk_magic.to_string(),
        });
    }
    let byte_size = r.read_u32()?;
    let tag = read_tag(r)?;

    let parsed = match &tag.0 {
        b"FPCh" => {
            let header = read_header(r, chunk_magic, byte_size)?;
            let program_count = r.read_u32()?;
            let name = read_fixed(r)?;
            let (chunk, xml) = read_chunk(r)?;
            let content = FxContent::ProgramChunk(ProgramChunk {
                header,
                program_count,
                name,
                chunk,
            });
            (content, xml)
        }
        b"FBCh" => {
            let header = read_header(r, chunk_magic, byte_size)?;
            let program_count = r.read_u32()?;
            let future = read_fixed(r)?;
            let (chunk, xml) = read_chunk(r)?;
            let content = FxContent::BankChunk(BankChunk {
                header,
                program_count,
                future,
                chunk,
            });
            (content, xml)
        }
        b"FxCk" => (FxContent::Program(read_program_body(r, chunk_magic, byte_size)?), None),
        b"FxBk" => {
            let header = read_header(r, chunk_magic, byte_size)?;
            let program_count = r.read_u32()?;
            let future = read_fixed(r)?;
            let mut programs = Vec::new();
            for i in 0..program_count {
                match read_content(r)? {
                    Some((FxContent::Program(program), _)) => programs.push(program),
                    Some((other, _)) => {
                        log::debug!("bank entry {} is {}, not a parameter program", i, other.tag())
                    }
                    None => log::debug!("bank entry {} has an unknown format tag", i),
                }
            }
            let content = FxContent::Bank(Bank {
                header,
                future,
                programs,
            });
            (content, None)
        }
        _ => {
            log::debug!("unknown container format tag {}", tag);
            return Ok(None);
        }
    };
    Ok(Some(parsed))
}

fn read_program_body(
    r: &mut BinaryReader,
    chunk_magic: FourCc,
    byte_size: u32,
) -> Result<Program, FormatError> {
    let header = read_header(r, chunk_magic, byte_size)?;
    let count = r.read_u32()? as usize;
    let name = read_fixed(r)?;
    let mut parameters = Vec::with_capacity(count.min(r.remaining() / 4));
    for _ in 0..count {
        parameters.push(r.read_f32()?);
    }
    Ok(Program {
        header,
        name,
        parameters,
    })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn to_u32(field: &'static str, n: usize) -> Result<u32, FormatError> {
    u32::try_from(n).map_err(|_| FormatError::InvalidCount {
        field,
        value: n as i64,
    })
}

fn program_size(program: &Program) -> Result<u32, FormatError> {
    let params = to_u32("parameter", program.parameters.len())?;
    params
        .checked_mul(4)
        .and_then(|n| n.checked_add(PROGRAM_FIXED))
        .ok_or(FormatError::InvalidCount {
            field: "parameter",
            value: i64::from(params),
        })
}

fn write_header(w: &mut BinaryWriter, header: &FxHeader, tag: FourCc, byte_size: u32) {
    w.write_bytes(&header.chunk_magic.0);
    w.write_u32(byte_size);
    w.write_bytes(&tag.0);
    w.write_u32(header.version);
    w.write_bytes(&header.fx_id.0);
    w.write_u32(header.fx_version);
}

fn write_content(
    w: &mut BinaryWriter,
    content: &FxContent,
    xml: Option<&XmlDocument>,
) -> Result<(), FormatError> {
    let header = content.header();
    if header.chunk_magic != CHUNK_MAGIC {
        log::error!(
            "cannot write preset container: header magic is {:?}, expected {}",
            header.chunk_magic,
            CHUNK_MAGIC
        );
        return Err(FormatError::UnrecognizedFormat {
            expected: "CcnK",
            found: header.chunk_magic.to_string(),
        });
    }

    // Stored chunk bytes: the XML text as-is, or the payload reversed.
    let stored_chunk = |chunk: &[u8]| match xml {
        Some(doc) => doc.to_chunk_text().into_bytes(),
        None => reverse_chunk(chunk),
    };

    match content {
        FxContent::ProgramChunk(c) => {
            let stored = stored_chunk(&c.chunk);
            let size = to_u32("chunk", stored.len())?;
            write_header(w, header, content.tag(), PROGRAM_CHUNK_FIXED.saturating_add(size));
            w.write_u32(c.program_count);
            w.write_fixed_bytes(c.name.as_bytes(), NAME_LEN);
            w.write_u32(size);
            w.write_bytes(&stored);
        }
        FxContent::BankChunk(c) => {
            let stored = stored_chunk(&c.chunk);
            let size = to_u32("chunk", stored.len())?;
            write_header(w, header, content.tag(), BANK_CHUNK_FIXED.saturating_add(size));
            w.write_u32(c.program_count);
            w.write_fixed_bytes(c.future.as_bytes(), FUTURE_LEN);
            w.write_u32(size);
            w.write_bytes(&stored);
        }
        FxContent::Program(p) => {
            write_header(w, header, content.tag(), program_size(p)?);
            w.write_u32(to_u32("parameter", p.parameters.len())?);
            w.write_fixed_bytes(p.name.as_bytes(), NAME_LEN);
            for &value in &p.parameters {
                w.write_f32(value);
            }
        }
        FxContent::Bank(b) => {
            let mut size = BANK_FIXED;
            for program in &b.programs {
                size = size.saturating_add(program_size(program)?);
            }
            write_header(w, header, content.tag(), size);
            w.write_u32(to_u32("program", b.programs.len())?);
            w.write_fixed_bytes(b.future.as_bytes(), FUTURE_LEN);
            for program in &b.programs {
                write_content(w, &FxContent::Program(program.clone()), None)?;
            }
        }
    }
    Ok(())
}

/// Wrap a plugin chunk in a single-program `FPCh` container.
///
/// `fx_id` is cut to four bytes.
pub fn wrap_raw(chunk: &[u8], fx_id: &str) -> Result<Vec<u8>, FormatError> {
    let content = FxContent::ProgramChunk(ProgramChunk {
        header: FxHeader::new(FourCc::from_text(fx_id), 1, 1),
        program_count: 1,
        name: FixedName::default(),
        chunk: chunk.to_vec(),
    });
    Fxp::new(content).write()
}
