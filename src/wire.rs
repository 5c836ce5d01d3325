//! The wire codec: self-delimiting serialized values on a byte stream.
//!
//! The producer writes a flat sequence of [`Value`]s; the consumer reads
//! them back strictly in write order. Every value carries its own type
//! and length, so no outer framing exists and no lookahead is needed.
//! The encoding is canonical: each value has exactly one byte form, which
//! makes decode/encode a true round trip.

use std::io::{Read, Write};

use crate::error::{Error, ProtocolError, Result};

// Tag bytes (one per value kind; anything else is malformed).
mod tag {
    pub const NONE: u8 = 0x00;
    pub const INT: u8 = 0x01;
    pub const FLOAT: u8 = 0x02;
    pub const STR: u8 = 0x03;
    pub const LIST: u8 = 0x04;
}

/// Cap for list pre-allocation. A hostile element count can still make the
/// decode fail with `Truncated`, but it cannot reserve gigabytes first.
const MAX_PREALLOC: u32 = 4096;

/// One decoded stream value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Non-negative integer, as used for plot indexes and counts.
    pub fn as_index(&self) -> Result<usize, ProtocolError> {
        match self {
            Value::Int(v) if *v >= 0 => Ok(*v as usize),
            other => Err(ProtocolError::TypeMismatch {
                expected: "non-negative int",
                got: other.type_name(),
            }),
        }
    }

    /// Numeric scalar; integral wire values are accepted where a float is
    /// expected (producers emit whatever their samples happen to be).
    pub fn as_f64(&self) -> Result<f64, ProtocolError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            other => Err(ProtocolError::TypeMismatch {
                expected: "number",
                got: other.type_name(),
            }),
        }
    }

    pub fn into_string(self) -> Result<String, ProtocolError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(ProtocolError::TypeMismatch {
                expected: "str",
                got: other.type_name(),
            }),
        }
    }

    /// `Str` or the none marker, for optional text arguments.
    pub fn into_opt_string(self) -> Result<Option<String>, ProtocolError> {
        match self {
            Value::None => Ok(None),
            Value::Str(s) => Ok(Some(s)),
            other => Err(ProtocolError::TypeMismatch {
                expected: "str or none",
                got: other.type_name(),
            }),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>, ProtocolError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(ProtocolError::TypeMismatch {
                expected: "list",
                got: other.type_name(),
            }),
        }
    }

    pub fn into_f64_vec(self) -> Result<Vec<f64>, ProtocolError> {
        self.into_list()?.iter().map(Value::as_f64).collect()
    }
}

/// Blocking reader side of the codec.
///
/// `next()` consumes exactly one complete value. The input ending anywhere
/// a value (or part of one) is expected maps to [`ProtocolError::Truncated`];
/// both grammars terminate via in-band data, never via EOF.
pub struct ValueReader<R: Read> {
    rd: R,
}

impl<R: Read> ValueReader<R> {
    pub fn new(rd: R) -> Self {
        Self { rd }
    }

    pub fn next(&mut self) -> Result<Value> {
        let tag = self.read_u8()?;
        match tag {
            tag::NONE => Ok(Value::None),
            tag::INT => Ok(Value::Int(i64::from_le_bytes(self.read_array()?))),
            tag::FLOAT => Ok(Value::Float(f64::from_le_bytes(self.read_array()?))),
            tag::STR => {
                let len = self.read_u32()? as usize;
                // Grow in bounded chunks: a hostile length fails with
                // `Truncated` once the stream runs dry instead of
                // reserving the full claim up front.
                let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC as usize));
                while buf.len() < len {
                    let chunk = (len - buf.len()).min(MAX_PREALLOC as usize);
                    let start = buf.len();
                    buf.resize(start + chunk, 0);
                    self.fill(&mut buf[start..])?;
                }
                let s = String::from_utf8(buf).map_err(|_| ProtocolError::InvalidString)?;
                Ok(Value::Str(s))
            }
            tag::LIST => {
                let count = self.read_u32()?;
                let mut items = Vec::with_capacity(count.min(MAX_PREALLOC) as usize);
                for _ in 0..count {
                    items.push(self.next()?);
                }
                Ok(Value::List(items))
            }
            other => Err(ProtocolError::InvalidTag(other).into()),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.rd.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::Protocol(ProtocolError::Truncated)
            } else {
                Error::Io(e)
            }
        })
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

/// Writer side of the codec.
pub struct ValueWriter<W: Write> {
    wr: W,
}

impl<W: Write> ValueWriter<W> {
    pub fn new(wr: W) -> Self {
        Self { wr }
    }

    pub fn write(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::None => self.wr.write_all(&[tag::NONE])?,
            Value::Int(v) => {
                self.wr.write_all(&[tag::INT])?;
                self.wr.write_all(&v.to_le_bytes())?;
            }
            Value::Float(v) => {
                self.wr.write_all(&[tag::FLOAT])?;
                self.wr.write_all(&v.to_le_bytes())?;
            }
            Value::Str(s) => {
                self.wr.write_all(&[tag::STR])?;
                self.wr.write_all(&(s.len() as u32).to_le_bytes())?;
                self.wr.write_all(s.as_bytes())?;
            }
            Value::List(items) => {
                self.wr.write_all(&[tag::LIST])?;
                self.wr.write_all(&(items.len() as u32).to_le_bytes())?;
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    // Typed conveniences for producer code.

    pub fn none(&mut self) -> Result<()> {
        self.write(&Value::None)
    }

    pub fn int(&mut self, v: i64) -> Result<()> {
        self.write(&Value::Int(v))
    }

    pub fn float(&mut self, v: f64) -> Result<()> {
        self.write(&Value::Float(v))
    }

    pub fn str(&mut self, s: &str) -> Result<()> {
        self.write(&Value::Str(s.to_string()))
    }

    pub fn f64_list(&mut self, values: &[f64]) -> Result<()> {
        self.wr.write_all(&[tag::LIST])?;
        self.wr.write_all(&(values.len() as u32).to_le_bytes())?;
        for v in values {
            self.float(*v)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.wr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.wr
    }
}
