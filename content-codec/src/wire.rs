//! Binary wire primitives: tag values, the per-call string table, and the
//! bounds-checked reader and writer.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use content_model::PrimitiveValue;

use crate::error::{CodecError, CodecResult};

/// Tag and marker byte values of the binary format.
pub mod tags {
    /// Named aggregate; followed by its type name.
    pub const AGGREGATE: u8 = 1;
    /// Content-element-list; no type name.
    pub const CONTENT_ELEMENT_LIST: u8 = 2;
    /// Composite; followed by its type name.
    pub const OBJECT: u8 = 3;
    /// Precedes each child.
    pub const ELEMENT: u8 = 4;
    /// Closes a structural node.
    pub const END: u8 = 5;
    /// String with a 2-byte length.
    pub const STRING: u8 = 6;
    /// One byte, 0 or 1.
    pub const BOOLEAN: u8 = 7;
    /// 4-byte signed integer.
    pub const INTEGER: u8 = 8;
    /// IEEE-754 single.
    pub const FLOAT: u8 = 9;
    /// 8-byte signed milliseconds since the epoch.
    pub const DATE: u8 = 10;
    /// 4-byte length then raw bytes.
    pub const BYTE_SEQUENCE: u8 = 11;
    /// String with a 4-byte length.
    pub const BIG_STRING: u8 = 12;
    /// 8-byte signed integer.
    pub const LONG: u8 = 13;
    /// IEEE-754 double.
    pub const DOUBLE: u8 = 14;
    /// Set on a string-carrying tag when a table index follows instead of text.
    pub const MODIFIER: u8 = 0x10;
    /// Clears [`MODIFIER`].
    pub const UNMODIFIER: u8 = !MODIFIER;
}

/// Strings of at least this many UTF-8 bytes need a 4-byte length.
pub(crate) const BIG_STRING_THRESHOLD: usize = 0xFFFF;

const MAX_TABLE_ENTRIES: usize = 256;

/// Append-only string dictionary local to one encode or decode call.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    pub(crate) fn index_of(&self, value: &str) -> Option<u8> {
        self.entries
            .iter()
            .position(|entry| entry == value)
            .and_then(|index| u8::try_from(index).ok())
    }

    pub(crate) fn get(&self, index: u8) -> Option<&str> {
        self.entries.get(usize::from(index)).map(String::as_str)
    }

    /// Records a literal string if it is eligible and there is room left.
    pub(crate) fn offer(&mut self, value: &str) {
        if self.entries.len() < MAX_TABLE_ENTRIES
            && value.chars().nth(1).is_some()
            && self.index_of(value).is_none()
        {
            self.entries.push(value.to_owned());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Output buffer with string back-referencing.
#[derive(Debug)]
pub(crate) struct Writer {
    out: BytesMut,
    table: StringTable,
    compress: bool,
}

impl Writer {
    pub(crate) fn new(compress: bool) -> Self {
        Self {
            out: BytesMut::new(),
            table: StringTable::default(),
            compress,
        }
    }

    pub(crate) fn marker(&mut self, tag: u8) {
        self.out.put_u8(tag);
    }

    /// Writes `value` under `tag`, as a back-reference when it is tabled.
    /// Only [`tags::STRING`] may switch to the big form.
    pub(crate) fn string(&mut self, tag: u8, value: &str) -> CodecResult<()> {
        if self.compress {
            if let Some(index) = self.table.index_of(value) {
                self.out.put_u8(tag | tags::MODIFIER);
                self.out.put_u8(index);
                return Ok(());
            }
        }

        let len = value.len();
        if len >= BIG_STRING_THRESHOLD {
            if tag != tags::STRING {
                return Err(CodecError::StringTooLong { len });
            }
            let len = u32::try_from(len).map_err(|_| CodecError::StringTooLong { len })?;
            self.out.put_u8(tags::BIG_STRING);
            self.out.put_u32(len);
            self.out.put_slice(value.as_bytes());
            return Ok(());
        }

        let short = u16::try_from(len).map_err(|_| CodecError::StringTooLong { len })?;
        self.out.put_u8(tag);
        self.out.put_u16(short);
        self.out.put_slice(value.as_bytes());
        self.table.offer(value);
        Ok(())
    }

    pub(crate) fn primitive(&mut self, value: &PrimitiveValue) -> CodecResult<()> {
        match value {
            PrimitiveValue::String(v) => self.string(tags::STRING, v)?,
            PrimitiveValue::Boolean(v) => {
                self.out.put_u8(tags::BOOLEAN);
                self.out.put_u8(u8::from(*v));
            }
            PrimitiveValue::Integer(v) => {
                self.out.put_u8(tags::INTEGER);
                self.out.put_i32(*v);
            }
            PrimitiveValue::Long(v) => {
                self.out.put_u8(tags::LONG);
                self.out.put_i64(*v);
            }
            PrimitiveValue::Float(v) => {
                self.out.put_u8(tags::FLOAT);
                self.out.put_f32(*v);
            }
            PrimitiveValue::Double(v) => {
                self.out.put_u8(tags::DOUBLE);
                self.out.put_f64(*v);
            }
            PrimitiveValue::Date(v) => {
                self.out.put_u8(tags::DATE);
                self.out.put_i64(v.timestamp_millis());
            }
            PrimitiveValue::ByteSequence(v) => {
                let len = u32::try_from(v.len()).map_err(|_| {
                    CodecError::malformed(self.out.len(), "byte sequence longer than 4 GiB")
                })?;
                self.out.put_u8(tags::BYTE_SEQUENCE);
                self.out.put_u32(len);
                self.out.put_slice(v);
            }
        }
        Ok(())
    }

    pub(crate) fn table_len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn finish(self) -> Bytes {
        self.out.freeze()
    }
}

/// Bounds-checked cursor over untrusted input, with the decode-side string
/// table and depth accounting.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    input: &'a [u8],
    position: usize,
    table: StringTable,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a [u8], max_depth: usize) -> Self {
        Self {
            input,
            position: 0,
            table: StringTable::default(),
            depth: 0,
            max_depth,
        }
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn table_len(&self) -> usize {
        self.table.len()
    }

    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let remaining = self.input.len() - self.position;
        if len > remaining {
            return Err(CodecError::Truncated {
                position: self.position,
                needed: len - remaining,
            });
        }
        let slice = &self.input[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> CodecResult<u16> {
        self.array().map(u16::from_be_bytes)
    }

    fn u32(&mut self) -> CodecResult<u32> {
        self.array().map(u32::from_be_bytes)
    }

    pub(crate) fn enter(&mut self) -> CodecResult<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reads the string following `tag`, which has already been consumed.
    pub(crate) fn string(&mut self, tag: u8) -> CodecResult<String> {
        if tag & tags::MODIFIER != 0 {
            let position = self.position;
            let index = self.u8()?;
            return self
                .table
                .get(index)
                .map(str::to_owned)
                .ok_or(CodecError::InvalidStringIndex { index, position });
        }
        let len = usize::from(self.u16()?);
        let value = self.utf8(len)?;
        self.table.offer(&value);
        Ok(value)
    }

    fn utf8(&mut self, len: usize) -> CodecResult<String> {
        let position = self.position;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { position })
    }

    /// Reads a type or slot name introduced by `tag`, checking its base tag.
    pub(crate) fn name(&mut self, tag: u8, expected: u8) -> CodecResult<String> {
        if tag & tags::UNMODIFIER != expected {
            return Err(CodecError::UnexpectedTag {
                tag,
                position: self.position.saturating_sub(1),
            });
        }
        self.string(tag)
    }

    /// Reads the payload of a primitive whose tag has already been consumed.
    pub(crate) fn primitive(&mut self, tag: u8) -> CodecResult<PrimitiveValue> {
        let tag_position = self.position.saturating_sub(1);
        let value = match tag {
            t if t & tags::UNMODIFIER == tags::STRING => PrimitiveValue::String(self.string(t)?),
            tags::BIG_STRING => {
                let len = self.u32()?;
                let len = usize::try_from(len)
                    .map_err(|_| CodecError::malformed(tag_position, "string length overflow"))?;
                PrimitiveValue::String(self.utf8(len)?)
            }
            tags::BOOLEAN => match self.u8()? {
                0 => PrimitiveValue::Boolean(false),
                1 => PrimitiveValue::Boolean(true),
                other => {
                    return Err(CodecError::malformed(
                        tag_position,
                        format!("boolean byte {other}"),
                    ));
                }
            },
            tags::INTEGER => PrimitiveValue::Integer(i32::from_be_bytes(self.array()?)),
            tags::LONG => PrimitiveValue::Long(i64::from_be_bytes(self.array()?)),
            tags::FLOAT => PrimitiveValue::Float(f32::from_be_bytes(self.array()?)),
            tags::DOUBLE => PrimitiveValue::Double(f64::from_be_bytes(self.array()?)),
            tags::DATE => {
                let millis = i64::from_be_bytes(self.array()?);
                let date: DateTime<Utc> = DateTime::from_timestamp_millis(millis)
                    .ok_or(CodecError::InvalidDate {
                        position: tag_position,
                    })?;
                PrimitiveValue::Date(date)
            }
            tags::BYTE_SEQUENCE => {
                let len = self.u32()?;
                let len = usize::try_from(len)
                    .map_err(|_| CodecError::malformed(tag_position, "byte length overflow"))?;
                PrimitiveValue::ByteSequence(Bytes::copy_from_slice(self.take(len)?))
            }
            other => {
                return Err(CodecError::UnexpectedTag {
                    tag: other,
                    position: tag_position,
                });
            }
        };
        Ok(value)
    }

    /// Fails unless the whole input has been consumed.
    pub(crate) fn finish(&self) -> CodecResult<()> {
        if self.position < self.input.len() {
            return Err(CodecError::TrailingInput {
                position: self.position,
            });
        }
        Ok(())
    }
}
