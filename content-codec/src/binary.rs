//! Tag-length binary codec with per-call string back-references.

use bytes::Bytes;
use content_model::{
    AbsAggregate, AbsComposite, AbsContentElementList, AbsObject, AbsPrimitive, AgentIdentifier,
    FrameValue, OrderedFrame, QualifiedFrame, vocabulary,
};
use content_ontology::Ontology;
use tracing::debug;

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::wire::{Reader, Writer, tags};

/// Binary codec for descriptor trees and frames.
///
/// Holds only configuration: every call builds its own buffer and string
/// table, so one codec can be shared freely between threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec {
    config: CodecConfig,
}

impl BinaryCodec {
    /// Creates a codec with the supplied configuration.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> CodecConfig {
        self.config
    }

    /// Encodes a descriptor tree. Composite slots are written in the order
    /// they were set.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::StringTooLong`] when a type or slot name does not
    /// fit a 16-bit length.
    pub fn encode(&self, abs: &AbsObject) -> CodecResult<Bytes> {
        let mut writer = Writer::new(self.config.string_table());
        write_abs(&mut writer, abs)?;
        Ok(self.finish(writer))
    }

    /// Decodes a descriptor tree, resolving composite type names through
    /// `ontology`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for truncated, malformed, or over-deep input,
    /// for trailing bytes, and for type names `ontology` cannot resolve.
    pub fn decode(&self, input: &[u8], ontology: &Ontology) -> CodecResult<AbsObject> {
        self.decode_with(input, |reader| read_abs(reader, ontology))
    }

    /// Encodes a frame without consulting any ontology. Agent identifiers are
    /// written as their reserved qualified frame.
    ///
    /// # Errors
    ///
    /// As for [`encode`](Self::encode).
    pub fn encode_frame(&self, frame: &FrameValue) -> CodecResult<Bytes> {
        let mut writer = Writer::new(self.config.string_table());
        write_frame(&mut writer, frame)?;
        Ok(self.finish(writer))
    }

    /// Decodes a frame. Qualified frames named `agent-identifier` come back as
    /// [`FrameValue::AgentIdentifier`].
    ///
    /// # Errors
    ///
    /// As for [`decode`](Self::decode), minus schema resolution.
    pub fn decode_frame(&self, input: &[u8]) -> CodecResult<FrameValue> {
        self.decode_with(input, read_frame)
    }

    fn finish(&self, writer: Writer) -> Bytes {
        let strings = writer.table_len();
        let bytes = writer.finish();
        debug!(
            bytes = bytes.len(),
            strings,
            compressed = self.config.string_table(),
            "encoded binary content"
        );
        bytes
    }

    fn decode_with<T>(
        &self,
        input: &[u8],
        read: impl FnOnce(&mut Reader<'_>) -> CodecResult<T>,
    ) -> CodecResult<T> {
        let mut reader = Reader::new(input, self.config.max_depth());
        let result = read(&mut reader).and_then(|value| reader.finish().map(|()| value));
        match &result {
            Ok(_) => debug!(
                bytes = input.len(),
                strings = reader.table_len(),
                "decoded binary content"
            ),
            Err(error) => debug!(
                %error,
                position = reader.position(),
                "binary decode failed"
            ),
        }
        result
    }
}

fn write_abs(writer: &mut Writer, abs: &AbsObject) -> CodecResult<()> {
    match abs {
        AbsObject::Primitive(primitive) => writer.primitive(primitive.value())?,
        AbsObject::Aggregate(aggregate) => {
            writer.string(tags::AGGREGATE, aggregate.type_name())?;
            for element in aggregate.iter() {
                writer.marker(tags::ELEMENT);
                write_abs(writer, element)?;
            }
            writer.marker(tags::END);
        }
        AbsObject::ContentElementList(list) => {
            writer.marker(tags::CONTENT_ELEMENT_LIST);
            for element in list.iter() {
                writer.marker(tags::ELEMENT);
                write_abs(writer, element)?;
            }
            writer.marker(tags::END);
        }
        AbsObject::Composite(composite) => {
            writer.string(tags::OBJECT, composite.type_name())?;
            for (name, value) in composite.slots() {
                writer.string(tags::ELEMENT, name)?;
                write_abs(writer, value)?;
            }
            writer.marker(tags::END);
        }
        AbsObject::Variable(variable) => {
            writer.string(tags::OBJECT, vocabulary::VARIABLE)?;
            writer.string(tags::ELEMENT, vocabulary::VARIABLE_NAME)?;
            writer.string(tags::STRING, variable.name())?;
            if let Some(value_type) = variable.value_type() {
                writer.string(tags::ELEMENT, vocabulary::VARIABLE_VALUE_TYPE)?;
                writer.string(tags::STRING, value_type)?;
            }
            writer.marker(tags::END);
        }
    }
    Ok(())
}

fn read_abs(reader: &mut Reader<'_>, ontology: &Ontology) -> CodecResult<AbsObject> {
    let tag = reader.u8()?;
    match tag & tags::UNMODIFIER {
        tags::AGGREGATE => {
            let mut aggregate = AbsAggregate::new(reader.string(tag)?);
            reader.enter()?;
            while next_element(reader)? {
                aggregate.add(read_abs(reader, ontology)?)?;
            }
            reader.leave();
            Ok(aggregate.into())
        }
        tags::CONTENT_ELEMENT_LIST if tag == tags::CONTENT_ELEMENT_LIST => {
            let mut list = AbsContentElementList::new();
            reader.enter()?;
            while next_element(reader)? {
                list.add(read_abs(reader, ontology)?)?;
            }
            reader.leave();
            Ok(list.into())
        }
        tags::OBJECT => {
            let name = reader.string(tag)?;
            let schema = ontology.schema(&name)?;
            let mut object: AbsObject = match schema.kind().composite_kind() {
                Some(kind) => AbsComposite::new(kind, name).into(),
                None => schema.new_instance()?,
            };
            reader.enter()?;
            while let Some(slot) = next_slot(reader)? {
                let value = read_abs(reader, ontology)?;
                object.set_slot(slot, value)?;
            }
            reader.leave();
            Ok(object)
        }
        _ => Ok(AbsPrimitive::wrap(reader.primitive(tag)?).into()),
    }
}

fn write_frame(writer: &mut Writer, frame: &FrameValue) -> CodecResult<()> {
    match frame {
        FrameValue::Primitive(value) => writer.primitive(value)?,
        FrameValue::Ordered(ordered) => {
            if ordered
                .type_name()
                .eq_ignore_ascii_case(vocabulary::CONTENT_ELEMENT_LIST)
            {
                writer.marker(tags::CONTENT_ELEMENT_LIST);
            } else {
                writer.string(tags::AGGREGATE, ordered.type_name())?;
            }
            for element in ordered.iter() {
                writer.marker(tags::ELEMENT);
                write_frame(writer, element)?;
            }
            writer.marker(tags::END);
        }
        FrameValue::Qualified(qualified) => write_qualified(writer, qualified)?,
        FrameValue::AgentIdentifier(aid) => write_qualified(writer, &aid.to_frame())?,
    }
    Ok(())
}

fn write_qualified(writer: &mut Writer, frame: &QualifiedFrame) -> CodecResult<()> {
    writer.string(tags::OBJECT, frame.type_name())?;
    for (name, value) in frame.slots() {
        writer.string(tags::ELEMENT, name)?;
        write_frame(writer, value)?;
    }
    writer.marker(tags::END);
    Ok(())
}

fn read_frame(reader: &mut Reader<'_>) -> CodecResult<FrameValue> {
    let tag = reader.u8()?;
    match tag & tags::UNMODIFIER {
        tags::AGGREGATE => {
            let ordered = OrderedFrame::new(reader.string(tag)?);
            read_ordered(reader, ordered).map(FrameValue::Ordered)
        }
        tags::CONTENT_ELEMENT_LIST if tag == tags::CONTENT_ELEMENT_LIST => {
            let ordered = OrderedFrame::new(vocabulary::CONTENT_ELEMENT_LIST);
            read_ordered(reader, ordered).map(FrameValue::Ordered)
        }
        tags::OBJECT => {
            let mut frame = QualifiedFrame::new(reader.string(tag)?);
            reader.enter()?;
            while let Some(slot) = next_slot(reader)? {
                let value = read_frame(reader)?;
                frame.put(slot, value);
            }
            reader.leave();
            if vocabulary::is_agent_identifier(frame.type_name()) {
                return Ok(AgentIdentifier::try_from_frame(&frame)?.into());
            }
            Ok(frame.into())
        }
        _ => Ok(FrameValue::Primitive(reader.primitive(tag)?)),
    }
}

fn read_ordered(reader: &mut Reader<'_>, mut ordered: OrderedFrame) -> CodecResult<OrderedFrame> {
    reader.enter()?;
    while next_element(reader)? {
        ordered.push(read_frame(reader)?);
    }
    reader.leave();
    Ok(ordered)
}

/// Consumes the marker before a positional child; `false` at `END`.
fn next_element(reader: &mut Reader<'_>) -> CodecResult<bool> {
    let position = reader.position();
    match reader.u8()? {
        tags::ELEMENT => Ok(true),
        tags::END => Ok(false),
        tag => Err(CodecError::UnexpectedTag { tag, position }),
    }
}

/// Consumes the name before a slot value; `None` at `END`.
fn next_slot(reader: &mut Reader<'_>) -> CodecResult<Option<String>> {
    let tag = reader.u8()?;
    if tag == tags::END {
        return Ok(None);
    }
    reader.name(tag, tags::ELEMENT).map(Some)
}
