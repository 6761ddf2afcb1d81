//! Parenthesised textual codec.
//!
//! Qualified frames are written `(type :slot value ...)` and ordered frames
//! `(type value ...)`. Unquoted literals are read back by trying, in order,
//! an integer, a float, a `yyyyMMddTHHmmssSSSZ` date, and `true`/`false`;
//! anything else is a string. A bare `123` is always an integer, so string
//! values that would read back as anything but a string are quoted, as are
//! the empty string and strings with non-word characters. Non-finite floats
//! are written `NaN`, `Infinity` and `-Infinity`. Dates are limited to years
//! 0 through 9999.

use chrono::{Datelike, NaiveDateTime};
use content_model::{
    AbsObject, AgentIdentifier, FrameValue, OrderedFrame, PrimitiveValue, QualifiedFrame,
    vocabulary,
};
use content_ontology::Ontology;
use tracing::debug;

use crate::bridge;
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};

const DATE_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";
const NON_FINITE: [&str; 3] = ["NaN", "Infinity", "-Infinity"];

/// Textual codec for frames, with a descriptor bridge.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCodec {
    config: CodecConfig,
}

impl TextCodec {
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

    /// Encodes a frame. Agent identifiers are written as their reserved
    /// qualified frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] when a type or slot name is empty or
    /// contains whitespace, parentheses, or quotes, or when a date falls
    /// outside years 0 through 9999.
    pub fn encode(&self, frame: &FrameValue) -> CodecResult<String> {
        let mut out = String::new();
        write_frame(&mut out, frame)?;
        debug!(chars = out.len(), "encoded textual content");
        Ok(out)
    }

    /// Decodes a frame. Qualified frames named `agent-identifier` come back as
    /// [`FrameValue::AgentIdentifier`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] when input ends inside an element,
    /// [`CodecError::TrailingInput`] when text follows the root element, and
    /// [`CodecError::Malformed`] or [`CodecError::DepthExceeded`] otherwise.
    pub fn decode(&self, text: &str) -> CodecResult<FrameValue> {
        let mut parser = Parser::new(text, self.config.max_depth());
        let result = parser.document();
        match &result {
            Ok(_) => debug!(chars = text.len(), "decoded textual content"),
            Err(error) => debug!(%error, position = parser.position, "textual decode failed"),
        }
        result
    }

    /// Encodes a descriptor tree through its frame form.
    ///
    /// # Errors
    ///
    /// As for [`encode`](Self::encode).
    pub fn encode_abs(&self, abs: &AbsObject) -> CodecResult<String> {
        self.encode(&bridge::abs_to_frame(abs))
    }

    /// Decodes a descriptor tree, taking each node's kind from `ontology`.
    ///
    /// Numeric widths are not preserved: integers come back as 32-bit when
    /// they fit and floats always as 64-bit.
    ///
    /// # Errors
    ///
    /// As for [`decode`](Self::decode), plus schema resolution and descriptor
    /// construction failures.
    pub fn decode_abs(&self, text: &str, ontology: &Ontology) -> CodecResult<AbsObject> {
        let frame = self.decode(text)?;
        bridge::frame_to_abs(&frame, ontology)
    }
}

fn write_frame(out: &mut String, frame: &FrameValue) -> CodecResult<()> {
    match frame {
        FrameValue::Primitive(value) => write_literal(out, value)?,
        FrameValue::Ordered(ordered) => {
            out.push('(');
            out.push_str(checked_name(ordered.type_name())?);
            for element in ordered.iter() {
                out.push(' ');
                write_frame(out, element)?;
            }
            out.push(')');
        }
        FrameValue::Qualified(qualified) => write_qualified(out, qualified)?,
        FrameValue::AgentIdentifier(aid) => write_qualified(out, &aid.to_frame())?,
    }
    Ok(())
}

fn write_qualified(out: &mut String, frame: &QualifiedFrame) -> CodecResult<()> {
    out.push('(');
    out.push_str(checked_name(frame.type_name())?);
    for (name, value) in frame.slots() {
        out.push_str(" :");
        out.push_str(checked_name(name)?);
        out.push(' ');
        write_frame(out, value)?;
    }
    out.push(')');
    Ok(())
}

fn checked_name(name: &str) -> CodecResult<&str> {
    if name.is_empty() || name.chars().any(is_delimiter) {
        return Err(CodecError::malformed(
            0,
            format!("`{name}` cannot be written as a name"),
        ));
    }
    Ok(name)
}

fn write_literal(out: &mut String, value: &PrimitiveValue) -> CodecResult<()> {
    match value {
        PrimitiveValue::String(v) if needs_quotes(v) => write_quoted(out, v),
        PrimitiveValue::String(v) => out.push_str(v),
        PrimitiveValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        PrimitiveValue::Integer(v) => out.push_str(&v.to_string()),
        PrimitiveValue::Long(v) => out.push_str(&v.to_string()),
        PrimitiveValue::Float(v) if v.is_finite() => out.push_str(&format!("{v:?}")),
        PrimitiveValue::Double(v) if v.is_finite() => out.push_str(&format!("{v:?}")),
        PrimitiveValue::Float(v) => out.push_str(non_finite(f64::from(*v))),
        PrimitiveValue::Double(v) => out.push_str(non_finite(*v)),
        PrimitiveValue::Date(v) => {
            if !(0..=9999).contains(&v.year()) {
                return Err(CodecError::malformed(
                    0,
                    format!("date {v} is outside years 0 through 9999"),
                ));
            }
            out.push_str(&v.format(DATE_FORMAT).to_string());
        }
        PrimitiveValue::ByteSequence(v) => {
            out.push('#');
            out.push_str(&v.len().to_string());
            out.push('"');
            out.extend(v.iter().copied().map(char::from));
            out.push('"');
        }
    }
    Ok(())
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        NON_FINITE[0]
    } else if value.is_sign_positive() {
        NON_FINITE[1]
    } else {
        NON_FINITE[2]
    }
}

fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || !value.chars().all(is_word_char)
        || !matches!(literal(value), PrimitiveValue::String(_))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '-' | '_' | '.' | '@' | '+' | '*' | '/' | '=' | '<' | '>' | '!' | '?'
        )
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"')
}

/// Reads an unquoted token. The order of attempts is part of the format.
fn literal(token: &str) -> PrimitiveValue {
    if let Ok(value) = token.parse::<i64>() {
        return i32::try_from(value).map_or(PrimitiveValue::Long(value), PrimitiveValue::Integer);
    }
    if let Some(Ok(value)) = looks_like_float(token).then(|| token.parse::<f64>()) {
        return PrimitiveValue::Double(value);
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(token, DATE_FORMAT) {
        return PrimitiveValue::Date(date.and_utc());
    }
    if token.eq_ignore_ascii_case("true") {
        return PrimitiveValue::Boolean(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return PrimitiveValue::Boolean(false);
    }
    PrimitiveValue::String(token.to_owned())
}

/// `inf` and `nan` are words here; only the exact non-finite spellings the
/// encoder writes are floats.
fn looks_like_float(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') || NON_FINITE.contains(&token)
}

struct Parser<'a> {
    text: &'a str,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, max_depth: usize) -> Self {
        Self {
            text,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    fn document(&mut self) -> CodecResult<FrameValue> {
        let value = self.value()?;
        self.skip_whitespace();
        if self.position < self.text.len() {
            return Err(CodecError::TrailingInput {
                position: self.position,
            });
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn truncated(&self) -> CodecError {
        CodecError::Truncated {
            position: self.position,
            needed: 1,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn token(&mut self) -> &'a str {
        let start = self.position;
        while self.peek().is_some_and(|c| !is_delimiter(c)) {
            self.bump();
        }
        &self.text[start..self.position]
    }

    fn value(&mut self) -> CodecResult<FrameValue> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.truncated()),
            Some('(') => self.node(),
            Some('"') => Ok(FrameValue::Primitive(PrimitiveValue::String(self.quoted()?))),
            Some('#') => self.byte_sequence(),
            Some(')') => Err(CodecError::malformed(self.position, "unexpected `)`")),
            Some(':') => Err(CodecError::malformed(
                self.position,
                "slot name outside a qualified frame",
            )),
            Some(_) => Ok(FrameValue::Primitive(literal(self.token()))),
        }
    }

    fn node(&mut self) -> CodecResult<FrameValue> {
        self.bump();
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;

        self.skip_whitespace();
        let name = self.token();
        if name.is_empty() {
            return Err(match self.peek() {
                None => self.truncated(),
                Some(_) => CodecError::malformed(self.position, "missing type name"),
            });
        }
        self.skip_whitespace();
        let frame = if self.peek() == Some(':') {
            self.qualified(name)?
        } else {
            self.ordered(name)?.into()
        };

        self.depth -= 1;
        Ok(frame)
    }

    fn qualified(&mut self, name: &str) -> CodecResult<FrameValue> {
        let mut frame = QualifiedFrame::new(name);
        loop {
            self.skip_whitespace();
            let position = self.position;
            match self.bump() {
                None => return Err(self.truncated()),
                Some(')') => break,
                Some(':') => {
                    let slot = self.token();
                    if slot.is_empty() {
                        return Err(CodecError::malformed(position, "empty slot name"));
                    }
                    let value = self.value()?;
                    frame.put(slot, value);
                }
                Some(c) => {
                    return Err(CodecError::malformed(
                        position,
                        format!("expected `:slot` or `)`, found `{c}`"),
                    ));
                }
            }
        }
        if vocabulary::is_agent_identifier(frame.type_name()) {
            return Ok(AgentIdentifier::try_from_frame(&frame)?.into());
        }
        Ok(frame.into())
    }

    fn ordered(&mut self, name: &str) -> CodecResult<OrderedFrame> {
        let mut frame = OrderedFrame::new(name);
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.truncated()),
                Some(')') => {
                    self.bump();
                    return Ok(frame);
                }
                Some(':') => {
                    return Err(CodecError::malformed(
                        self.position,
                        "slot name inside an ordered frame",
                    ));
                }
                Some(_) => frame.push(self.value()?),
            }
        }
    }

    fn quoted(&mut self) -> CodecResult<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.truncated()),
                Some('"') => return Ok(value),
                Some('\\') => value.push(self.bump().ok_or_else(|| self.truncated())?),
                Some(c) => value.push(c),
            }
        }
    }

    fn byte_sequence(&mut self) -> CodecResult<FrameValue> {
        let start = self.position;
        self.bump();
        let digits_start = self.position;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let len: usize = self.text[digits_start..self.position]
            .parse()
            .map_err(|_| CodecError::malformed(start, "byte sequence without a length"))?;
        if self.bump() != Some('"') {
            return Err(CodecError::malformed(start, "byte sequence without an opening quote"));
        }
        // Every byte takes at least one character, plus the closing quote.
        let remaining = self.text.len() - self.position;
        if len >= remaining {
            return Err(CodecError::Truncated {
                position: self.position,
                needed: len + 1 - remaining,
            });
        }

        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            let position = self.position;
            let c = self.bump().ok_or_else(|| self.truncated())?;
            let byte = u8::try_from(c).map_err(|_| {
                CodecError::malformed(position, format!("`{c}` is not a byte"))
            })?;
            bytes.push(byte);
        }
        if self.bump() != Some('"') {
            return Err(CodecError::malformed(start, "byte sequence length mismatch"));
        }
        Ok(FrameValue::primitive(bytes))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use content_model::{AbsComposite, AbsVariable};
    use content_ontology::basic_ontology;

    use super::*;

    fn codec() -> TextCodec {
        TextCodec::default()
    }

    fn decode_literal(text: &str) -> PrimitiveValue {
        match codec().decode(text).expect("literal") {
            FrameValue::Primitive(value) => value,
            other => panic!("expected a primitive, got {other:?}"),
        }
    }

    #[test]
    fn numeric_looking_tokens_are_numbers() {
        assert_eq!(decode_literal("123"), PrimitiveValue::Integer(123));
        assert_eq!(decode_literal("\"123\""), PrimitiveValue::String("123".into()));
        assert_eq!(decode_literal("3000000000"), PrimitiveValue::Long(3_000_000_000));
        assert_eq!(decode_literal("1.5"), PrimitiveValue::Double(1.5));
    }

    #[test]
    fn boolean_words_are_quoted_when_they_are_strings() {
        assert_eq!(decode_literal("true"), PrimitiveValue::Boolean(true));
        assert_eq!(decode_literal("FALSE"), PrimitiveValue::Boolean(false));
        assert_eq!(decode_literal("\"true\""), PrimitiveValue::String("true".into()));

        let text = codec().encode(&FrameValue::primitive("True")).unwrap();
        assert_eq!(text, "\"True\"");
        assert_eq!(codec().encode(&FrameValue::primitive(true)).unwrap(), "true");
    }

    #[test]
    fn strings_with_delimiters_are_quoted_and_escaped() {
        let value = FrameValue::primitive("say \"hi\" \\ (now)");
        let text = codec().encode(&value).unwrap();
        assert_eq!(text, r#""say \"hi\" \\ (now)""#);
        assert_eq!(codec().decode(&text).unwrap(), value);

        assert_eq!(codec().encode(&FrameValue::primitive("a1@platform")).unwrap(), "a1@platform");
        assert_eq!(codec().encode(&FrameValue::primitive("")).unwrap(), "\"\"");
    }

    #[test]
    fn dates_use_the_compact_profile() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap()
            + chrono::Duration::milliseconds(7);
        let text = codec().encode(&FrameValue::primitive(date)).unwrap();
        assert_eq!(text, "20240309T170542007Z");
        assert_eq!(decode_literal(&text), PrimitiveValue::Date(date));
    }

    #[test]
    fn byte_sequences_carry_their_length() {
        let value = FrameValue::primitive(vec![b'"', 0, 0xff, b')']);
        let text = codec().encode(&value).unwrap();
        assert_eq!(text, "#4\"\"\u{0}\u{ff})\"");
        assert_eq!(codec().decode(&text).unwrap(), value);
        assert!(matches!(
            codec().decode("#9\"ab\""),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn structure_round_trips() {
        let frame: FrameValue = QualifiedFrame::new("sell")
            .with("item", FrameValue::primitive("lamp"))
            .with(
                "tags",
                OrderedFrame::new(vocabulary::SEQUENCE)
                    .with(FrameValue::primitive("brass"))
                    .with(FrameValue::primitive(40_i32)),
            )
            .into();
        let text = codec().encode(&frame).unwrap();
        assert_eq!(text, "(sell :item lamp :tags (sequence brass 40))");
        assert_eq!(codec().decode(&text).unwrap(), frame);
        assert_eq!(codec().decode("  ( sell\n:item   lamp :tags (sequence brass 40) ) ").unwrap(), frame);
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(matches!(codec().decode("(sell :item lamp"), Err(CodecError::Truncated { .. })));
        assert!(matches!(codec().decode("(sell) x"), Err(CodecError::TrailingInput { position: 7 })));
        assert!(matches!(codec().decode("(sell :item)"), Err(CodecError::Malformed { .. })));
        assert!(matches!(codec().decode("(sell lamp :item x)"), Err(CodecError::Malformed { .. })));
        assert!(matches!(codec().decode("()"), Err(CodecError::Malformed { .. })));
        assert!(matches!(codec().decode(""), Err(CodecError::Truncated { .. })));
        assert!(matches!(
            TextCodec::new(CodecConfig::new(2)).decode("(a (b (c)))"),
            Err(CodecError::DepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn names_with_delimiters_cannot_be_encoded() {
        let frame: FrameValue = QualifiedFrame::new("bad name").into();
        assert!(matches!(codec().encode(&frame), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn descriptors_go_through_the_ontology() {
        let ontology = basic_ontology();
        let tree: AbsObject = AbsComposite::predicate(vocabulary::DONE)
            .with(
                vocabulary::DONE_ACTION,
                AbsComposite::agent_action("REQUEST")
                    .with(vocabulary::ACL_CONTENT, AbsObject::primitive("ping")),
            )
            .with(vocabulary::DONE_CONDITION, AbsComposite::predicate(vocabulary::TRUE_PROPOSITION))
            .into();
        let text = codec().encode_abs(&tree).unwrap();
        assert_eq!(text, "(done :action (REQUEST :content ping) :condition (true))");
        assert_eq!(codec().decode_abs(&text, &ontology).unwrap(), tree);

        let variable: AbsObject = AbsVariable::new("x").into();
        let text = codec().encode_abs(&variable).unwrap();
        assert_eq!(text, "(variable :name x)");
        assert_eq!(codec().decode_abs(&text, &ontology).unwrap(), variable);
    }

    #[test]
    fn strings_that_read_as_other_literals_are_quoted() {
        for text in ["123", "3.5", "-7", "1e5", "20240309T170542007Z", "NaN", "Infinity"] {
            let value = FrameValue::primitive(text);
            let encoded = codec().encode(&value).unwrap();
            assert_eq!(encoded, format!("\"{text}\""));
            assert_eq!(codec().decode(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn numeric_agent_names_round_trip() {
        let aid = AgentIdentifier::new("42").unwrap().with_address("7778");
        let text = codec().encode(&aid.clone().into()).unwrap();
        assert_eq!(text, r#"(agent-identifier :name "42" :addresses (sequence "7778"))"#);
        assert_eq!(codec().decode(&text).unwrap(), FrameValue::AgentIdentifier(aid));
    }

    #[test]
    fn float_words_are_strings() {
        for word in ["inf", "INF", "nan", "infinity"] {
            assert_eq!(decode_literal(word), PrimitiveValue::String(word.into()));
            assert_eq!(codec().encode(&FrameValue::primitive(word)).unwrap(), word);
        }
        assert!(matches!(decode_literal("NaN"), PrimitiveValue::Double(v) if v.is_nan()));
        assert_eq!(decode_literal("-Infinity"), PrimitiveValue::Double(f64::NEG_INFINITY));
        assert_eq!(decode_literal(".5"), PrimitiveValue::Double(0.5));
    }

    #[test]
    fn non_finite_floats_use_fixed_spellings() {
        let text = codec().encode(&FrameValue::primitive(f32::INFINITY)).unwrap();
        assert_eq!(text, "Infinity");
        assert_eq!(decode_literal(&text), PrimitiveValue::Double(f64::INFINITY));
        assert_eq!(codec().encode(&FrameValue::primitive(f64::NAN)).unwrap(), "NaN");
        assert_eq!(
            codec().encode(&FrameValue::primitive(f64::NEG_INFINITY)).unwrap(),
            "-Infinity"
        );
    }

    #[test]
    fn dates_beyond_four_digit_years_are_rejected() {
        let date = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            codec().encode(&FrameValue::primitive(date)),
            Err(CodecError::Malformed { .. })
        ));

        let date = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let text = codec().encode(&FrameValue::primitive(date)).unwrap();
        assert_eq!(decode_literal(&text), PrimitiveValue::Date(date));
    }
}
