//! Agent identifier types.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::descriptor::{AbsAggregate, AbsComposite, AbsObject};
use crate::error::{Error, Result};
use crate::frame::{FrameValue, OrderedFrame, QualifiedFrame};
use crate::primitive::PrimitiveValue;
use crate::vocabulary;

/// Identifier of an agent: a globally unique name, the transport addresses it
/// can be reached at, and the agents that can resolve it.
///
/// Resolver chains must not loop back to the identifier itself; this is not
/// checked.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AgentIdentifierFields")]
pub struct AgentIdentifier {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resolvers: Vec<AgentIdentifier>,
}

/// Unchecked serde form; deserialisation goes through [`AgentIdentifier::new`].
#[derive(Deserialize)]
struct AgentIdentifierFields {
    name: String,
    #[serde(default)]
    addresses: Vec<String>,
    #[serde(default)]
    resolvers: Vec<AgentIdentifier>,
}

impl TryFrom<AgentIdentifierFields> for AgentIdentifier {
    type Error = Error;

    fn try_from(fields: AgentIdentifierFields) -> Result<Self> {
        let mut aid = Self::new(fields.name)?;
        aid.addresses = fields.addresses;
        aid.resolvers = fields.resolvers;
        Ok(aid)
    }
}

impl AgentIdentifier {
    /// Creates an identifier with the given globally unique name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAgentIdentifier`] when the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_agent_identifier("name cannot be empty"));
        }
        Ok(Self {
            name,
            addresses: Vec::new(),
            resolvers: Vec::new(),
        })
    }

    /// Appends a transport address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }

    /// Appends a resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: AgentIdentifier) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Returns the globally unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the part of the name before the platform separator.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .split_once('@')
            .map_or(self.name.as_str(), |(local, _)| local)
    }

    /// Returns the platform part of the name, if any.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.name.split_once('@').map(|(_, platform)| platform)
    }

    /// Returns the transport addresses in order.
    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Returns the resolvers in order.
    #[must_use]
    pub fn resolvers(&self) -> &[AgentIdentifier] {
        &self.resolvers
    }

    /// Rewrites the identifier as the reserved `agent-identifier` qualified
    /// frame. Empty address and resolver lists are omitted.
    #[must_use]
    pub fn to_frame(&self) -> QualifiedFrame {
        let mut frame = QualifiedFrame::new(vocabulary::AGENT_IDENTIFIER)
            .with(vocabulary::AID_NAME, FrameValue::primitive(self.name.as_str()));
        if !self.addresses.is_empty() {
            let addresses = self
                .addresses
                .iter()
                .fold(OrderedFrame::new(vocabulary::SEQUENCE), |seq, address| {
                    seq.with(FrameValue::primitive(address.as_str()))
                });
            frame.put(vocabulary::AID_ADDRESSES, addresses);
        }
        if !self.resolvers.is_empty() {
            let resolvers = self
                .resolvers
                .iter()
                .fold(OrderedFrame::new(vocabulary::SEQUENCE), |seq, resolver| {
                    seq.with(resolver.to_frame())
                });
            frame.put(vocabulary::AID_RESOLVERS, resolvers);
        }
        frame
    }

    /// Recovers an identifier from its reserved qualified frame. Resolvers may
    /// be nested frames or native identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAgentIdentifier`] when the frame is not an
    /// `agent-identifier` frame or a slot has the wrong shape.
    pub fn try_from_frame(frame: &QualifiedFrame) -> Result<Self> {
        if !vocabulary::is_agent_identifier(frame.type_name()) {
            return Err(Error::invalid_agent_identifier(format!(
                "unexpected frame type `{}`",
                frame.type_name()
            )));
        }
        let name = match frame.get(vocabulary::AID_NAME) {
            Some(FrameValue::Primitive(PrimitiveValue::String(name))) => name.clone(),
            _ => return Err(Error::invalid_agent_identifier("missing string `name` slot")),
        };
        let mut aid = Self::new(name)?;

        match frame.get(vocabulary::AID_ADDRESSES) {
            None => {}
            Some(FrameValue::Ordered(seq)) => {
                for element in seq.iter() {
                    let Some(PrimitiveValue::String(address)) = element.as_primitive() else {
                        return Err(Error::invalid_agent_identifier(
                            "addresses must be strings",
                        ));
                    };
                    aid.addresses.push(address.clone());
                }
            }
            Some(_) => {
                return Err(Error::invalid_agent_identifier(
                    "addresses must be a sequence",
                ));
            }
        }

        match frame.get(vocabulary::AID_RESOLVERS) {
            None => {}
            Some(FrameValue::Ordered(seq)) => {
                for element in seq.iter() {
                    let resolver = match element {
                        FrameValue::AgentIdentifier(resolver) => resolver.clone(),
                        FrameValue::Qualified(inner) => Self::try_from_frame(inner)?,
                        _ => {
                            return Err(Error::invalid_agent_identifier(
                                "resolvers must be agent identifiers",
                            ));
                        }
                    };
                    aid.resolvers.push(resolver);
                }
            }
            Some(_) => {
                return Err(Error::invalid_agent_identifier(
                    "resolvers must be a sequence",
                ));
            }
        }

        Ok(aid)
    }

    /// Rewrites the identifier as the reserved `agent-identifier` concept.
    /// Empty address and resolver lists are omitted.
    ///
    /// # Errors
    ///
    /// Propagates aggregate insertion failures; identifiers always insert terms,
    /// so this only fails on internal inconsistency.
    pub fn to_abs(&self) -> Result<AbsComposite> {
        let mut abs = AbsComposite::concept(vocabulary::AGENT_IDENTIFIER)
            .with(vocabulary::AID_NAME, AbsObject::primitive(self.name.as_str()));
        if !self.addresses.is_empty() {
            let mut addresses = AbsAggregate::sequence();
            for address in &self.addresses {
                addresses.add(AbsObject::primitive(address.as_str()))?;
            }
            abs.set(vocabulary::AID_ADDRESSES, addresses);
        }
        if !self.resolvers.is_empty() {
            let mut resolvers = AbsAggregate::sequence();
            for resolver in &self.resolvers {
                resolvers.add(resolver.to_abs()?)?;
            }
            abs.set(vocabulary::AID_RESOLVERS, resolvers);
        }
        Ok(abs)
    }

    /// Recovers an identifier from its reserved concept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAgentIdentifier`] when the composite is not an
    /// `agent-identifier` or a slot has the wrong shape.
    pub fn try_from_abs(abs: &AbsComposite) -> Result<Self> {
        if !vocabulary::is_agent_identifier(abs.type_name()) {
            return Err(Error::invalid_agent_identifier(format!(
                "unexpected descriptor type `{}`",
                abs.type_name()
            )));
        }
        let name = abs
            .get(vocabulary::AID_NAME)
            .and_then(AbsObject::as_primitive)
            .and_then(|p| p.value().as_str())
            .ok_or_else(|| Error::invalid_agent_identifier("missing string `name` slot"))?;
        let mut aid = Self::new(name)?;

        if let Some(addresses) = abs.get(vocabulary::AID_ADDRESSES) {
            let addresses = addresses
                .as_aggregate()
                .ok_or_else(|| Error::invalid_agent_identifier("addresses must be a sequence"))?;
            for element in addresses.iter() {
                let address = element
                    .as_primitive()
                    .and_then(|p| p.value().as_str())
                    .ok_or_else(|| Error::invalid_agent_identifier("addresses must be strings"))?;
                aid.addresses.push(address.to_owned());
            }
        }

        if let Some(resolvers) = abs.get(vocabulary::AID_RESOLVERS) {
            let resolvers = resolvers
                .as_aggregate()
                .ok_or_else(|| Error::invalid_agent_identifier("resolvers must be a sequence"))?;
            for element in resolvers.iter() {
                let resolver = element.as_composite().ok_or_else(|| {
                    Error::invalid_agent_identifier("resolvers must be agent identifiers")
                })?;
                aid.resolvers.push(Self::try_from_abs(resolver)?);
            }
        }

        Ok(aid)
    }
}

impl Display for AgentIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.name, f)
    }
}

impl TryFrom<&QualifiedFrame> for AgentIdentifier {
    type Error = Error;

    fn try_from(frame: &QualifiedFrame) -> Result<Self> {
        Self::try_from_frame(frame)
    }
}

impl TryFrom<&AbsComposite> for AgentIdentifier {
    type Error = Error;

    fn try_from(abs: &AbsComposite) -> Result<Self> {
        Self::try_from_abs(abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> AgentIdentifier {
        let df = AgentIdentifier::new("df@platform")
            .unwrap()
            .with_address("http://platform:7778/acc");
        let ams = AgentIdentifier::new("ams@platform")
            .unwrap()
            .with_resolver(df);
        AgentIdentifier::new("a1@platform")
            .unwrap()
            .with_address("http://host1:7778/acc")
            .with_address("http://host2:7778/acc")
            .with_resolver(ams)
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = AgentIdentifier::new("  ").expect_err("empty");
        assert!(matches!(err, Error::InvalidAgentIdentifier { .. }));
    }

    #[test]
    fn name_parts() {
        let aid = AgentIdentifier::new("a1@platform").unwrap();
        assert_eq!(aid.local_name(), "a1");
        assert_eq!(aid.platform(), Some("platform"));
        assert_eq!(aid.to_string(), "a1@platform");
        assert_eq!(AgentIdentifier::new("solo").unwrap().platform(), None);
    }

    #[test]
    fn frame_round_trip_with_nested_resolvers() {
        let aid = nested();
        let frame = aid.to_frame();
        assert_eq!(frame.type_name(), vocabulary::AGENT_IDENTIFIER);
        assert_eq!(AgentIdentifier::try_from_frame(&frame).unwrap(), aid);
    }

    #[test]
    fn frame_accepts_native_resolvers_and_any_case() {
        let resolver = AgentIdentifier::new("ams@platform").unwrap();
        let frame = QualifiedFrame::new("Agent-Identifier")
            .with(vocabulary::AID_NAME, FrameValue::primitive("a1@platform"))
            .with(
                vocabulary::AID_RESOLVERS,
                OrderedFrame::new(vocabulary::SEQUENCE).with(resolver.clone()),
            );
        let aid = AgentIdentifier::try_from_frame(&frame).unwrap();
        assert_eq!(aid.resolvers(), [resolver]);
    }

    #[test]
    fn abs_round_trip_preserves_address_order() {
        let aid = nested();
        let abs = aid.to_abs().unwrap();
        let names: Vec<_> = abs.names().collect();
        assert_eq!(names, ["name", "addresses", "resolvers"]);
        assert_eq!(AgentIdentifier::try_from_abs(&abs).unwrap(), aid);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let missing_name = QualifiedFrame::new(vocabulary::AGENT_IDENTIFIER);
        assert!(AgentIdentifier::try_from_frame(&missing_name).is_err());

        let bad_addresses = QualifiedFrame::new(vocabulary::AGENT_IDENTIFIER)
            .with(vocabulary::AID_NAME, FrameValue::primitive("a"))
            .with(vocabulary::AID_ADDRESSES, FrameValue::primitive("not-a-list"));
        assert!(AgentIdentifier::try_from_frame(&bad_addresses).is_err());
    }

    #[test]
    fn deserialising_checks_the_name() {
        let aid: AgentIdentifier = serde_json::from_str(
            r#"{"name":"a1@platform","addresses":["http://host1:7778/acc"]}"#,
        )
        .expect("valid identifier");
        assert_eq!(aid.addresses(), ["http://host1:7778/acc"]);
        assert!(aid.resolvers().is_empty());

        let err = serde_json::from_str::<AgentIdentifier>(r#"{"name":"  "}"#)
            .expect_err("blank name");
        assert!(err.to_string().contains("name cannot be empty"));
        assert!(serde_json::from_str::<AgentIdentifier>(
            r#"{"name":"a1","resolvers":[{"name":""}]}"#
        )
        .is_err());
    }

    #[test]
    fn serialised_form_round_trips() {
        let aid = nested();
        let json = serde_json::to_string(&aid).unwrap();
        assert_eq!(serde_json::from_str::<AgentIdentifier>(&json).unwrap(), aid);
    }
}
