//! Reserved type and slot names shared by every content crate.
//!
//! These strings travel on the wire; changing any of them breaks interop with
//! remote peers.

/// Primitive string type name.
pub const STRING: &str = "BO_String";
/// Primitive boolean type name.
pub const BOOLEAN: &str = "BO_Boolean";
/// Primitive integer type name (32- and 64-bit).
pub const INTEGER: &str = "BO_Integer";
/// Primitive floating-point type name (single and double precision).
pub const FLOAT: &str = "BO_Float";
/// Primitive date type name.
pub const DATE: &str = "BO_Date";
/// Primitive byte-sequence type name.
pub const BYTE_SEQUENCE: &str = "BO_Byte-sequence";

/// Ordered aggregate type name.
pub const SEQUENCE: &str = "sequence";
/// Unordered aggregate type name.
pub const SET: &str = "set";
/// Type name of a bundle of independent content elements.
pub const CONTENT_ELEMENT_LIST: &str = "content-element-list";

/// Variable type name.
pub const VARIABLE: &str = "variable";
/// Variable name slot.
pub const VARIABLE_NAME: &str = "name";
/// Variable value-type slot.
pub const VARIABLE_VALUE_TYPE: &str = "value-type";

/// Abstract base matching any term.
pub const TERM: &str = "Term";
/// Abstract base of every concept.
pub const CONCEPT: &str = "Concept";
/// Abstract base of every predicate.
pub const PREDICATE: &str = "Predicate";
/// Abstract base of every agent action.
pub const AGENT_ACTION: &str = "AgentAction";

/// Reserved agent identifier type name.
pub const AGENT_IDENTIFIER: &str = "agent-identifier";
/// Agent identifier name slot.
pub const AID_NAME: &str = "name";
/// Agent identifier transport addresses slot.
pub const AID_ADDRESSES: &str = "addresses";
/// Agent identifier resolvers slot.
pub const AID_RESOLVERS: &str = "resolvers";

/// Property concept type name.
pub const PROPERTY: &str = "property";
/// Property name slot.
pub const PROPERTY_NAME: &str = "name";
/// Property value slot.
pub const PROPERTY_VALUE: &str = "value";

/// Always-true proposition.
pub const TRUE_PROPOSITION: &str = "true";
/// Always-false proposition.
pub const FALSE_PROPOSITION: &str = "false";

/// `done` predicate type name.
pub const DONE: &str = "done";
/// Action performed, for `done`.
pub const DONE_ACTION: &str = "action";
/// Optional condition under which the action was performed.
pub const DONE_CONDITION: &str = "condition";

/// `result` predicate type name.
pub const RESULT: &str = "result";
/// Action whose result is reported.
pub const RESULT_ACTION: &str = "action";
/// Result value.
pub const RESULT_VALUE: &str = "value";

/// Equality predicate type name.
pub const EQUALS: &str = "=";
/// Left operand of `=`.
pub const EQUALS_LEFT: &str = "left";
/// Right operand of `=`.
pub const EQUALS_RIGHT: &str = "right";

/// Action wrapper type name.
pub const ACTION: &str = "action";
/// Agent performing the action.
pub const ACTION_ACTOR: &str = "actor";
/// Agent action being performed.
pub const ACTION_ACTION: &str = "action";

/// Base schema of every communicative act.
pub const ACL_MESSAGE: &str = "ACLMsg";
/// Sender of a communicative act.
pub const ACL_SENDER: &str = "sender";
/// Receivers of a communicative act.
pub const ACL_RECEIVERS: &str = "receivers";
/// Agents replies should be sent to.
pub const ACL_REPLY_TO: &str = "reply-to";
/// Message content.
pub const ACL_CONTENT: &str = "content";
/// Content language.
pub const ACL_LANGUAGE: &str = "language";
/// Content encoding.
pub const ACL_ENCODING: &str = "encoding";
/// Content ontology.
pub const ACL_ONTOLOGY: &str = "ontology";
/// Interaction protocol.
pub const ACL_PROTOCOL: &str = "protocol";
/// Conversation identifier.
pub const ACL_CONVERSATION_ID: &str = "conversation-id";
/// Reply correlation.
pub const ACL_IN_REPLY_TO: &str = "in-reply-to";
/// Expected reply tag.
pub const ACL_REPLY_WITH: &str = "reply-with";
/// Reply deadline.
pub const ACL_REPLY_BY: &str = "reply-by";

/// Communicative-act performatives that resolve to derived message schemas.
pub const PERFORMATIVES: [&str; 22] = [
    "ACCEPT-PROPOSAL",
    "AGREE",
    "CANCEL",
    "CFP",
    "CONFIRM",
    "DISCONFIRM",
    "FAILURE",
    "INFORM",
    "INFORM-IF",
    "INFORM-REF",
    "NOT-UNDERSTOOD",
    "PROPAGATE",
    "PROPOSE",
    "PROXY",
    "QUERY-IF",
    "QUERY-REF",
    "REFUSE",
    "REJECT-PROPOSAL",
    "REQUEST",
    "REQUEST-WHEN",
    "REQUEST-WHENEVER",
    "SUBSCRIBE",
];

/// Returns `true` when `name` denotes the reserved agent identifier type.
#[must_use]
pub fn is_agent_identifier(name: &str) -> bool {
    name.eq_ignore_ascii_case(AGENT_IDENTIFIER)
}
