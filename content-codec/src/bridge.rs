//! Conversion between descriptor trees and frames, used by the textual codec.

use content_model::{
    AbsAggregate, AbsComposite, AbsContentElementList, AbsObject, AbsPrimitive, FrameValue,
    OrderedFrame, QualifiedFrame, vocabulary,
};
use content_ontology::{Ontology, SchemaKind};

use crate::error::{CodecError, CodecResult};

/// Rewrites a descriptor tree as frames. Variables become `variable`
/// qualified frames.
pub(crate) fn abs_to_frame(abs: &AbsObject) -> FrameValue {
    match abs {
        AbsObject::Primitive(primitive) => FrameValue::Primitive(primitive.value().clone()),
        AbsObject::Aggregate(aggregate) => aggregate
            .iter()
            .fold(OrderedFrame::new(aggregate.type_name()), |frame, element| {
                frame.with(abs_to_frame(element))
            })
            .into(),
        AbsObject::ContentElementList(list) => list
            .iter()
            .fold(
                OrderedFrame::new(vocabulary::CONTENT_ELEMENT_LIST),
                |frame, element| frame.with(abs_to_frame(element)),
            )
            .into(),
        AbsObject::Composite(composite) => composite
            .slots()
            .fold(QualifiedFrame::new(composite.type_name()), |frame, (name, value)| {
                frame.with(name, abs_to_frame(value))
            })
            .into(),
        AbsObject::Variable(variable) => {
            let mut frame = QualifiedFrame::new(vocabulary::VARIABLE)
                .with(vocabulary::VARIABLE_NAME, FrameValue::primitive(variable.name()));
            if let Some(value_type) = variable.value_type() {
                frame.put(vocabulary::VARIABLE_VALUE_TYPE, FrameValue::primitive(value_type));
            }
            frame.into()
        }
    }
}

/// Rebuilds a descriptor tree from frames, taking each node's kind from the
/// schema `ontology` resolves for its type name.
pub(crate) fn frame_to_abs(frame: &FrameValue, ontology: &Ontology) -> CodecResult<AbsObject> {
    match frame {
        FrameValue::Primitive(value) => Ok(AbsPrimitive::wrap(value.clone()).into()),
        FrameValue::AgentIdentifier(aid) => Ok(aid.to_abs()?.into()),
        FrameValue::Ordered(ordered) => ordered_to_abs(ordered, ontology),
        FrameValue::Qualified(qualified) => qualified_to_abs(qualified, ontology),
    }
}

fn ordered_to_abs(ordered: &OrderedFrame, ontology: &Ontology) -> CodecResult<AbsObject> {
    let name = ordered.type_name();
    let kind = if name.eq_ignore_ascii_case(vocabulary::CONTENT_ELEMENT_LIST) {
        SchemaKind::ContentElementList
    } else {
        ontology.schema(name)?.kind()
    };

    match kind {
        SchemaKind::Aggregate => {
            let mut aggregate = AbsAggregate::new(name);
            for element in ordered.iter() {
                aggregate.add(frame_to_abs(element, ontology)?)?;
            }
            Ok(aggregate.into())
        }
        SchemaKind::ContentElementList => {
            let mut list = AbsContentElementList::new();
            for element in ordered.iter() {
                list.add(frame_to_abs(element, ontology)?)?;
            }
            Ok(list.into())
        }
        // `(true)` has no slots, so it parses as an empty ordered frame.
        _ if ordered.is_empty() => qualified_to_abs(&QualifiedFrame::new(name), ontology),
        other => Err(CodecError::malformed(
            0,
            format!("`{name}` is a {other:?} schema but has positional elements"),
        )),
    }
}

fn qualified_to_abs(qualified: &QualifiedFrame, ontology: &Ontology) -> CodecResult<AbsObject> {
    let name = qualified.type_name();
    let schema = ontology.schema(name)?;
    let mut object: AbsObject = if let Some(kind) = schema.kind().composite_kind() {
        AbsComposite::new(kind, name).into()
    } else if schema.kind() == SchemaKind::Variable {
        schema.new_instance()?
    } else {
        return Err(CodecError::malformed(
            0,
            format!("`{name}` is a {:?} schema but has named slots", schema.kind()),
        ));
    };
    for (slot, value) in qualified.slots() {
        object.set_slot(slot, frame_to_abs(value, ontology)?)?;
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use content_model::AbsVariable;
    use content_ontology::basic_ontology;

    use super::*;

    #[test]
    fn descriptors_survive_the_frame_detour() {
        let ontology = basic_ontology();
        let mut list = AbsContentElementList::new();
        list.add(AbsComposite::predicate(vocabulary::TRUE_PROPOSITION))
            .unwrap();
        list.add(
            AbsComposite::predicate(vocabulary::EQUALS)
                .with(vocabulary::EQUALS_LEFT, AbsVariable::new("x").with_value_type("BO_String"))
                .with(vocabulary::EQUALS_RIGHT, AbsObject::primitive("y")),
        )
        .unwrap();
        let tree: AbsObject = list.into();

        let frame = abs_to_frame(&tree);
        assert_eq!(frame_to_abs(&frame, &ontology).unwrap(), tree);
    }

    #[test]
    fn slots_on_aggregates_are_rejected() {
        let frame = FrameValue::Qualified(
            QualifiedFrame::new(vocabulary::SEQUENCE).with("a", FrameValue::primitive(1_i32)),
        );
        assert!(matches!(
            frame_to_abs(&frame, &basic_ontology()),
            Err(CodecError::Malformed { .. })
        ));
    }
}
