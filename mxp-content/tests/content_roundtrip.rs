use mxp_content::codec::{BinaryCodec, CodecConfig, CodecError, TextCodec, tags};
use mxp_content::model::{
    AbsAggregate, AbsComposite, AbsObject, AgentIdentifier, FrameValue, vocabulary,
};
use mxp_content::ontology::{Cardinality, Ontology, Presence, Schema, SchemaKind, basic_ontology};
use mxp_content::translator::{
    Action, ContentError, ContentResult, DomainObject, NativeValue, Translator,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Sell {
    item: String,
    price: Option<i32>,
    tags: Vec<NativeValue>,
}

impl DomainObject for Sell {
    fn type_name(&self) -> &str {
        "sell"
    }

    fn get(&self, slot: &str) -> Option<NativeValue> {
        match slot {
            "item" => Some(self.item.as_str().into()),
            "price" => self.price.map(NativeValue::Integer),
            "tags" if !self.tags.is_empty() => Some(NativeValue::List(self.tags.clone())),
            _ => None,
        }
    }

    fn set(&mut self, slot: &str, value: NativeValue) -> ContentResult<()> {
        match (slot, value) {
            ("item", NativeValue::String(item)) => self.item = item,
            ("price", NativeValue::Integer(price)) => self.price = Some(price),
            ("tags", NativeValue::List(tags)) => self.tags = tags,
            (slot, _) => return Err(ContentError::mapper("sell", slot, "unexpected value")),
        }
        Ok(())
    }
}

fn market() -> Ontology {
    Ontology::builder("market")
        .extends(basic_ontology())
        .add_schema(
            Schema::builder("sell", SchemaKind::AgentAction)
                .add_slot("item", vocabulary::STRING, Presence::Mandatory)
                .unwrap()
                .add_slot("price", vocabulary::INTEGER, Presence::Optional)
                .unwrap()
                .add_aggregate_slot("tags", vocabulary::STRING, "tag-list", Cardinality::new(0, None))
                .unwrap()
                .build(),
        )
        .unwrap()
        .add_schema(Schema::builder("tag-list", SchemaKind::Aggregate).build())
        .unwrap()
        .build()
}

fn translator() -> Translator {
    let translator = Translator::new();
    translator.register::<Sell>("sell").expect("register sell");
    translator
}

fn order() -> NativeValue {
    let seller = AgentIdentifier::new("seller@market")
        .unwrap()
        .with_address("http://market:7778/acc");
    Action::new(
        seller,
        NativeValue::object(Sell {
            item: "lamp".into(),
            price: Some(40),
            tags: vec!["vintage".into(), "brass".into()],
        }),
    )
    .into()
}

fn scenario_identifier() -> AgentIdentifier {
    AgentIdentifier::new("a1@platform")
        .unwrap()
        .with_address("http://platform:7778/acc")
        .with_address("http://backup:7778/acc")
}

#[test]
fn native_values_survive_the_binary_codec() {
    let ontology = market();
    let translator = translator();
    let codec = BinaryCodec::default();

    let abs = translator.to_abstract(&order(), &ontology).unwrap();
    let bytes = codec.encode(&abs).unwrap();
    let decoded = codec.decode(&bytes, &ontology).unwrap();
    assert_eq!(decoded, abs);
    assert_eq!(translator.to_native(&decoded, &ontology).unwrap(), order());
}

#[test]
fn native_values_survive_the_text_codec() {
    let ontology = market();
    let translator = translator();
    let codec = TextCodec::default();

    let abs = translator.to_abstract(&order(), &ontology).unwrap();
    let text = codec.encode_abs(&abs).unwrap();
    assert!(text.contains("(sell :item lamp :price 40 :tags (tag-list vintage brass))"));
    let decoded = codec.decode_abs(&text, &ontology).unwrap();
    assert_eq!(translator.to_native(&decoded, &ontology).unwrap(), order());
}

#[test]
fn binary_agent_identifier_keeps_address_order() {
    let aid = scenario_identifier();
    let codec = BinaryCodec::default();

    let abs: AbsObject = aid.to_abs().unwrap().into();
    let bytes = codec.encode(&abs).unwrap();
    let decoded = codec.decode(&bytes, &basic_ontology()).unwrap();
    let composite = decoded.as_composite().expect("composite");
    let recovered = AgentIdentifier::try_from_abs(composite).unwrap();
    assert_eq!(
        recovered.addresses(),
        ["http://platform:7778/acc", "http://backup:7778/acc"]
    );

    let frame = codec.decode_frame(&codec.encode_frame(&aid.clone().into()).unwrap()).unwrap();
    assert_eq!(frame, FrameValue::AgentIdentifier(aid));
}

#[test]
fn text_agent_identifier_has_a_fixed_shape() {
    let aid = scenario_identifier();
    let codec = TextCodec::default();

    let text = codec.encode(&aid.clone().into()).unwrap();
    assert_eq!(
        text,
        "(agent-identifier :name a1@platform :addresses \
         (sequence \"http://platform:7778/acc\" \"http://backup:7778/acc\"))"
    );
    assert_eq!(codec.decode(&text).unwrap(), FrameValue::AgentIdentifier(aid));
}

#[test]
fn repeated_strings_use_back_references() {
    let mut aggregate = AbsAggregate::sequence();
    aggregate.add(AbsObject::primitive("ab")).unwrap();
    aggregate.add(AbsObject::primitive("ab")).unwrap();
    let bytes = BinaryCodec::default().encode(&aggregate.into()).unwrap();

    let mut expected = vec![tags::AGGREGATE, 0, 8];
    expected.extend_from_slice(b"sequence");
    expected.extend_from_slice(&[tags::ELEMENT, tags::STRING, 0, 2, b'a', b'b']);
    expected.extend_from_slice(&[tags::ELEMENT, tags::STRING | tags::MODIFIER, 1]);
    expected.push(tags::END);
    assert_eq!(&bytes[..], &expected[..]);

    let plain = BinaryCodec::new(CodecConfig::default().with_string_table(false));
    let decoded = plain.decode(&bytes, &basic_ontology()).unwrap();
    assert_eq!(decoded.as_aggregate().map(AbsAggregate::len), Some(2));
}

#[test]
fn malformed_input_is_an_error() {
    let ontology = market();
    let abs = translator().to_abstract(&order(), &ontology).unwrap();
    let codec = BinaryCodec::default();
    let bytes = codec.encode(&abs).unwrap();

    for len in 0..bytes.len() {
        assert!(codec.decode(&bytes[..len], &ontology).is_err(), "prefix {len} decoded");
    }
    assert!(matches!(
        codec.decode(&[0xff], &ontology),
        Err(CodecError::UnexpectedTag { tag: 0xff, position: 0 })
    ));
    // A back-reference before anything was tabled.
    assert!(matches!(
        codec.decode(&[tags::OBJECT | tags::MODIFIER, 0], &ontology),
        Err(CodecError::InvalidStringIndex { index: 0, .. })
    ));

    let text = TextCodec::default();
    assert!(text.decode_abs("(sell :item lamp", &ontology).is_err());
    assert!(text.decode_abs("(haggle :item lamp)", &ontology).is_err());
    assert!(text.decode_abs("(tag-list :item lamp)", &ontology).is_err());
}

#[test]
fn unknown_content_is_rejected_by_the_translator() {
    let ontology = market();
    let abs: AbsObject = AbsComposite::agent_action("sell")
        .with("item", AbsObject::primitive("lamp"))
        .into();
    assert!(matches!(
        Translator::new().to_native(&abs, &ontology),
        Err(ContentError::UnknownSchema { .. })
    ));
}
