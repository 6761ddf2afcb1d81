//! Ontology registry: type-name and native-type lookup of schemas.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use content_model::PrimitiveKind;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;

/// Synthesises schemas for names that are recognised but not registered up
/// front, such as one message schema per communicative-act performative.
///
/// Derivers run under the ontology's derivation lock and must not look up
/// other derived schemas of the same ontology.
pub trait SchemaDeriver: Send + Sync {
    /// Returns the schema for `name`, or `Ok(None)` when the name is not one
    /// this deriver recognises.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the name is recognised but its schema
    /// cannot be built.
    fn derive(&self, name: &str, ontology: &Ontology) -> SchemaResult<Option<Schema>>;
}

/// Memoising resolver for derived schemas. Reads are shared; creation is
/// serialised so that one schema is built per name.
#[derive(Default)]
struct DerivedSchemas {
    cache: RwLock<HashMap<String, Arc<Schema>>>,
}

impl DerivedSchemas {
    fn get_or_derive(
        &self,
        key: &str,
        derive: impl FnOnce() -> SchemaResult<Option<Schema>>,
    ) -> SchemaResult<Option<Arc<Schema>>> {
        if let Some(schema) = self
            .cache
            .read()
            .expect("derived schema cache poisoned")
            .get(key)
        {
            return Ok(Some(Arc::clone(schema)));
        }

        let mut cache = self.cache.write().expect("derived schema cache poisoned");
        if let Some(schema) = cache.get(key) {
            return Ok(Some(Arc::clone(schema)));
        }
        let Some(schema) = derive()? else {
            return Ok(None);
        };
        let schema = Arc::new(schema);
        cache.insert(key.to_owned(), Arc::clone(&schema));
        debug!(schema = schema.name(), "derived schema materialised");
        Ok(Some(schema))
    }

    fn len(&self) -> usize {
        self.cache.read().expect("derived schema cache poisoned").len()
    }
}

/// Named registry of schemas, optionally extending base ontologies.
///
/// Built once through [`OntologyBuilder`] and immutable afterwards, apart from
/// the derived-schema cache. Safe to share across threads.
pub struct Ontology {
    name: String,
    bases: Vec<Arc<Ontology>>,
    schemas: HashMap<String, Arc<Schema>>,
    native_bindings: HashMap<TypeId, String>,
    derivers: Vec<Arc<dyn SchemaDeriver>>,
    derived: DerivedSchemas,
}

impl fmt::Debug for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<_> = self.bases.iter().map(|base| base.name()).collect();
        f.debug_struct("Ontology")
            .field("name", &self.name)
            .field("bases", &bases)
            .field("schemas", &self.schemas.len())
            .field("derived", &self.derived.len())
            .finish_non_exhaustive()
    }
}

impl Ontology {
    /// Starts building an ontology.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> OntologyBuilder {
        OntologyBuilder {
            ontology: Self {
                name: name.into(),
                bases: Vec::new(),
                schemas: HashMap::new(),
                native_bindings: HashMap::new(),
                derivers: Vec::new(),
                derived: DerivedSchemas::default(),
            },
        }
    }

    /// Returns the ontology name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base ontologies in lookup order.
    #[must_use]
    pub fn bases(&self) -> &[Arc<Ontology>] {
        &self.bases
    }

    /// Resolves a schema by type name, case-insensitively.
    ///
    /// Registered schemas are consulted first, then this ontology's derivers,
    /// then each base ontology in order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaNotFound`] when no schema resolves, or the
    /// error of a deriver that recognised the name but failed to build it.
    pub fn schema(&self, name: &str) -> SchemaResult<Arc<Schema>> {
        self.find(&name.to_ascii_lowercase())?
            .ok_or_else(|| SchemaError::not_found(name))
    }

    fn find(&self, key: &str) -> SchemaResult<Option<Arc<Schema>>> {
        if let Some(schema) = self.schemas.get(key) {
            return Ok(Some(Arc::clone(schema)));
        }
        if !self.derivers.is_empty() {
            let derived = self.derived.get_or_derive(key, || {
                for deriver in &self.derivers {
                    if let Some(schema) = deriver.derive(key, self)? {
                        return Ok(Some(schema));
                    }
                }
                Ok(None)
            })?;
            if derived.is_some() {
                return Ok(derived);
            }
        }
        for base in &self.bases {
            if let Some(schema) = base.find(key)? {
                return Ok(Some(schema));
            }
        }
        Ok(None)
    }

    /// Resolves the schema bound to the native type `T`.
    ///
    /// Primitive Rust types are looked up in a fixed table first, so that every
    /// integer width resolves to the integer schema and both float precisions
    /// to the float schema; declared bindings are consulted next, then bases.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NativeTypeNotBound`] when no binding exists.
    pub fn schema_for<T: 'static>(&self) -> SchemaResult<Arc<Schema>> {
        let id = TypeId::of::<T>();
        if let Some(kind) = primitive_kind_of(id) {
            return self.schema(kind.type_name());
        }
        self.find_binding(id)
            .ok_or_else(|| SchemaError::NativeTypeNotBound {
                type_name: type_name::<T>().to_owned(),
            })
            .and_then(|name| self.schema(&name))
    }

    fn find_binding(&self, id: TypeId) -> Option<String> {
        self.native_bindings
            .get(&id)
            .cloned()
            .or_else(|| self.bases.iter().find_map(|base| base.find_binding(id)))
    }

    /// Returns the names of the schemas registered directly on this ontology,
    /// sorted. Derived and inherited schemas are not listed.
    #[must_use]
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.schemas.values().map(|s| s.name()).collect();
        names.sort_unstable();
        names
    }
}

/// Builder for [`Ontology`].
pub struct OntologyBuilder {
    ontology: Ontology,
}

impl fmt::Debug for OntologyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OntologyBuilder")
            .field("ontology", &self.ontology)
            .finish()
    }
}

impl OntologyBuilder {
    /// Adds a base ontology consulted when a lookup misses.
    #[must_use]
    pub fn extends(mut self, base: Arc<Ontology>) -> Self {
        self.ontology.bases.push(base);
        self
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] when a schema with the same
    /// name (ignoring case) is already registered on this ontology.
    pub fn add_schema(mut self, schema: Schema) -> SchemaResult<Self> {
        let key = schema.name().to_ascii_lowercase();
        if self.ontology.schemas.contains_key(&key) {
            return Err(SchemaError::DuplicateSchema {
                name: schema.name().to_owned(),
            });
        }
        self.ontology.schemas.insert(key, Arc::new(schema));
        Ok(self)
    }

    /// Registers a schema and binds it to the native type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] as for
    /// [`add_schema`](Self::add_schema).
    pub fn add_schema_for<T: 'static>(self, schema: Schema) -> SchemaResult<Self> {
        let name = schema.name().to_owned();
        let mut builder = self.add_schema(schema)?;
        builder
            .ontology
            .native_bindings
            .insert(TypeId::of::<T>(), name);
        Ok(builder)
    }

    /// Installs a deriver for lazily created schemas.
    #[must_use]
    pub fn with_deriver(mut self, deriver: Arc<dyn SchemaDeriver>) -> Self {
        self.ontology.derivers.push(deriver);
        self
    }

    /// Returns a registered schema, for building schemas that extend or
    /// reference it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaNotFound`] when no schema resolves.
    pub fn schema(&self, name: &str) -> SchemaResult<Arc<Schema>> {
        self.ontology.schema(name)
    }

    /// Finalises the ontology.
    #[must_use]
    pub fn build(self) -> Ontology {
        self.ontology
    }
}

fn primitive_kind_of(id: TypeId) -> Option<PrimitiveKind> {
    let table = [
        (TypeId::of::<String>(), PrimitiveKind::String),
        (TypeId::of::<&'static str>(), PrimitiveKind::String),
        (TypeId::of::<bool>(), PrimitiveKind::Boolean),
        (TypeId::of::<i8>(), PrimitiveKind::Integer),
        (TypeId::of::<i16>(), PrimitiveKind::Integer),
        (TypeId::of::<i32>(), PrimitiveKind::Integer),
        (TypeId::of::<i64>(), PrimitiveKind::Integer),
        (TypeId::of::<u8>(), PrimitiveKind::Integer),
        (TypeId::of::<u16>(), PrimitiveKind::Integer),
        (TypeId::of::<u32>(), PrimitiveKind::Integer),
        (TypeId::of::<f32>(), PrimitiveKind::Float),
        (TypeId::of::<f64>(), PrimitiveKind::Float),
        (TypeId::of::<DateTime<Utc>>(), PrimitiveKind::Date),
        (TypeId::of::<Vec<u8>>(), PrimitiveKind::ByteSequence),
        (TypeId::of::<Bytes>(), PrimitiveKind::ByteSequence),
    ];
    table
        .into_iter()
        .find_map(|(candidate, kind)| (candidate == id).then_some(kind))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use content_model::vocabulary;

    use super::*;
    use crate::schema::{Presence, SchemaKind};

    #[derive(Default)]
    struct CountingDeriver {
        calls: AtomicUsize,
    }

    impl SchemaDeriver for CountingDeriver {
        fn derive(&self, name: &str, _ontology: &Ontology) -> SchemaResult<Option<Schema>> {
            if !name.starts_with("gen-") {
                return Ok(None);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Schema::builder(name, SchemaKind::Concept).build()))
        }
    }

    struct Book;

    fn base() -> Arc<Ontology> {
        let ontology = Ontology::builder("base")
            .add_schema(Schema::builder(vocabulary::STRING, SchemaKind::Primitive).build())
            .unwrap()
            .add_schema(Schema::builder(vocabulary::INTEGER, SchemaKind::Primitive).build())
            .unwrap()
            .add_schema(Schema::builder(vocabulary::FLOAT, SchemaKind::Primitive).build())
            .unwrap()
            .build();
        Arc::new(ontology)
    }

    #[test]
    fn lookups_fall_through_to_bases_case_insensitively() {
        let ontology = Ontology::builder("library")
            .extends(base())
            .add_schema(
                Schema::builder("Book", SchemaKind::Concept)
                    .add_slot("title", vocabulary::STRING, Presence::Mandatory)
                    .unwrap()
                    .build(),
            )
            .unwrap()
            .build();

        assert_eq!(ontology.schema("book").unwrap().name(), "Book");
        assert_eq!(
            ontology.schema("bo_string").unwrap().name(),
            vocabulary::STRING
        );
        assert!(matches!(
            ontology.schema("magazine"),
            Err(SchemaError::SchemaNotFound { name }) if name == "magazine"
        ));
    }

    #[test]
    fn duplicate_schema_is_rejected() {
        let err = Ontology::builder("dup")
            .add_schema(Schema::builder("book", SchemaKind::Concept).build())
            .unwrap()
            .add_schema(Schema::builder("BOOK", SchemaKind::Concept).build())
            .expect_err("duplicate");
        assert!(matches!(err, SchemaError::DuplicateSchema { .. }));
    }

    #[test]
    fn native_types_resolve_through_table_then_bindings() {
        let ontology = Ontology::builder("library")
            .extends(base())
            .add_schema_for::<Book>(Schema::builder("book", SchemaKind::Concept).build())
            .unwrap()
            .build();

        for schema in [
            ontology.schema_for::<i32>().unwrap(),
            ontology.schema_for::<i64>().unwrap(),
        ] {
            assert_eq!(schema.name(), vocabulary::INTEGER);
        }
        assert_eq!(ontology.schema_for::<f32>().unwrap().name(), vocabulary::FLOAT);
        assert_eq!(ontology.schema_for::<f64>().unwrap().name(), vocabulary::FLOAT);
        assert_eq!(ontology.schema_for::<Book>().unwrap().name(), "book");

        let child = Ontology::builder("child")
            .extends(Arc::new(ontology))
            .build();
        assert_eq!(child.schema_for::<Book>().unwrap().name(), "book");
        assert!(matches!(
            child.schema_for::<Vec<String>>(),
            Err(SchemaError::NativeTypeNotBound { .. })
        ));
    }

    #[test]
    fn derived_schemas_are_created_once_under_contention() {
        let deriver = Arc::new(CountingDeriver::default());
        let ontology = Arc::new(
            Ontology::builder("generated")
                .with_deriver(Arc::clone(&deriver) as Arc<dyn SchemaDeriver>)
                .build(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ontology = Arc::clone(&ontology);
                thread::spawn(move || ontology.schema("gen-widget").unwrap())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(deriver.calls.load(Ordering::SeqCst), 1);
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(ontology.schema("plain").is_err());
    }
}
