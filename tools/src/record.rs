//! Dynamically shaped entities.
//!
//! A [`Record`] holds members by name so a schema can be assembled from a JSON
//! list of [`FieldShape`]s without a Rust type describing the entity.

use std::collections::BTreeMap;

use anyhow::Result;
use codec::{
    CodecLimits, Field, FieldShape, RegistryConfig, Schema, SchemaBuilder, SemanticType,
    SerializerRegistry, Value,
};
use serde::Deserialize;

static NO_VALUES: Option<Vec<Option<Value>>> = None;
static EMPTY_VALUES: Vec<Option<Value>> = Vec::new();
static NO_RECORD: Option<Record> = None;
static EMPTY_RECORD: Record = Record::new();
static NO_RECORDS: Option<Vec<Record>> = None;
static EMPTY_RECORDS: Vec<Record> = Vec::new();

/// An entity whose members are looked up by name.
///
/// Absent members read as null (or empty, for required composites).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    pub scalars: BTreeMap<String, Option<Value>>,
    pub lists: BTreeMap<String, Option<Vec<Option<Value>>>>,
    pub objects: BTreeMap<String, Option<Record>>,
    pub object_lists: BTreeMap<String, Option<Vec<Record>>>,
}

impl Record {
    pub const fn new() -> Self {
        Self {
            scalars: BTreeMap::new(),
            lists: BTreeMap::new(),
            objects: BTreeMap::new(),
            object_lists: BTreeMap::new(),
        }
    }
}

/// A schema file: the member shapes plus optional registry and limits.
///
/// A bare JSON array of shapes is accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaFile {
    Full {
        #[serde(default)]
        registry: RegistryConfig,
        #[serde(default)]
        limits: CodecLimits,
        fields: Vec<FieldShape>,
    },
    Fields(Vec<FieldShape>),
}

impl SchemaFile {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the record schema described by the file.
    pub fn build(&self) -> Result<Schema<Record>> {
        let (registry, limits, fields) = match self {
            Self::Full {
                registry,
                limits,
                fields,
            } => (*registry, limits.clone(), fields.as_slice()),
            Self::Fields(fields) => (
                RegistryConfig::default(),
                CodecLimits::default(),
                fields.as_slice(),
            ),
        };
        let registry = SerializerRegistry::new(registry)?;
        let schema = record_builder(fields)?.limits(limits).build_with(&registry)?;
        Ok(schema)
    }
}

fn record_builder(shapes: &[FieldShape]) -> Result<SchemaBuilder<Record>> {
    let mut builder = Schema::builder();
    for shape in shapes {
        let field = record_field(shape)?;
        builder = builder.field(if shape.key { field.key() } else { field });
    }
    Ok(builder)
}

fn record_field(shape: &FieldShape) -> Result<Field<Record>> {
    let name = shape.name.clone();
    let nullable = shape.ty.is_nullable();
    let field = match shape.ty.non_null() {
        SemanticType::Object => {
            let nested = record_builder(&shape.fields)?;
            object_field(name, nested, nullable)
        }
        SemanticType::List(element) if **element == SemanticType::Object => {
            let nested = record_builder(&shape.fields)?;
            object_list_field(name, nested, nullable)
        }
        SemanticType::List(element) => value_list_field(name, (**element).clone(), nullable),
        _ => scalar_field(name, shape.ty.clone()),
    };
    Ok(field)
}

fn scalar_field(name: String, ty: SemanticType) -> Field<Record> {
    let get_name = name.clone();
    let set_name = name.clone();
    Field::value(
        name,
        ty,
        move |r: &Record| r.scalars.get(&get_name).cloned().flatten(),
        move |r: &mut Record, value| {
            r.scalars.insert(set_name.clone(), value);
        },
    )
}

fn value_list_field(name: String, element_ty: SemanticType, nullable: bool) -> Field<Record> {
    let get_name = name.clone();
    let mut_name = name.clone();
    if nullable {
        Field::optional_value_list(
            name,
            element_ty,
            move |r: &Record| r.lists.get(&get_name).unwrap_or(&NO_VALUES),
            move |r: &mut Record| r.lists.entry(mut_name.clone()).or_default(),
        )
    } else {
        Field::value_list(
            name,
            element_ty,
            move |r: &Record| {
                r.lists
                    .get(&get_name)
                    .and_then(Option::as_ref)
                    .unwrap_or(&EMPTY_VALUES)
            },
            move |r: &mut Record| {
                r.lists
                    .entry(mut_name.clone())
                    .or_default()
                    .get_or_insert_with(Vec::new)
            },
        )
    }
}

fn object_field(name: String, nested: SchemaBuilder<Record>, nullable: bool) -> Field<Record> {
    let get_name = name.clone();
    let mut_name = name.clone();
    if nullable {
        Field::optional_object(
            name,
            nested,
            move |r: &Record| r.objects.get(&get_name).unwrap_or(&NO_RECORD),
            move |r: &mut Record| r.objects.entry(mut_name.clone()).or_default(),
        )
    } else {
        Field::object(
            name,
            nested,
            move |r: &Record| {
                r.objects
                    .get(&get_name)
                    .and_then(Option::as_ref)
                    .unwrap_or(&EMPTY_RECORD)
            },
            move |r: &mut Record| {
                r.objects
                    .entry(mut_name.clone())
                    .or_default()
                    .get_or_insert_with(Record::default)
            },
        )
    }
}

fn object_list_field(name: String, nested: SchemaBuilder<Record>, nullable: bool) -> Field<Record> {
    let get_name = name.clone();
    let mut_name = name.clone();
    if nullable {
        Field::optional_object_list(
            name,
            nested,
            move |r: &Record| r.object_lists.get(&get_name).unwrap_or(&NO_RECORDS),
            move |r: &mut Record| r.object_lists.entry(mut_name.clone()).or_default(),
        )
    } else {
        Field::object_list(
            name,
            nested,
            move |r: &Record| {
                r.object_lists
                    .get(&get_name)
                    .and_then(Option::as_ref)
                    .unwrap_or(&EMPTY_RECORDS)
            },
            move |r: &mut Record| {
                r.object_lists
                    .entry(mut_name.clone())
                    .or_default()
                    .get_or_insert_with(Vec::new)
            },
        )
    }
}
