//! Structural description of a schema's fields.

use crate::types::SemanticType;

/// One field of a schema as seen from outside the codec.
///
/// For objects and lists of objects, `fields` describes the nested schema in
/// wire order. Primitive fields leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldShape {
    pub name: String,
    pub ty: SemanticType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub fields: Vec<FieldShape>,
}

impl FieldShape {
    /// A primitive field.
    #[must_use]
    pub fn primitive(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            key: false,
            fields: Vec::new(),
        }
    }

    /// A field whose type carries a nested schema.
    #[must_use]
    pub fn nested(name: impl Into<String>, ty: SemanticType, fields: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            ty,
            key: false,
            fields,
        }
    }

    /// Marks the field as a key member.
    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Returns `true` if the field's (possibly nullable) type is an object or
    /// a list of objects.
    #[must_use]
    pub fn has_nested_schema(&self) -> bool {
        match self.ty.non_null() {
            SemanticType::Object => true,
            SemanticType::List(element) => matches!(element.non_null(), SemanticType::Object),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_detection() {
        let obj = FieldShape::nested("Pos", SemanticType::nullable(SemanticType::Object), vec![]);
        assert!(obj.has_nested_schema());
        let list = FieldShape::nested("Items", SemanticType::list(SemanticType::Object), vec![]);
        assert!(list.has_nested_schema());
        let prims = FieldShape::primitive("Tags", SemanticType::list(SemanticType::String));
        assert!(!prims.has_nested_schema());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_shape() {
        let json = r#"[
            {"name": "Id", "ty": "u32", "key": true},
            {"name": "Tag", "ty": {"nullable": "string"}},
            {"name": "Pos", "ty": "object", "fields": [{"name": "X", "ty": "f32"}]}
        ]"#;
        let shapes: Vec<FieldShape> = serde_json::from_str(json).unwrap();
        assert_eq!(shapes[0], FieldShape::primitive("Id", SemanticType::U32).key());
        assert_eq!(shapes[1].ty, SemanticType::nullable(SemanticType::String));
        assert_eq!(shapes[2].fields.len(), 1);
    }
}
