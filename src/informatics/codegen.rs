//! Render a compiled catalog as Rust source.
//!
//! Each class becomes a struct named after its definition key with a fixed set
//! of fields. Registrable classes additionally get a `{Name}Module` envelope
//! struct with forwarding accessors for the schema's fields.

use crate::informatics::names::rust_ident;
use crate::informatics::{Catalog, Field, ModuleClass, SchemaCodec, ENVELOPE_ATTRIBUTES};
use std::fmt::Write;

fn rust_type(codec: &SchemaCodec) -> String {
    match codec {
        SchemaCodec::String | SchemaCodec::Enum(_) => "String".to_string(),
        SchemaCodec::Number => "f64".to_string(),
        SchemaCodec::Integer => "i64".to_string(),
        SchemaCodec::Boolean => "bool".to_string(),
        SchemaCodec::Array(items) => format!("Vec<{}>", rust_type(items)),
        SchemaCodec::Ref(key) => key.clone(),
        SchemaCodec::Object => "serde_json::Map<String, serde_json::Value>".to_string(),
        SchemaCodec::OneOf(_) | SchemaCodec::Any => "serde_json::Value".to_string(),
    }
}

fn field_type(field: &Field) -> String {
    let ty = rust_type(field.codec());
    if field.required || field.default.is_some() {
        ty
    } else {
        format!("Option<{ty}>")
    }
}

fn render_struct(out: &mut String, class: &ModuleClass) -> std::fmt::Result {
    writeln!(out, "/// `{}` ({})", class.name, class.module_type)?;
    writeln!(out, "#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]")?;
    if !class.additional_properties {
        writeln!(out, "#[serde(deny_unknown_fields)]")?;
    }
    writeln!(out, "pub struct {} {{", class.key)?;
    for field in &class.fields {
        let ty = field_type(field);
        if let Some(default) = &field.default {
            writeln!(out, "    /// Defaults to `{default}`.")?;
        }
        if ty.starts_with("Option<") {
            writeln!(out, "    #[serde(default, skip_serializing_if = \"Option::is_none\")]")?;
        }
        writeln!(out, "    pub {}: {},", rust_ident(field.name()), ty)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)
}

fn render_envelope(out: &mut String, class: &ModuleClass) -> std::fmt::Result {
    let Some(schema_id) = class.schema_id else {
        return Ok(());
    };
    writeln!(out, "/// Registrable `{}` module.", class.name)?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq)]")?;
    writeln!(out, "pub struct {}Module {{", class.key)?;
    writeln!(out, "    pub uid: Option<uuid::Uuid>,")?;
    writeln!(out, "    pub display_name: Option<String>,")?;
    writeln!(out, "    pub description: Option<String>,")?;
    writeln!(out, "    pub status: Option<String>,")?;
    writeln!(out, "    pub status_info: Vec<String>,")?;
    writeln!(out, "    pub tags: Vec<String>,")?;
    writeln!(out, "    pub source_id: Option<uuid::Uuid>,")?;
    writeln!(out, "    pub config: {},", class.key)?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {}Module {{", class.key)?;
    writeln!(out, "    pub const SCHEMA_ID: &'static str = \"{schema_id}\";")?;
    writeln!(out, "    pub const MODULE_TYPE: &'static str = \"{}\";", class.module_type)?;
    for field in &class.fields {
        if ENVELOPE_ATTRIBUTES.contains(&field.name()) {
            continue;
        }
        let ident = rust_ident(field.name());
        let ty = field_type(field);
        writeln!(out)?;
        writeln!(out, "    pub fn {ident}(&self) -> &{ty} {{")?;
        writeln!(out, "        &self.config.{ident}")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    pub fn set_{}(&mut self, value: {ty}) {{", field.name())?;
        writeln!(out, "        self.config.{ident} = value;")?;
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)
}

/// Rust source for every class of `catalog`.
pub fn render_module(catalog: &Catalog) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Generated from the module catalog. Do not edit.")?;
    writeln!(out)?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    writeln!(out)?;
    for class in catalog.classes() {
        render_struct(&mut out, class)?;
        render_envelope(&mut out, class)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_builtin() {
        let catalog = Catalog::builtin().unwrap();
        let source = render_module(&catalog).unwrap();

        assert!(source.contains("pub struct Paraboloid {"));
        assert!(source.contains("pub struct ParaboloidModule {"));
        assert!(source.contains("pub const SCHEMA_ID: &'static str = \"ff26b280-8a8b-46ab-b7aa-0c73ff84b0fd\";"));
        assert!(source.contains("pub output: OrionRealDescriptor,"));
        assert!(source.contains("pub inputs: Vec<OrionRealDescriptor>,"));
        assert!(source.contains("pub r#type: String,"));
        assert!(source.contains("pub fn r#type(&self) -> &String {"));
        assert!(source.contains("pub fn set_type(&mut self, value: String) {"));
        assert!(!source.contains("pub struct OrionRealDescriptorModule"));
        assert!(source.contains("    pub description: Option<String>,\n    pub status: Option<String>,"));
        assert!(!source.contains("pub fn description(&self)"));

        let registrable = source.matches("pub const SCHEMA_ID").count();
        assert_eq!(registrable, catalog.registrable().count());
        assert_eq!(source.matches('{').count(), source.matches('}').count());
    }

    #[test]
    fn test_rendered_source_parses() {
        let catalog = Catalog::builtin().unwrap();
        let source = render_module(&catalog).unwrap();
        let file = syn::parse_file(&source).unwrap();

        let structs = file
            .items
            .iter()
            .filter(|item| matches!(item, syn::Item::Struct(_)))
            .count();
        assert_eq!(structs, catalog.classes().count() + catalog.registrable().count());
    }
}
