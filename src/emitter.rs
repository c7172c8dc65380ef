//! Code generation backends
//!
//! A backend is a pure function from (schema snapshot, document set, config)
//! to declaration text. The built-in TypeScript backend emits one opaque
//! declaration per named operation; richer emission (selection-set type
//! inference) belongs to external backends behind the same trait.

use crate::config::Config;
use crate::documents::QueryDocument;
use crate::error::TypesyncResult;
use crate::schema::SchemaSnapshot;

/// Code generation backend seam
pub trait CodegenBackend {
    /// Produce the full type-definitions file content
    fn generate(
        &self,
        schema: &SchemaSnapshot,
        documents: &[&QueryDocument],
        config: &Config,
    ) -> TypesyncResult<String>;
}

/// Built-in TypeScript declaration backend
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptBackend;

impl TypeScriptBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CodegenBackend for TypeScriptBackend {
    fn generate(
        &self,
        schema: &SchemaSnapshot,
        documents: &[&QueryDocument],
        _config: &Config,
    ) -> TypesyncResult<String> {
        let mut out = String::new();
        out.push_str("/* eslint-disable */\n");
        out.push_str("/* Generated by typesync. Do not edit by hand. */\n");
        out.push_str(&format!("/* schema: {} */\n", schema.digest));

        for doc in documents {
            for op in &doc.operations {
                out.push('\n');
                out.push_str(&format!("export type {} = {{\n", op.type_name()));
                for field in &op.selections {
                    out.push_str(&format!("  readonly {}: unknown;\n", field));
                }
                out.push_str("};\n");
            }
        }

        Ok(out)
    }
}
