//! JSON Schema validation at the ingress boundary.
//!
//! The classification engine delivers outcomes as loosely typed JSON.
//! `SchemaIngressValidator` pins that boundary down with an explicit
//! schema — required fields, types, non-empty strings — before an
//! `IngestRequest` is ever constructed.  All violations are collected
//! into one message so the engine operator sees the full failure set in
//! one pass.

use jsonschema::Validator;
use serde_json::json;
use tracing::warn;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    event::IngestRequest,
};
use scorechain_core::traits::IngressValidator;

/// Ingress validator backed by a compiled JSON Schema.
pub struct SchemaIngressValidator {
    validator: Validator,
}

impl SchemaIngressValidator {
    /// Compile the classification-event schema.
    ///
    /// The schema is a fixed document; compilation can only fail on a
    /// schema authoring mistake, which `Config` surfaces at startup
    /// rather than per event.
    pub fn new() -> LedgerResult<Self> {
        let schema = json!({
            "type": "object",
            "required": ["identity", "attack_type", "malicious"],
            "properties": {
                "identity": { "type": "string", "minLength": 1 },
                "attack_type": { "type": "string", "minLength": 1 },
                "malicious": { "type": "boolean" },
                "event_id": { "type": "string" }
            },
            "additionalProperties": false
        });
        let validator = jsonschema::validator_for(&schema).map_err(|e| LedgerError::Config {
            reason: format!("invalid ingress schema: {}", e),
        })?;
        Ok(Self { validator })
    }
}

impl IngressValidator for SchemaIngressValidator {
    /// Validate `raw` and extract the typed `IngestRequest`.
    ///
    /// Structural violations (and a malformed `event_id` UUID, caught
    /// during extraction) are `SchemaValidation` errors; nothing
    /// reaches the scoring or storage layers.
    fn validate(&self, raw: &serde_json::Value) -> LedgerResult<IngestRequest> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(raw)
            .map(|error| format!("{} at {}", error, error.instance_path))
            .collect();

        if !violations.is_empty() {
            let reason = violations.join("; ");
            warn!(%reason, "classification event rejected at ingress");
            return Err(LedgerError::SchemaValidation { reason });
        }

        serde_json::from_value(raw.clone()).map_err(|e| LedgerError::SchemaValidation {
            reason: format!("event extraction failed: {}", e),
        })
    }
}
