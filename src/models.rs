//! HTTP request/response models for the allocation webhook.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AllocationError;

// ------------------------------------------------------------------ //
//  Inbound (provisioning service → webhook)                           //
// ------------------------------------------------------------------ //

/// Raw request body sent by the provisioning service.
///
/// Every field is optional at the parse layer; [`AllocationRequest::validate`]
/// enforces presence up front instead of ad-hoc access deeper in the flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    #[serde(default)]
    pub device_runtime_context: Option<DeviceRuntimeContext>,
    /// Ordered candidate hub names pre-linked to the enrollment.
    #[serde(default)]
    pub linked_hubs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRuntimeContext {
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub payload: Option<DevicePayload>,
}

/// Device payload; fields other than the model id are not interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayload {
    #[serde(default)]
    pub model_id: Option<String>,
}

/// An allocation request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub registration_id: String,
    pub model_id: String,
    /// Non-empty after validation.
    pub linked_hubs: Vec<String>,
}

impl AllocationRequest {
    /// Validate the raw body into a [`ValidatedRequest`]. Pure; no side
    /// effects, no store access.
    pub fn validate(self) -> Result<ValidatedRequest, AllocationError> {
        let ctx = self.device_runtime_context.unwrap_or_default();

        let registration_id = match ctx.registration_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(AllocationError::Validation(
                    "Registration ID not provided for the device.".to_string(),
                ))
            }
        };

        let linked_hubs = match self.linked_hubs {
            Some(hubs) if !hubs.is_empty() => hubs,
            _ => {
                return Err(AllocationError::Validation(
                    "No hub group defined for the enrollment.".to_string(),
                ))
            }
        };

        let model_id = match ctx.payload.and_then(|p| p.model_id) {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(AllocationError::Validation(
                    "Model ID not provided in the device payload.".to_string(),
                ))
            }
        };

        Ok(ValidatedRequest {
            registration_id,
            model_id,
            linked_hubs,
        })
    }
}

// ------------------------------------------------------------------ //
//  Outbound (webhook → provisioning service)                          //
// ------------------------------------------------------------------ //

/// Initial twin state applied to the newly provisioned device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialTwin {
    pub tags: HashMap<String, String>,
    pub properties: HashMap<String, Value>,
}

/// Success body returned to the provisioning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub iot_hub_host_name: String,
    pub initial_twin: InitialTwin,
}

impl AllocationResponse {
    /// Assemble the response: the chosen hub plus tags carrying the model id
    /// and the resolved twin id, with an empty property set.
    pub fn new(hub: &str, model_id: &str, twin_id: &str) -> Self {
        Self {
            iot_hub_host_name: hub.to_string(),
            initial_twin: InitialTwin {
                tags: HashMap::from([
                    ("dtmi".to_string(), model_id.to_string()),
                    ("dtId".to_string(), twin_id.to_string()),
                ]),
                properties: HashMap::new(),
            },
        }
    }
}
