//! Wire types of the host's configuration-form RPC protocol

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const METHOD_ADD_CAMERA_FORM: &str = "add_new_cam";
pub const METHOD_REMOVE_CAMERA_FORM: &str = "remove_cam";
pub const METHOD_ADD_CAMERA_SUBMIT: &str = "new_cam_submt";
pub const METHOD_REMOVE_CAMERA_SUBMIT: &str = "remove_cam_submt";
pub const METHOD_SETTINGS_SUBMIT: &str = "submt";

pub const FIELD_PAUSE_SECS: &str = "pause_aft_updt_secs_text";
pub const FIELD_INTERVAL_SECS: &str = "update_interval_text";
pub const FIELD_CAMERA_NAME: &str = "new_cam_name";
pub const FIELD_RECORD_COMMAND: &str = "new_cam_record_command";
pub const FIELD_STOP_COMMAND: &str = "new_cam_stop_command";
pub const FIELD_STATUS_COMMAND: &str = "new_cam_status_command";
pub const FIELD_REMOVE_SELECT: &str = "remove_cam_select";

/// A call from the host: the method name plus the submitted form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.params.insert(field.to_string(), value.into());
        self
    }

    /// Field value as trimmed text; numbers are rendered as their JSON text
    pub fn text(&self, field: &str) -> Option<String> {
        match self.params.get(field)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field value as a number; accepts JSON numbers and numeric strings
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.params.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

/// One UI directive in a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormItem {
    Paragraph {
        text: String,
    },
    InputFieldText {
        field_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Value>,
        required: bool,
    },
    InputFieldSelect {
        field_name: String,
        options: Vec<SelectOption>,
        label: String,
        required: bool,
    },
    Submit {
        name: String,
        rpc_method: String,
    },
    Close {
        name: String,
    },
}

impl FormItem {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn text_input(
        field_name: &str,
        label: &str,
        value: Option<Value>,
        placeholder: impl Into<Value>,
    ) -> Self {
        Self::InputFieldText {
            field_name: field_name.to_string(),
            value,
            label: label.to_string(),
            placeholder: Some(placeholder.into()),
            required: true,
        }
    }

    pub fn submit(name: &str, rpc_method: &str) -> Self {
        Self::Submit {
            name: name.to_string(),
            rpc_method: rpc_method.to_string(),
        }
    }

    pub fn close(name: &str) -> Self {
        Self::Close {
            name: name.to_string(),
        }
    }
}

/// Form returned to the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    pub contents: Vec<FormItem>,
}

impl FormResponse {
    pub fn new(contents: Vec<FormItem>) -> Self {
        Self { contents }
    }

    /// A single message followed by a close button
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(vec![FormItem::paragraph(text), FormItem::close("Close")])
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().filter_map(|item| match item {
            FormItem::Paragraph { text } => Some(text.as_str()),
            _ => None,
        })
    }
}
