//! Configuration dialogs served over the host's form RPC
//!
//! Every call answers through the supplied callback exactly once. Validation
//! problems come back as a message form; only host-side failures (such as a
//! failed save) are delivered as `Err`.

use super::forms::*;
use crate::driver::Driver;
use crate::errors::{DriverError, DriverResult};
use crate::types::CameraConfig;
use serde_json::json;

const INTRO_TEXT: &str = "The IP Cam Recorder driver calls shell commands to start, stop, and check the status of an IP camera. Enter the settings below to get started, and make sure you get a confirmation message after hitting 'Submit'. If you don't, the settings did not update!";
const SETTINGS_SAVED_TEXT: &str =
    "Configuration was successful. IP Cam Recorder values should update shortly!";
const EXAMPLE_RECORD: &str = "ssh name@192.168.1.111 ~/ipcam.sh start camera1";
const EXAMPLE_STOP: &str = "ssh name@192.168.1.111 ~/ipcam.sh stop camera1";
const EXAMPLE_STATUS: &str = "ssh name@192.168.1.111 ~/ipcam.sh status camera1";

/// Answer a configuration RPC. `None` asks for the main settings window.
pub fn handle_config_rpc<F>(driver: &Driver, rpc: Option<&RpcRequest>, respond: F)
where
    F: FnOnce(DriverResult<FormResponse>),
{
    respond(dispatch(driver, rpc));
}

/// Same as [`handle_config_rpc`] but returning the result directly
pub fn dispatch(driver: &Driver, rpc: Option<&RpcRequest>) -> DriverResult<FormResponse> {
    let Some(rpc) = rpc else {
        log::info!("Main config window called");
        return Ok(main_form(driver));
    };

    match rpc.method.as_str() {
        METHOD_ADD_CAMERA_FORM => {
            log::info!("Add camera window called");
            Ok(add_camera_form())
        }
        METHOD_REMOVE_CAMERA_FORM => {
            log::info!("Remove camera window called");
            Ok(remove_camera_form(driver))
        }
        METHOD_ADD_CAMERA_SUBMIT => submit_new_camera(driver, rpc),
        METHOD_REMOVE_CAMERA_SUBMIT => submit_remove_camera(driver, rpc),
        METHOD_SETTINGS_SUBMIT => submit_settings(driver, rpc),
        other => {
            log::info!("Unknown rpc method was called: {}", other);
            Ok(FormResponse::default())
        }
    }
}

pub fn main_form(driver: &Driver) -> FormResponse {
    let settings = driver.settings();
    let pause = settings.pause_after_update_secs();
    let interval = settings.update_interval_secs();

    FormResponse::new(vec![
        FormItem::paragraph(INTRO_TEXT),
        FormItem::text_input(
            FIELD_PAUSE_SECS,
            "Seconds to Pause After a Command Before Updating",
            Some(json!(pause)),
            pause,
        ),
        FormItem::text_input(
            FIELD_INTERVAL_SECS,
            "How frequently to update data in seconds",
            Some(json!(interval)),
            interval,
        ),
        FormItem::submit("Add New", METHOD_ADD_CAMERA_FORM),
        FormItem::submit("Remove Existing", METHOD_REMOVE_CAMERA_FORM),
        FormItem::paragraph(" "),
        FormItem::submit("Submit", METHOD_SETTINGS_SUBMIT),
        FormItem::close("Cancel"),
    ])
}

pub fn add_camera_form() -> FormResponse {
    FormResponse::new(vec![
        FormItem::text_input(FIELD_CAMERA_NAME, "Name of New IP Camera", None, "Front Door"),
        FormItem::text_input(
            FIELD_RECORD_COMMAND,
            "Shell Command to start recording",
            None,
            EXAMPLE_RECORD,
        ),
        FormItem::text_input(
            FIELD_STOP_COMMAND,
            "Shell Command to stop recording",
            None,
            EXAMPLE_STOP,
        ),
        FormItem::text_input(
            FIELD_STATUS_COMMAND,
            "Shell Command to check status",
            None,
            EXAMPLE_STATUS,
        ),
        FormItem::paragraph(" "),
        FormItem::submit("Submit", METHOD_ADD_CAMERA_SUBMIT),
        FormItem::close("Cancel"),
    ])
}

pub fn remove_camera_form(driver: &Driver) -> FormResponse {
    let options = driver
        .cameras()
        .into_iter()
        .map(|camera| SelectOption {
            value: Some(camera.name.clone()),
            name: camera.name,
            selected: None,
        })
        .collect();

    FormResponse::new(vec![
        FormItem::InputFieldSelect {
            field_name: FIELD_REMOVE_SELECT.to_string(),
            options,
            label: "Select Cam to Remove".to_string(),
            required: true,
        },
        FormItem::paragraph(" "),
        FormItem::submit("Submit", METHOD_REMOVE_CAMERA_SUBMIT),
        FormItem::close("Cancel"),
    ])
}

fn submit_new_camera(driver: &Driver, rpc: &RpcRequest) -> DriverResult<FormResponse> {
    log::info!("New camera submitted, checking data for errors...");
    let field = |name: &str| rpc.text(name).unwrap_or_default();
    let camera = CameraConfig::new(
        field(FIELD_CAMERA_NAME),
        field(FIELD_RECORD_COMMAND),
        field(FIELD_STOP_COMMAND),
        field(FIELD_STATUS_COMMAND),
    );
    let name = camera.name.clone();

    respond_to(driver.add_camera(camera).map(|_| {
        format!("Camera '{}' was added. Its status should update shortly!", name)
    }))
}

fn submit_remove_camera(driver: &Driver, rpc: &RpcRequest) -> DriverResult<FormResponse> {
    let Some(name) = rpc.text(FIELD_REMOVE_SELECT).filter(|n| !n.is_empty()) else {
        return Ok(FormResponse::message(
            "Please select a camera to remove and try again.",
        ));
    };
    log::info!("Removing camera {}", name);

    respond_to(driver.remove_camera(&name).map(|_| {
        format!(
            "Camera '{}' was removed. Restart the driver to remove its device completely.",
            name
        )
    }))
}

fn submit_settings(driver: &Driver, rpc: &RpcRequest) -> DriverResult<FormResponse> {
    log::info!("Config window submitted, checking data for errors...");
    // Missing or non-numeric fields fail the same validation as negative ones
    let pause = rpc.number(FIELD_PAUSE_SECS).unwrap_or(f64::NAN);
    let interval = rpc.number(FIELD_INTERVAL_SECS).unwrap_or(f64::NAN);

    respond_to(
        driver
            .update_settings(pause, interval)
            .map(|_| SETTINGS_SAVED_TEXT.to_string()),
    )
}

/// Turn a mutation outcome into a confirmation or user-facing error form
fn respond_to(outcome: DriverResult<String>) -> DriverResult<FormResponse> {
    match outcome {
        Ok(confirmation) => Ok(FormResponse::message(confirmation)),
        Err(e) if e.is_user_facing() => {
            log::info!("Rejected submission: {}", e);
            Ok(FormResponse::message(user_message(&e)))
        }
        Err(e) => Err(e),
    }
}

fn user_message(error: &DriverError) -> String {
    match error {
        DriverError::Validation(message) => message.clone(),
        DriverError::DuplicateCamera(name) => format!(
            "A camera named '{}' (or with the same letters and digits) already exists. Please try again.",
            name
        ),
        DriverError::CameraNotFound(name) => format!("No camera named '{}' was found.", name),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::testing::{MockHost, ScriptedRunner};
    use std::sync::Arc;

    fn driver() -> Arc<Driver> {
        Driver::initialize(
            DriverConfig::default(),
            Arc::new(MockHost::new()),
            Arc::new(ScriptedRunner::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_main_form_shows_current_settings_in_seconds() {
        let form = main_form(&driver());
        let FormItem::InputFieldText { value, .. } = &form.contents[1] else {
            panic!("expected pause input");
        };
        assert_eq!(value, &Some(json!(5.0)));
        let FormItem::InputFieldText { value, .. } = &form.contents[2] else {
            panic!("expected interval input");
        };
        assert_eq!(value, &Some(json!(300.0)));
    }

    #[test]
    fn test_add_form_has_four_required_fields() {
        let form = add_camera_form();
        let fields: Vec<&str> = form
            .contents
            .iter()
            .filter_map(|item| match item {
                FormItem::InputFieldText { field_name, required: true, .. } => {
                    Some(field_name.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                FIELD_CAMERA_NAME,
                FIELD_RECORD_COMMAND,
                FIELD_STOP_COMMAND,
                FIELD_STATUS_COMMAND
            ]
        );
    }

    #[test]
    fn test_user_message_strips_error_prefix() {
        let message = user_message(&DriverError::Validation("bad pause".to_string()));
        assert_eq!(message, "bad pause");
    }
}
