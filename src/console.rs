//! Line-oriented console for running the driver without a hub
//!
//! ```text
//! list
//! poll
//! write ipcrgarage record
//! rpc
//! rpc new_cam_submt new_cam_name="Front Door" new_cam_record_command="ssh cam start"
//! quit
//! ```

use crate::commands::{dispatch, RpcRequest};
use crate::driver::Driver;
use crate::errors::{DriverError, DriverResult};

pub const HELP_TEXT: &str = "commands: list | poll | write <device-id> <record|stop> | rpc [method] [field=value ...] | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    List,
    Poll,
    Write { guid: String, token: String },
    Rpc(Option<RpcRequest>),
    Help,
    Quit,
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Err(HELP_TEXT.to_string());
    };

    match head.as_str() {
        "list" => Ok(ConsoleCommand::List),
        "poll" => Ok(ConsoleCommand::Poll),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "write" => match rest {
            [guid, token] => Ok(ConsoleCommand::Write {
                guid: guid.clone(),
                token: token.clone(),
            }),
            _ => Err("usage: write <device-id> <token>".to_string()),
        },
        "rpc" => {
            let Some((method, fields)) = rest.split_first() else {
                return Ok(ConsoleCommand::Rpc(None));
            };
            let mut request = RpcRequest::new(method.as_str());
            for field in fields {
                let (key, value) = field
                    .split_once('=')
                    .ok_or_else(|| format!("expected field=value, got '{}'", field))?;
                request = request.with_param(key, value);
            }
            Ok(ConsoleCommand::Rpc(Some(request)))
        }
        other => Err(format!("unknown command '{}'; {}", other, HELP_TEXT)),
    }
}

/// Run one console command and render its output
pub fn execute(driver: &Driver, command: &ConsoleCommand) -> DriverResult<String> {
    match command {
        ConsoleCommand::List => {
            let lines: Vec<String> = driver
                .devices()
                .iter()
                .map(|device| format!("{}: {}", device.guid(), device.name()))
                .collect();
            Ok(lines.join("\n"))
        }
        ConsoleCommand::Poll => {
            let pass = driver.poll_all();
            Ok(format!("polling {} devices", pass.len()))
        }
        ConsoleCommand::Write { guid, token } => {
            let device = driver
                .find_device(guid)
                .ok_or_else(|| DriverError::CameraNotFound(guid.clone()))?;
            match device.write(token) {
                Some(_) => Ok(format!("{} <- {}", guid, token)),
                None => Ok(format!("{} ignored '{}'", guid, token)),
            }
        }
        ConsoleCommand::Rpc(request) => {
            let response = dispatch(driver, request.as_ref())?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        ConsoleCommand::Help => Ok(HELP_TEXT.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_quoted_values() {
        let tokens = tokenize(r#"rpc new_cam_submt new_cam_name="Front Door" x=1"#).unwrap();
        assert_eq!(
            tokens,
            vec!["rpc", "new_cam_submt", "new_cam_name=Front Door", "x=1"]
        );
        assert!(tokenize(r#"rpc "open"#).is_err());
    }

    #[test]
    fn test_parse_write_and_rpc() {
        assert_eq!(
            parse_line("write ipcrgarage record").unwrap(),
            ConsoleCommand::Write {
                guid: "ipcrgarage".to_string(),
                token: "record".to_string()
            }
        );
        assert_eq!(parse_line("rpc").unwrap(), ConsoleCommand::Rpc(None));

        let ConsoleCommand::Rpc(Some(request)) =
            parse_line("rpc submt pause_aft_updt_secs_text=10").unwrap()
        else {
            panic!("expected rpc request");
        };
        assert_eq!(request.method, "submt");
        assert_eq!(request.number("pause_aft_updt_secs_text"), Some(10.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("").is_err());
        assert!(parse_line("write onlyone").is_err());
        assert!(parse_line("rpc submt novalue").is_err());
        assert!(parse_line("dance").is_err());
    }
}
