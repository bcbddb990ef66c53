use anyhow::Context;
use ipcam_recorder::console::{execute, parse_line, ConsoleCommand, HELP_TEXT};
use ipcam_recorder::events::{Event, EventEmitter, DATA_EVENT, REGISTER_EVENT};
use ipcam_recorder::{Driver, DriverConfig, FileHost, ShellRunner};
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

fn parse_args(args: &[String]) -> PathBuf {
    let mut config_path = DriverConfig::default_path();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = PathBuf::from(path),
                    None => {
                        eprintln!("Usage: ipcam-recorder [--config <path>]");
                        std::process::exit(1);
                    }
                }
            }
            "--help" | "-h" => {
                println!("Usage: ipcam-recorder [--config <path>]");
                println!("{}", HELP_TEXT);
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    config_path
}

/// Print every status update, including devices added later through `rpc`
fn print_status_updates(driver: &Arc<Driver>) {
    let weak: Weak<Driver> = Arc::downgrade(driver);
    driver.subscribe(
        REGISTER_EVENT,
        Arc::new(move |event: &Event| {
            let Some(device) = weak.upgrade().and_then(|d| d.find_device(&event.payload)) else {
                return;
            };
            device.subscribe(
                DATA_EVENT,
                Arc::new(|data: &Event| println!("[{}] {}", data.source, data.payload)),
            );
        }),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ipcam_recorder::init_logging();

    let args: Vec<String> = env::args().collect();
    let config_path = parse_args(&args);

    let config = DriverConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let host = Arc::new(FileHost::new(&config_path));
    let driver = Driver::initialize(config, host, Arc::new(ShellRunner::new()))?;
    print_status_updates(&driver);

    let shutdown = Arc::new(Notify::new());
    let on_ctrlc = shutdown.clone();
    ctrlc::set_handler(move || on_ctrlc.notify_one())?;

    // No hub here: the driver is ready as soon as it starts
    driver.start(async {}).await?;
    println!("{}", HELP_TEXT);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => match execute(&driver, &command) {
                        Ok(output) if !output.is_empty() => println!("{}", output),
                        Ok(_) => {}
                        Err(e) => eprintln!("error: {}", e),
                    },
                    Err(message) => eprintln!("{}", message),
                }
            }
        }
    }

    driver.shutdown();
    Ok(())
}
