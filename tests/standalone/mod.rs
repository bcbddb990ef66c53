//! Tests for the standalone console

#[cfg(feature = "standalone")]
mod standalone_tests {
    use ipcam_recorder::config::DriverConfig;
    use ipcam_recorder::console::{execute, parse_line, ConsoleCommand};
    use ipcam_recorder::testing::ScriptedRunner;
    use ipcam_recorder::{CameraConfig, Driver, FileHost};
    use std::sync::Arc;

    fn driver_in(dir: &tempfile::TempDir) -> (Arc<Driver>, Arc<FileHost>, Arc<ScriptedRunner>) {
        let path = dir.path().join("ipcam.toml");
        let config = DriverConfig {
            pause_after_update_ms: 0,
            update_interval_ms: 0,
            cameras: vec![CameraConfig::new("garage", "rec", "stop", "status")],
        };
        config.save_to_file(&path).unwrap();

        let host = Arc::new(FileHost::new(&path));
        let runner = Arc::new(ScriptedRunner::new());
        let driver =
            Driver::initialize(DriverConfig::load(&path).unwrap(), host.clone(), runner.clone())
                .unwrap();
        (driver, host, runner)
    }

    fn run(driver: &Driver, line: &str) -> String {
        let command = parse_line(line).unwrap();
        execute(driver, &command).unwrap()
    }

    #[tokio::test]
    async fn test_list_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, host, runner) = driver_in(&dir);
        driver.on_ready().unwrap().join().await;

        assert_eq!(run(&driver, "list"), "ipcrgarage: IP Cam Recorder - garage");
        assert_eq!(host.devices().len(), 1);

        assert_eq!(run(&driver, "write ipcrgarage dance"), "ipcrgarage ignored 'dance'");
        run(&driver, "write ipcrgarage record");
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(runner.count("rec"), 1);

        let missing = execute(&driver, &parse_line("write ipcrattic stop").unwrap());
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_rpc_add_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, host, _runner) = driver_in(&dir);
        driver.on_ready().unwrap().join().await;

        let output = run(
            &driver,
            r#"rpc new_cam_submt new_cam_name="Front Door" new_cam_record_command="ssh cam start" new_cam_stop_command="ssh cam stop" new_cam_status_command="ssh cam status""#,
        );
        assert!(output.contains("Front Door"));

        let saved = DriverConfig::load_from_file(host.path()).unwrap();
        assert_eq!(saved.cameras.len(), 2);
        assert_eq!(saved.cameras[1].record_command, "ssh cam start");
        assert_eq!(host.devices().len(), 2);
    }

    #[test]
    fn test_quit() {
        assert_eq!(parse_line("quit").unwrap(), ConsoleCommand::Quit);
    }
}
