mod common;

#[cfg(test)]
mod device_tests {
    use super::common::{camera, collect_data};
    use ipcam_recorder::errors::CommandFailure;
    use ipcam_recorder::testing::{LogCapture, ScriptedRunner};
    use ipcam_recorder::{CameraConfig, Device, DeviceAction, Settings};
    use std::sync::Arc;
    use tokio::sync::watch;

    fn device(camera: CameraConfig, runner: Arc<ScriptedRunner>) -> Arc<Device> {
        let (_tx, rx) = watch::channel(Settings::from_millis(0, 0));
        Arc::new(Device::new(camera, runner, rx))
    }

    #[tokio::test]
    async fn test_record_runs_configured_record_command() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("garage");
        runner.succeed(&cam.record_command, "");
        runner.succeed(&cam.check_status_command, "ON\n");
        let device = device(cam.clone(), runner.clone());

        let result = device.execute(DeviceAction::Record).await;
        assert_eq!(result, Ok(String::new()));

        assert_eq!(runner.count(&cam.record_command), 1);
        assert_eq!(runner.count(&cam.stop_command), 0);
        // status is re-checked once the command completes
        assert_eq!(
            runner.invocations(),
            vec![cam.record_command.clone(), cam.check_status_command.clone()]
        );
    }

    #[tokio::test]
    async fn test_write_record_token_in_background() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("garage");
        runner.succeed(&cam.check_status_command, "ON\n");
        let device = device(cam.clone(), runner.clone());
        let seen = collect_data(&device);

        device.write("record").expect("record is a trigger").await.unwrap();

        assert_eq!(runner.invocations()[0], cam.record_command);
        assert_eq!(*seen.lock().unwrap(), vec!["ON".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_token_runs_nothing() {
        let runner = Arc::new(ScriptedRunner::new());
        let device = device(camera("garage"), runner.clone());
        let seen = collect_data(&device);

        for token in ["RECORD", "start", "", "record ", "stop\n"] {
            assert!(device.write(token).is_none());
        }
        tokio::task::yield_now().await;

        assert!(runner.invocations().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_output_is_trimmed() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("porch");
        runner.succeed(&cam.check_status_command, "ON\n");
        let device = device(cam, runner);
        let seen = collect_data(&device);

        device.poll_status().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["ON".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_status_emits_nothing_and_warns_once() {
        let logs = LogCapture::install();
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("warn once");
        runner.fail(&cam.check_status_command, 1);
        let device = device(cam, runner);
        let seen = collect_data(&device);

        let result = device.check_status().await;

        assert!(matches!(result, Err(CommandFailure::ExitStatus { code: Some(1), .. })));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(logs.warnings("ipcrwarnonce"), 1);
    }

    #[tokio::test]
    async fn test_overlapping_status_checks_are_tolerated() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("busy");
        runner.succeed(&cam.check_status_command, "ON");
        let device = device(cam.clone(), runner.clone());
        let seen = collect_data(&device);

        let results =
            futures::future::join_all((0..3).map(|_| device.check_status())).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(runner.count(&cam.check_status_command), 3);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stderr_output_counts_as_failure() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("noisy");
        runner.respond(
            &cam.check_status_command,
            Err(CommandFailure::Stderr("Permission denied (publickey)".to_string())),
        );
        let device = device(cam, runner);
        let seen = collect_data(&device);

        assert!(device.check_status().await.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_record_still_rechecks_status() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("garage");
        runner.fail(&cam.record_command, 255);
        runner.succeed(&cam.check_status_command, "OFF");
        let device = device(cam.clone(), runner.clone());
        let seen = collect_data(&device);

        assert!(device.execute(DeviceAction::Record).await.is_err());
        assert_eq!(runner.count(&cam.check_status_command), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["OFF".to_string()]);
    }

    #[tokio::test]
    async fn test_pause_after_update_is_honoured() {
        let runner = Arc::new(ScriptedRunner::new());
        let cam = camera("garage");
        runner.succeed(&cam.stop_command, "");
        runner.succeed(&cam.check_status_command, "OFF");
        let (_tx, rx) = watch::channel(Settings::from_millis(50, 0));
        let device = Arc::new(Device::new(cam, runner, rx));

        let started = std::time::Instant::now();
        device.execute(DeviceAction::Stop).await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    }
}
