use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn spawn_service() -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_plants-service"))
        .env("PLANTS_BIND", "127.0.0.1:0")
        .env("PLANTS_METRICS_BIND", "127.0.0.1:0")
        .env("PLANTS_STORAGE_BACKEND", "memory")
        .env_remove("PLANTS_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn plants-service")
}

fn stop_with_sigint(child: &mut std::process::Child) {
    let pid = child.id().to_string();
    let status = Command::new("kill")
        .arg("-INT")
        .arg(pid)
        .status()
        .expect("send SIGINT");
    assert!(status.success());
}

fn wait_for_exit(child: &mut std::process::Child, timeout: Duration) -> std::process::ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return status;
        }
        if Instant::now() >= deadline {
            child.kill().expect("kill on timeout");
            return child.wait().expect("wait after kill");
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn binary_starts_and_stops_on_sigint() {
    let mut child = spawn_service();
    std::thread::sleep(Duration::from_millis(300));
    stop_with_sigint(&mut child);
    let status = wait_for_exit(&mut child, Duration::from_secs(3));
    assert!(status.success());
}

#[test]
fn binary_fails_fast_on_invalid_config() {
    let status = Command::new(env!("CARGO_BIN_EXE_plants-service"))
        .env("PLANTS_BIND", "nowhere")
        .env_remove("PLANTS_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run plants-service");
    assert!(!status.success());
}
