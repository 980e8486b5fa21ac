//! End-to-end sidecar lifecycle scenarios.
//!
//! These run against real processes (tiny shell scripts standing in for the
//! hook binary) and real Unix sockets in tempdirs. The scripts never bind
//! the socket themselves; where readiness matters the test binds it, which
//! keeps every scenario deterministic.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use hiphops_hook::config::HookConfig;
use hiphops_hook::sidecar::{ConnectionState, SidecarError, SidecarManager};
use tokio::net::UnixListener;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn fast_config(socket: PathBuf, binary: Option<PathBuf>) -> HookConfig {
    HookConfig {
        socket_path: socket,
        binary_override: binary,
        startup_timeout: Duration::from_millis(600),
        poll_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

// ── Adoption: a live socket means no launch ────────────────────────────────

#[tokio::test]
async fn adopts_running_sidecar_without_spawning() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");
    let _listener = UnixListener::bind(&socket).unwrap();

    // The override points nowhere; adoption must short-circuit before the
    // locator or supervisor are ever consulted.
    let config = fast_config(socket, Some(PathBuf::from("/nonexistent/hook")));
    let manager = SidecarManager::new(config);

    manager.ensure_ready().await.expect("adoption should succeed");
    assert_eq!(manager.state(), ConnectionState::Ready);
    assert!(!manager.launched_process());
}

// ── Single launch under concurrency ────────────────────────────────────────

#[tokio::test]
async fn concurrent_callers_share_one_attempt() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");
    let spawn_log = dir.path().join("spawns.log");

    // Every spawn appends a line; the script then idles without binding the
    // socket, so the attempt ends in a timeout for all callers.
    let script = write_script(
        dir.path(),
        "hook-stub",
        &format!("echo started >> \"{}\"\nexec sleep 30", spawn_log.display()),
    );

    let manager = SidecarManager::new(fast_config(socket, Some(script)));

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let m = manager.clone();
            tokio::spawn(async move { m.ensure_ready().await })
        })
        .collect();

    for caller in callers {
        let err = caller.await.unwrap().unwrap_err();
        assert!(
            matches!(err, SidecarError::Timeout { .. }),
            "every caller observes the shared timeout, got: {err}"
        );
    }

    let spawns = std::fs::read_to_string(&spawn_log).unwrap();
    assert_eq!(
        spawns.lines().count(),
        1,
        "eight concurrent callers must produce exactly one launch"
    );

    // Failure is terminal: a later caller replays the error and the spawn
    // count does not move.
    let err = manager.ensure_ready().await.unwrap_err();
    assert!(matches!(err, SidecarError::Timeout { .. }));
    assert_eq!(manager.state(), ConnectionState::Failed);
    let spawns = std::fs::read_to_string(&spawn_log).unwrap();
    assert_eq!(spawns.lines().count(), 1);
}

// ── Timeout terminates the supervised process ──────────────────────────────

#[tokio::test]
async fn timeout_kills_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");
    let pid_file = dir.path().join("child.pid");

    let script = write_script(
        dir.path(),
        "hook-stub",
        &format!("echo $$ > \"{}\"\nexec sleep 30", pid_file.display()),
    );

    let manager = SidecarManager::new(fast_config(socket, Some(script)));
    let err = manager.ensure_ready().await.unwrap_err();
    assert!(matches!(err, SidecarError::Timeout { .. }));

    let pid = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .to_string();

    // The kill is delivered asynchronously; poll until the process is gone.
    let mut alive = true;
    for _ in 0..100 {
        let signalled = std::process::Command::new("kill")
            .args(["-0", &pid])
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !signalled {
            alive = false;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!alive, "sidecar pid {pid} still running after timeout");
}

// ── Early exit surfaces the code ───────────────────────────────────────────

#[tokio::test]
async fn early_exit_becomes_process_exit_error() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");
    let script = write_script(dir.path(), "hook-stub", "exit 3");

    let manager = SidecarManager::new(fast_config(socket, Some(script)));
    let err = manager.ensure_ready().await.unwrap_err();

    assert!(
        matches!(err, SidecarError::ProcessExit { code: Some(3) }),
        "expected ProcessExit(3), got: {err}"
    );
    assert_eq!(manager.state(), ConnectionState::Failed);
}

// ── Launch then readiness observed within the timeout ──────────────────────

#[tokio::test]
async fn launch_reaches_ready_when_socket_appears() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");
    let script = write_script(dir.path(), "hook-stub", "exec sleep 30");

    let manager = SidecarManager::new(fast_config(socket.clone(), Some(script)));

    // Stand in for the child's bind: the socket goes live mid-poll.
    let binder = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        UnixListener::bind(&socket).unwrap()
    });

    manager.ensure_ready().await.expect("should observe readiness");
    assert_eq!(manager.state(), ConnectionState::Ready);
    assert!(manager.launched_process());

    drop(binder.await.unwrap());
    manager.shutdown();
}

// ── Bad override fails before any spawn ────────────────────────────────────

#[tokio::test]
async fn missing_override_is_config_error_without_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");

    let config = fast_config(socket, Some(dir.path().join("not-installed")));
    let manager = SidecarManager::new(config);

    let err = manager.ensure_ready().await.unwrap_err();
    assert!(matches!(err, SidecarError::Config { .. }));
    assert!(!manager.launched_process());
}

// ── Stale socket files are cleared before launching ────────────────────────

#[tokio::test]
async fn stale_socket_file_is_removed_for_the_fresh_bind() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("hook.sock");

    // Crashed-sidecar debris: the file exists but nothing listens.
    drop(UnixListener::bind(&socket).unwrap());
    assert!(socket.exists());

    let script = write_script(dir.path(), "hook-stub", "exec sleep 30");
    let manager = SidecarManager::new(fast_config(socket.clone(), Some(script)));

    let err = manager.ensure_ready().await.unwrap_err();
    assert!(matches!(err, SidecarError::Timeout { .. }));
    assert!(
        !socket.exists(),
        "stale socket file should have been unlinked before launch"
    );
}
