//! Process modules against real subprocesses

use std::sync::Arc;

use overseer_core::port::ExecutionStatus;
use overseer_core::{Invocation, Module, ProcessModule, Stage, SupervisorError, System};
use overseer_infra_system::SubprocessLauncher;

fn launcher() -> Arc<SubprocessLauncher> {
    Arc::new(SubprocessLauncher::new(vec!["PATH".to_string()]))
}

/// `echo -m pkg.mod ...` prints its own command line
fn echo_module(name: &str) -> ProcessModule {
    ProcessModule::new(name, launcher()).with_executable("echo")
}

#[tokio::test]
async fn test_system_with_detached_process_module() {
    let mut system = System::new("s1", vec![Box::new(echo_module("pkg.mod")) as Box<dyn Module>]);

    system.start().await.unwrap();
    system.stop().await.unwrap();
    assert_eq!(system.modules()[0].stage(), Stage::Stopped);

    let mut module = echo_module("pkg.mod");
    let accepted = module.run(Invocation::launch(true)).await.unwrap();
    assert!(accepted, "detached launch returns once accepted");

    module.wait().await.unwrap();

    let outcome = module.take_result().expect("first read yields the result").unwrap();
    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert!(outcome.stdout.unwrap_or_default().contains("-m pkg.mod"));

    assert!(module.take_result().is_none(), "second read is empty");
}

#[tokio::test]
async fn test_blocking_launch_forwards_arguments() {
    let mut module = echo_module("vision.camera")
        .with_args(["--fps", "30"])
        .with_kwarg("device", "0");

    assert!(module.launch(false).await.unwrap());

    let stdout = module.take_result().unwrap().unwrap().stdout.unwrap();
    assert_eq!(stdout.trim(), "-m vision.camera --fps 30 --device=0");
}

#[tokio::test]
async fn test_blocking_launch_reports_failure() {
    let mut module = ProcessModule::new("pkg.mod", launcher()).with_executable("false");

    assert!(!module.launch(false).await.unwrap());

    let outcome = module.take_result().unwrap().unwrap();
    assert_eq!(outcome.status, ExecutionStatus::Failed);
}

#[tokio::test]
async fn test_missing_executable_in_detached_launch_lands_in_slot() {
    let mut module = ProcessModule::new("pkg.mod", launcher()).with_executable("/no/such/interpreter");

    // Accepted: the spawn error only surfaces through the result slot
    assert!(module.launch(true).await.unwrap());
    module.wait().await.unwrap();

    assert!(matches!(module.take_result(), Some(Err(_))));
}

#[tokio::test]
async fn test_missing_executable_in_blocking_launch_propagates() {
    let mut module = ProcessModule::new("pkg.mod", launcher()).with_executable("/no/such/interpreter");

    let err = module.launch(false).await.unwrap_err();

    assert!(matches!(err, SupervisorError::Execution(_)));
}
