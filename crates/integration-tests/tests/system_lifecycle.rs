//! System aggregate and module tree with real adapters

use std::sync::Arc;

use overseer_core::{Module, ModuleNode, ProcessModule, RemoteModule, Stage, System};
use overseer_infra_http::{HttpClientConfig, ReqwestHttpClient};
use overseer_infra_system::SubprocessLauncher;

fn process(name: &str) -> Box<dyn Module> {
    Box::new(ProcessModule::new(
        name,
        Arc::new(SubprocessLauncher::new(vec!["PATH".to_string()])),
    ))
}

fn remote(port: &str) -> Box<dyn Module> {
    let http = ReqwestHttpClient::new(HttpClientConfig::default()).unwrap();
    Box::new(RemoteModule::new("http://localhost", port, Arc::new(http)).with_commands(["ping"]))
}

#[tokio::test]
async fn test_mixed_system_start_stop_in_order() {
    // Nothing listens on the remote port: start/stop never touch the network
    let mut system = System::new("rig", vec![process("a"), remote("9"), process("b")]);

    system.start().await.unwrap();
    assert!(system.modules().iter().all(|m| m.stage() == Stage::Started));

    system.stop().await.unwrap();
    assert!(system.modules().iter().all(|m| m.stage() == Stage::Stopped));

    // No restart after stop: the first module aborts the sequence
    assert!(system.start().await.is_err());
}

#[test]
fn test_replacing_modules_discards_old_entries() {
    let mut system = System::new("rig", vec![process("A"), process("B"), process("C")]);

    system.set_modules(vec![process("D"), process("E")]);

    assert_eq!(system.module_names(), vec!["D", "E"]);
    assert_eq!(system.len(), 2);
}

#[tokio::test]
async fn test_tree_reparent_and_lifecycle_through_nodes() {
    let root_a = ModuleNode::new(process("root.a"));
    let root_b = ModuleNode::new(process("root.b"));
    let worker = ModuleNode::new_child(remote("8080"), &root_a).unwrap();

    worker.adopt(&root_b).unwrap();

    assert!(root_a.children().is_empty());
    assert_eq!(root_b.children().len(), 1);
    assert!(Arc::ptr_eq(&worker.parent().unwrap(), &root_b));

    // Walk the children of root_b and start them
    for child in root_b.children() {
        child.module().await.start().await.unwrap();
    }
    assert_eq!(worker.module().await.stage(), Stage::Started);
    assert_eq!(worker.module().await.name(), "http://localhost:8080");
}
