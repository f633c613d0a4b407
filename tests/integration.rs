use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use rax_storage_node::error::ProtocolError;
use rax_storage_node::protocol::responses;
use rax_storage_node::{NodeClient, NodeConfig, NodeFileService, Server};
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

// Starts a node on an ephemeral port and returns its address
async fn start_node(base: &Path) -> (SocketAddr, Arc<NodeFileService>) {
    let config = NodeConfig {
        node_name: "TestNode".into(),
        bind_address: "127.0.0.1".into(),
        port: 0,
        base_path: Some(base.to_string_lossy().to_string()),
        worker_count: 4,
        queue_capacity: 8,
        max_payload_mb: 1,
        ..NodeConfig::default()
    };

    let service = Arc::new(NodeFileService::from_config(&config));
    let server = Server::bind(config, Arc::clone(&service)).await.unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        server.start().await;
    });

    (addr, service)
}

#[tokio::test]
async fn test_upload_download_delete_over_the_wire() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("node1");
    let (addr, _service) = start_node(&base).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    assert!(client.upload_file("42-abc", &[0x01, 0x02, 0x03]).await.unwrap());
    assert_eq!(fs::read(base.join("42").join("42-abc")).unwrap(), vec![1, 2, 3]);

    assert_eq!(
        client.download_file("42-abc").await.unwrap(),
        Some(vec![0x01, 0x02, 0x03])
    );
    assert!(client.delete_file("42-abc").await.unwrap());
    assert_eq!(client.download_file("42-abc").await.unwrap(), None);
    assert!(!client.delete_file("42-abc").await.unwrap());

    client.quit().await.unwrap();
}

#[tokio::test]
async fn test_binary_payload_survives_framing() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    // Line terminators and status-like text inside the payload
    let content = b"250 true\r\n\r\n550 Not found\r\n\x00\xff".to_vec();
    assert!(client.upload_file("3-tricky", &content).await.unwrap());
    assert_eq!(client.download_file("3-tricky").await.unwrap(), Some(content));

    // The connection is still in sync afterwards
    assert_eq!(client.ping().await.unwrap(), "TestNode");
}

#[tokio::test]
async fn test_batch_download_keeps_order_and_isolates_missing() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    assert!(client.upload_file("1-a", b"alpha").await.unwrap());
    assert!(client.upload_file("2-c", b"gamma").await.unwrap());

    let results = client.download_files(&["1-a", "1-b", "2-c"]).await.unwrap();
    assert_eq!(
        results,
        vec![Some(b"alpha".to_vec()), None, Some(b"gamma".to_vec())]
    );

    assert!(client.download_files(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_identifier_is_a_plain_false() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    assert!(!client.upload_file("abc-def", b"data").await.unwrap());
    assert_eq!(client.download_file("abc-def").await.unwrap(), None);
    assert!(!client.delete_file("abc-def").await.unwrap());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_inert_operations_answer_fixed_values() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    assert!(client.upload_file("5-doc", b"content").await.unwrap());

    assert!(client.list_files("5").await.unwrap().is_empty());
    assert!(client.list_files("").await.unwrap().is_empty());
    assert!(!client.exists("5-doc").await.unwrap());
    assert!(!client.is_directory("5").await.unwrap());
    assert!(!client.move_file("5-doc", "5-moved").await.unwrap());
    assert!(!client.rename_file("5-doc", "renamed").await.unwrap());
    assert!(!client.move_directory("5", "6").await.unwrap());
    assert!(!client.share_file("5-doc", "9").await.unwrap());
    assert!(!client.share_files(&["5-doc"], "9").await.unwrap());
    assert!(!client.share_directory("5", "9").await.unwrap());
    assert!(!client.delete_files(&["5-doc"]).await.unwrap());
    assert!(!client.delete_directory("5").await.unwrap());
    assert!(client.create_directory("5", "photos").await.unwrap());

    assert_eq!(
        client.download_file("5-doc").await.unwrap(),
        Some(b"content".to_vec())
    );
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_and_connection_survives() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    let too_big = vec![7u8; 1024 * 1024 + 1];
    match client.upload_file("1-big", &too_big).await {
        Err(ProtocolError::Remote { code, .. }) => assert_eq!(code, responses::PAYLOAD_TOO_LARGE),
        other => panic!("expected 552, got {other:?}"),
    }
    assert!(!dir.path().join("1").join("1-big").exists());

    assert!(client.upload_file("1-small", b"ok").await.unwrap());
}

#[tokio::test]
async fn test_bad_command_lines() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    let (code, _) = client.send_raw("STOR file.txt").await.unwrap();
    assert_eq!(code, responses::UNKNOWN_COMMAND);

    let (code, _) = client.send_raw("MOVE only-one").await.unwrap();
    assert_eq!(code, responses::SYNTAX_ERROR);

    let (code, _) = client.send_raw("UPLOAD 1-a notanumber").await.unwrap();
    assert_eq!(code, responses::SYNTAX_ERROR);

    assert_eq!(client.ping().await.unwrap(), "TestNode");
}

#[tokio::test]
async fn test_non_utf8_command_line_is_rejected_without_dropping_the_connection() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;

    let mut stream = BufReader::new(TcpStream::connect(addr).await.unwrap());
    stream
        .get_mut()
        .write_all(b"DOWNLOAD 1-\xff\r\nPING\r\n")
        .await
        .unwrap();

    let mut reply = String::new();
    stream.read_line(&mut reply).await.unwrap();
    assert!(reply.starts_with(&responses::SYNTAX_ERROR.to_string()), "got {reply:?}");

    reply.clear();
    stream.read_line(&mut reply).await.unwrap();
    assert!(reply.starts_with(&responses::READY.to_string()), "got {reply:?}");
    assert!(reply.contains("TestNode"));
}

#[tokio::test]
async fn test_concurrent_callers() {
    let dir = tempdir().unwrap();
    let (addr, _service) = start_node(dir.path()).await;

    let mut tasks = Vec::new();
    for caller in 0..8u8 {
        tasks.push(tokio::spawn(async move {
            let mut client = NodeClient::connect(addr).await.unwrap();
            for i in 0..5u8 {
                let id = format!("{caller}-file-{i}");
                let content = vec![caller, i, 42];
                assert!(client.upload_file(&id, &content).await.unwrap());
                assert_eq!(client.download_file(&id).await.unwrap(), Some(content));
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    for caller in 0..8u8 {
        assert_eq!(
            fs::read_dir(dir.path().join(caller.to_string())).unwrap().count(),
            5
        );
    }
}

#[tokio::test]
async fn test_stopped_executor_fails_upload_but_not_download() {
    let dir = tempdir().unwrap();
    let (addr, service) = start_node(dir.path()).await;
    let mut client = NodeClient::connect(addr).await.unwrap();

    assert!(client.upload_file("8-kept", b"kept").await.unwrap());
    service.shutdown().await;

    match client.upload_file("8-new", b"new").await {
        Err(ProtocolError::Remote { code, .. }) => assert_eq!(code, responses::LOCAL_ERROR),
        other => panic!("expected 451, got {other:?}"),
    }
    assert_eq!(client.download_file("8-kept").await.unwrap(), None);
    assert!(!client.delete_file("8-kept").await.unwrap());
}
