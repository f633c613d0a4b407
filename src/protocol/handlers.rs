//! Command handlers for the storage node.
//!
//! Each handler calls into the [`NodeFileService`] and turns its outcome
//! into a [`Response`].

use log::{error, info};

use crate::error::NodeError;
use crate::error::handlers::{error_to_response_code, protocol_error_code};
use crate::error::ProtocolError;
use crate::protocol::responses::Response;
use crate::protocol::Command;
use crate::service::NodeFileService;

/// Dispatches a parsed command to its handler.
///
/// `payload` carries the bytes read after an `UPLOAD` line and is ignored
/// for every other command.
pub async fn handle_command(
    service: &NodeFileService,
    node_name: &str,
    command: Command,
    payload: Option<Vec<u8>>,
) -> Response {
    match command {
        Command::UPLOAD(file_id, _) => handle_cmd_upload(service, &file_id, payload).await,
        Command::DOWNLOAD(file_id) => Response::Content(service.download_file(&file_id).await),
        Command::DOWNLOADS(file_ids) => Response::Batch(service.download_files(&file_ids).await),
        Command::DELETE(file_id) => Response::Flag(service.delete_file(&file_id).await),
        Command::MKDIR(owner, path) => Response::Flag(service.create_directory(&owner, &path)),
        Command::DELETES(file_ids) => Response::Flag(service.delete_files(&file_ids)),
        Command::RMDIR(path) => Response::Flag(service.delete_directory(&path)),
        Command::MOVE(src, dst) => Response::Flag(service.move_file(&src, &dst)),
        Command::RENAME(path, name) => Response::Flag(service.rename_file(&path, &name)),
        Command::MOVEDIR(src, dst) => Response::Flag(service.move_directory(&src, &dst)),
        Command::SHARE(path, user) => Response::Flag(service.share_file(&path, &user)),
        Command::SHARES(user, paths) => Response::Flag(service.share_files(&paths, &user)),
        Command::SHAREDIR(path, user) => Response::Flag(service.share_directory(&path, &user)),
        Command::LIST(path) => Response::Listing(service.list_files(&path)),
        Command::EXISTS(path) => Response::Flag(service.exists(&path)),
        Command::ISDIR(path) => Response::Flag(service.is_directory(&path)),
        Command::PING => Response::Ready(node_name.to_string()),
        Command::QUIT => Response::Goodbye,
    }
}

/// Handles UPLOAD: stores the payload, answering with a flag or, when the
/// executor could not run the write, a local error.
async fn handle_cmd_upload(
    service: &NodeFileService,
    file_id: &str,
    payload: Option<Vec<u8>>,
) -> Response {
    let Some(content) = payload else {
        return protocol_error(&ProtocolError::MissingArgument("payload"));
    };

    match service.upload_file(file_id, content).await {
        Ok(stored) => {
            info!("Upload of {} finished: {}", file_id, stored);
            Response::Flag(stored)
        }
        Err(e) => node_error(&e),
    }
}

/// Builds the error reply for a protocol error.
pub fn protocol_error(err: &ProtocolError) -> Response {
    Response::Error(protocol_error_code(err), err.to_string())
}

fn node_error(err: &NodeError) -> Response {
    error!("Command failed: {}", err);
    Response::Error(error_to_response_code(err), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use crate::protocol::responses;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_upload_then_download_through_handlers() {
        let dir = tempdir().unwrap();
        let service = NodeFileService::with_pool(dir.path(), 2, 2);

        let reply = handle_command(
            &service,
            "Node1",
            Command::UPLOAD("1-a".into(), 2),
            Some(b"hi".to_vec()),
        )
        .await;
        assert_eq!(reply, Response::Flag(true));

        let reply = handle_command(&service, "Node1", Command::DOWNLOAD("1-a".into()), None).await;
        assert_eq!(reply, Response::Content(Some(b"hi".to_vec())));

        let reply = handle_command(
            &service,
            "Node1",
            Command::DOWNLOADS(vec!["1-a".into(), "1-b".into()]),
            None,
        )
        .await;
        assert_eq!(reply, Response::Batch(vec![Some(b"hi".to_vec()), None]));
    }

    #[tokio::test]
    async fn test_upload_without_payload_is_syntax_error() {
        let dir = tempdir().unwrap();
        let service = NodeFileService::with_pool(dir.path(), 1, 1);
        let reply = handle_command(&service, "Node1", Command::UPLOAD("1-a".into(), 0), None).await;
        assert!(matches!(reply, Response::Error(responses::SYNTAX_ERROR, _)));
    }

    #[tokio::test]
    async fn test_upload_on_stopped_executor_is_local_error() {
        let dir = tempdir().unwrap();
        let service = NodeFileService::with_pool(dir.path(), 1, 1);
        service.shutdown().await;

        let reply = handle_command(
            &service,
            "Node1",
            Command::UPLOAD("1-a".into(), 1),
            Some(vec![0]),
        )
        .await;
        assert_eq!(
            reply,
            Response::Error(
                responses::LOCAL_ERROR,
                NodeError::Executor(ExecutorError::ShutDown).to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_inert_commands_and_ping() {
        let dir = tempdir().unwrap();
        let service = NodeFileService::with_pool(dir.path(), 1, 1);

        let reply = handle_command(&service, "Node9", Command::PING, None).await;
        assert_eq!(reply, Response::Ready("Node9".into()));
        let reply = handle_command(&service, "Node9", Command::LIST("1".into()), None).await;
        assert_eq!(reply, Response::Listing(vec![]));
        let reply = handle_command(&service, "Node9", Command::MKDIR("1".into(), "d".into()), None).await;
        assert_eq!(reply, Response::Flag(true));
        let reply = handle_command(&service, "Node9", Command::EXISTS("1-a".into()), None).await;
        assert_eq!(reply, Response::Flag(false));
    }
}
