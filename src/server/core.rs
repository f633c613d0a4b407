use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::config::NodeConfig;
use crate::error::{NodeError, ProtocolError};
use crate::protocol::handlers::protocol_error;
use crate::protocol::{Command, Response, handle_command, parse_command};
use crate::service::NodeFileService;

pub struct Server {
    listener: TcpListener,
    service: Arc<NodeFileService>,
    config: Arc<NodeConfig>,
}

impl Server {
    /// Binds the listener on the configured address.
    pub async fn bind(config: NodeConfig, service: Arc<NodeFileService>) -> Result<Self, NodeError> {
        let socket = config.listen_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            NodeError::IoError(e)
        })?;

        info!("Node {} bound to {}", config.node_name, socket);

        Ok(Self {
            listener,
            service,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Accepts connections until the process exits.
    pub async fn start(&self) {
        self.serve_until(std::future::pending()).await;
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// being served keep running on their own tasks.
    pub async fn serve_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Serving node {} on {}",
            self.config.node_name,
            self.config.listen_socket()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopped accepting connections for node {}", self.config.node_name);
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let service = Arc::clone(&self.service);
                            let config = Arc::clone(&self.config);

                            // Spawn a task for each caller so accept loop doesn't block
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, addr, service, config).await {
                                    warn!("Connection {} ended with error: {}", addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Serves one caller: reads command lines, runs them, writes replies.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    service: Arc<NodeFileService>,
    config: Arc<NodeConfig>,
) -> Result<(), ProtocolError> {
    info!("Connection from {}", addr);

    let mut reader = BufReader::new(stream);
    let mut raw = Vec::new();
    let line_limit = config.max_command_length as u64 + 2;
    let max_payload = config.max_payload_bytes();

    loop {
        raw.clear();
        let n = (&mut reader).take(line_limit).read_until(b'\n', &mut raw).await?;
        if n == 0 {
            info!("Connection closed by {}", addr);
            return Ok(());
        }

        if raw.last() != Some(&b'\n') {
            if (n as u64) < line_limit {
                info!("Connection closed by {} mid-command", addr);
                return Ok(());
            }
            // Over-long line: the stream can't be resynchronized
            let err = ProtocolError::CommandTooLong(n);
            write_response(&mut reader, &protocol_error(&err)).await?;
            return Err(err);
        }

        // The line is complete, so a bad encoding only costs this command
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line,
            Err(_) => {
                let err = ProtocolError::InvalidArgument("command line is not valid UTF-8".into());
                debug!("Rejected command from {}: {}", addr, err);
                write_response(&mut reader, &protocol_error(&err)).await?;
                continue;
            }
        };

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected command from {}: {}", addr, e);
                write_response(&mut reader, &protocol_error(&e)).await?;
                continue;
            }
        };
        debug!("Received from {}: {:?}", addr, command);

        let payload = match &command {
            Command::UPLOAD(_, len) if *len > max_payload => {
                // Skip the announced bytes so the next command lines up
                let skipped = tokio::io::copy(
                    &mut (&mut reader).take(*len as u64),
                    &mut tokio::io::sink(),
                )
                .await?;
                if skipped < *len as u64 {
                    return Err(ProtocolError::ConnectionClosed);
                }
                let err = ProtocolError::PayloadTooLarge {
                    size: *len,
                    max: max_payload,
                };
                warn!("Rejected upload from {}: {}", addr, err);
                write_response(&mut reader, &protocol_error(&err)).await?;
                continue;
            }
            Command::UPLOAD(_, len) => {
                let mut content = vec![0u8; *len];
                reader.read_exact(&mut content).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        ProtocolError::ConnectionClosed
                    } else {
                        ProtocolError::IoError(e)
                    }
                })?;
                Some(content)
            }
            _ => None,
        };

        let quit = command == Command::QUIT;
        let response = handle_command(&service, &config.node_name, command, payload).await;
        write_response(&mut reader, &response).await?;

        if quit {
            info!("Caller {} requested to quit", addr);
            return Ok(());
        }
    }
}

async fn write_response(
    reader: &mut BufReader<TcpStream>,
    response: &Response,
) -> Result<(), ProtocolError> {
    let stream = reader.get_mut();
    stream.write_all(&response.encode()).await?;
    stream.flush().await?;
    Ok(())
}
