//! Node client
//!
//! Async client for a storage node. Each call sends one command and reads
//! its complete reply, so calls on one client are strictly sequential.

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::ProtocolError;
use crate::protocol::Command;
use crate::protocol::responses::{self, parse_status};

pub struct NodeClient {
    reader: BufReader<TcpStream>,
}

impl NodeClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Uploads `content` under `file_id`. A `451` reply from the node, meaning
    /// the write could not be executed, comes back as
    /// [`ProtocolError::Remote`].
    pub async fn upload_file(&mut self, file_id: &str, content: &[u8]) -> Result<bool, ProtocolError> {
        check_token(file_id)?;
        let line = Command::UPLOAD(file_id.to_string(), content.len()).to_line();
        let stream = self.reader.get_mut();
        stream.write_all(format!("{line}\r\n").as_bytes()).await?;
        stream.write_all(content).await?;
        stream.flush().await?;
        self.read_flag().await
    }

    pub async fn download_file(&mut self, file_id: &str) -> Result<Option<Vec<u8>>, ProtocolError> {
        check_token(file_id)?;
        self.send(Command::DOWNLOAD(file_id.to_string())).await?;
        self.read_content().await
    }

    pub async fn download_files(
        &mut self,
        file_ids: &[&str],
    ) -> Result<Vec<Option<Vec<u8>>>, ProtocolError> {
        for id in file_ids {
            check_token(id)?;
        }
        self.send(Command::DOWNLOADS(to_owned(file_ids))).await?;

        let count = self.read_count(responses::BATCH).await?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_content().await?);
        }
        Ok(items)
    }

    pub async fn delete_file(&mut self, file_id: &str) -> Result<bool, ProtocolError> {
        check_token(file_id)?;
        self.send(Command::DELETE(file_id.to_string())).await?;
        self.read_flag().await
    }

    pub async fn create_directory(&mut self, owner_id: &str, path: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::MKDIR(token(owner_id)?, token(path)?)).await
    }

    pub async fn delete_files(&mut self, file_ids: &[&str]) -> Result<bool, ProtocolError> {
        for id in file_ids {
            check_token(id)?;
        }
        self.flag_command(Command::DELETES(to_owned(file_ids))).await
    }

    pub async fn delete_directory(&mut self, path: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::RMDIR(token(path)?)).await
    }

    pub async fn move_file(&mut self, source: &str, destination: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::MOVE(token(source)?, token(destination)?)).await
    }

    pub async fn rename_file(&mut self, current: &str, new_name: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::RENAME(token(current)?, token(new_name)?)).await
    }

    pub async fn move_directory(&mut self, source: &str, destination: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::MOVEDIR(token(source)?, token(destination)?)).await
    }

    pub async fn share_file(&mut self, path: &str, target_user: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::SHARE(token(path)?, token(target_user)?)).await
    }

    pub async fn share_files(&mut self, paths: &[&str], target_user: &str) -> Result<bool, ProtocolError> {
        for path in paths {
            check_token(path)?;
        }
        self.flag_command(Command::SHARES(token(target_user)?, to_owned(paths))).await
    }

    pub async fn share_directory(&mut self, path: &str, target_user: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::SHAREDIR(token(path)?, token(target_user)?)).await
    }

    pub async fn list_files(&mut self, path: &str) -> Result<Vec<String>, ProtocolError> {
        if !path.is_empty() {
            check_token(path)?;
        }
        self.send(Command::LIST(path.to_string())).await?;
        let count = self.read_count(responses::LISTING).await?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self.read_line().await?;
            entries.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(entries)
    }

    pub async fn exists(&mut self, path: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::EXISTS(token(path)?)).await
    }

    pub async fn is_directory(&mut self, path: &str) -> Result<bool, ProtocolError> {
        self.flag_command(Command::ISDIR(token(path)?)).await
    }

    /// Returns the node's name.
    pub async fn ping(&mut self) -> Result<String, ProtocolError> {
        self.send(Command::PING).await?;
        let (code, message) = self.read_status().await?;
        match code {
            responses::READY => Ok(message.trim_end_matches(" ready").to_string()),
            _ => Err(remote(code, message)),
        }
    }

    pub async fn quit(mut self) -> Result<(), ProtocolError> {
        self.send(Command::QUIT).await?;
        let (code, message) = self.read_status().await?;
        match code {
            responses::GOODBYE => Ok(()),
            _ => Err(remote(code, message)),
        }
    }

    /// Sends a raw command line. Meant for exercising the server's error
    /// replies.
    pub async fn send_raw(&mut self, line: &str) -> Result<(u16, String), ProtocolError> {
        let stream = self.reader.get_mut();
        stream.write_all(format!("{line}\r\n").as_bytes()).await?;
        stream.flush().await?;
        self.read_status().await
    }

    async fn flag_command(&mut self, command: Command) -> Result<bool, ProtocolError> {
        self.send(command).await?;
        self.read_flag().await
    }

    async fn send(&mut self, command: Command) -> Result<(), ProtocolError> {
        let line = command.to_line();
        debug!("Sending {}", line);
        let stream = self.reader.get_mut();
        stream.write_all(format!("{line}\r\n").as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, ProtocolError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionClosed);
        }
        Ok(line)
    }

    async fn read_status(&mut self) -> Result<(u16, String), ProtocolError> {
        let line = self.read_line().await?;
        parse_status(&line)
            .map(|(code, message)| (code, message.to_string()))
            .ok_or_else(|| ProtocolError::UnexpectedResponse(line.trim_end().to_string()))
    }

    async fn read_flag(&mut self) -> Result<bool, ProtocolError> {
        let (code, message) = self.read_status().await?;
        match (code, message.as_str()) {
            (responses::FLAG, "true") => Ok(true),
            (responses::FLAG, "false") => Ok(false),
            _ => Err(remote(code, message)),
        }
    }

    async fn read_count(&mut self, expected: u16) -> Result<usize, ProtocolError> {
        let (code, message) = self.read_status().await?;
        if code != expected {
            return Err(remote(code, message));
        }
        message
            .trim()
            .parse::<usize>()
            .map_err(|_| ProtocolError::UnexpectedResponse(format!("{code} {message}")))
    }

    async fn read_content(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        let (code, message) = self.read_status().await?;
        match code {
            responses::DATA => {
                let len = message
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ProtocolError::InvalidLength(message.clone()))?;
                let mut content = vec![0u8; len];
                self.reader.read_exact(&mut content).await?;
                Ok(Some(content))
            }
            responses::NOT_FOUND => Ok(None),
            _ => Err(remote(code, message)),
        }
    }
}

fn remote(code: u16, message: String) -> ProtocolError {
    ProtocolError::Remote { code, message }
}

fn check_token(value: &str) -> Result<(), ProtocolError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ProtocolError::InvalidArgument(value.to_string()));
    }
    Ok(())
}

fn token(value: &str) -> Result<String, ProtocolError> {
    check_token(value)?;
    Ok(value.to_string())
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
