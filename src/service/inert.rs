//! Operations the node exposes but does not implement.
//!
//! Directory hierarchies, sharing, move/rename and existence queries are
//! part of the node's remote contract. Each one answers with a fixed value
//! and never touches the filesystem.

use log::debug;

use crate::service::NodeFileService;

/// Operations answered with a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertOperation {
    CreateDirectory,
    DeleteFiles,
    DeleteDirectory,
    MoveFile,
    RenameFile,
    MoveDirectory,
    ShareFile,
    ShareFiles,
    ShareDirectory,
    ListFiles,
    Exists,
    IsDirectory,
}

impl InertOperation {
    pub fn name(&self) -> &'static str {
        match self {
            InertOperation::CreateDirectory => "createDirectory",
            InertOperation::DeleteFiles => "deleteFiles",
            InertOperation::DeleteDirectory => "deleteDirectory",
            InertOperation::MoveFile => "moveFile",
            InertOperation::RenameFile => "renameFile",
            InertOperation::MoveDirectory => "moveDirectory",
            InertOperation::ShareFile => "shareFile",
            InertOperation::ShareFiles => "shareFiles",
            InertOperation::ShareDirectory => "shareDirectory",
            InertOperation::ListFiles => "listFiles",
            InertOperation::Exists => "exists",
            InertOperation::IsDirectory => "isDirectory",
        }
    }

    /// Fixed answer for boolean operations. Only directory creation reports
    /// success.
    pub fn flag(&self) -> bool {
        matches!(self, InertOperation::CreateDirectory)
    }
}

impl NodeFileService {
    fn inert_flag(&self, op: InertOperation) -> bool {
        debug!("{} is not supported on this node", op.name());
        op.flag()
    }

    pub fn create_directory(&self, _owner_id: &str, _path: &str) -> bool {
        self.inert_flag(InertOperation::CreateDirectory)
    }

    pub fn delete_files<S: AsRef<str>>(&self, _file_ids: &[S]) -> bool {
        self.inert_flag(InertOperation::DeleteFiles)
    }

    pub fn delete_directory(&self, _path: &str) -> bool {
        self.inert_flag(InertOperation::DeleteDirectory)
    }

    pub fn move_file(&self, _source: &str, _destination: &str) -> bool {
        self.inert_flag(InertOperation::MoveFile)
    }

    pub fn rename_file(&self, _current: &str, _new_name: &str) -> bool {
        self.inert_flag(InertOperation::RenameFile)
    }

    pub fn move_directory(&self, _source: &str, _destination: &str) -> bool {
        self.inert_flag(InertOperation::MoveDirectory)
    }

    pub fn share_file(&self, _path: &str, _target_user: &str) -> bool {
        self.inert_flag(InertOperation::ShareFile)
    }

    pub fn share_files<S: AsRef<str>>(&self, _paths: &[S], _target_user: &str) -> bool {
        self.inert_flag(InertOperation::ShareFiles)
    }

    pub fn share_directory(&self, _path: &str, _target_user: &str) -> bool {
        self.inert_flag(InertOperation::ShareDirectory)
    }

    pub fn list_files(&self, _path: &str) -> Vec<String> {
        debug!("{} is not supported on this node", InertOperation::ListFiles.name());
        Vec::new()
    }

    pub fn exists(&self, _path: &str) -> bool {
        self.inert_flag(InertOperation::Exists)
    }

    pub fn is_directory(&self, _path: &str) -> bool {
        self.inert_flag(InertOperation::IsDirectory)
    }
}
