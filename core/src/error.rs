//! 錯誤處理系統
//!
//! 戰鬥引擎本身的運算皆為全函數，錯誤只來自兩個邊界：
//! - 載入外部資料（名冊 TOML、存檔 JSON）
//! - 以不存在的 `UnitId` 存取名冊

use crate::unit::UnitId;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("parse failed: {0}")]
    ParseError(String),
    #[error("{format} deserialize failed: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{format} serialize failed: {reason}")]
    SerializeError { format: String, reason: String },
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

/// 名冊相關錯誤
#[derive(Debug, ThisError)]
pub enum RosterError {
    #[error("unit {id} not found in roster")]
    UnitNotFound { id: UnitId },
    #[error("roster is empty")]
    EmptyRoster,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        // map_err 的閉包會吃掉 caller 位置，先取出再組裝
        let loc = std::panic::Location::caller();
        self.map_err(|mut e| {
            e.contexts
                .push(format!("{} [{}:{}]", context.into(), loc.file(), loc.line()));
            e
        })
    }
}
