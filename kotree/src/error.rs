//! Common error type.

use crate::gctx::Error as GCtxError;
use crate::load::Error as LoadError;
use crate::message::Trail;
use crate::session::Error as SessionError;
use crate::typing::Error as TypingError;
use crate::{dtree, rule};
use core::fmt;

/// Common error type.
#[derive(Clone, Debug)]
pub enum Error {
    Rule(rule::Error),
    DTree(dtree::Error),
    GCtx(GCtxError),
    Typing(TypingError),
    Load(LoadError),
    Session(SessionError),
}

impl From<rule::Error> for Error {
    fn from(err: rule::Error) -> Self {
        Self::Rule(err)
    }
}

impl From<dtree::Error> for Error {
    fn from(err: dtree::Error) -> Self {
        Self::DTree(err)
    }
}

impl From<GCtxError> for Error {
    fn from(err: GCtxError) -> Self {
        Self::GCtx(err)
    }
}

impl From<TypingError> for Error {
    fn from(err: TypingError) -> Self {
        Self::Typing(err)
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl Error {
    /// Short category of the error, shown in brackets before its message.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Rule(_) => "Rule",
            Self::DTree(_) => "DTree",
            Self::GCtx(e) => e.title(),
            Self::Typing(e) => e.title(),
            Self::Load(_) => "Require",
            Self::Session(_) => "Declaration",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rule(e) => e.fmt(f),
            Self::DTree(e) => e.fmt(f),
            Self::GCtx(e) => e.fmt(f),
            Self::Typing(e) => e.fmt(f),
            Self::Load(e) => e.fmt(f),
            Self::Session(e) => e.fmt(f),
        }
    }
}

/// Error together with the instruction that caused it.
#[derive(Clone, Debug)]
pub struct Located {
    pub error: Error,
    pub trail: Trail,
}

impl Located {
    pub fn new(error: Error, trail: Trail) -> Self {
        Self { error, trail }
    }
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.trail.0.is_empty() {
            write!(f, "{} ", self.trail)?;
        }
        write!(f, "[{}] {}", self.error.title(), self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for Located {}
