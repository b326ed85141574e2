//! Loading of required modules.

use crate::Instruction;
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

#[derive(Clone, Debug)]
pub enum Error {
    /// modules cannot be loaded at all
    Unsupported,
    NotFound(String),
    /// a module requires itself, possibly via other modules
    Cyclic(Vec<String>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "Current setup does not support `#REQUIRE`."),
            Self::NotFound(m) => write!(f, "Module [{}] not found.", m),
            Self::Cyclic(ms) => {
                write!(f, "Cyclic module dependency: ")?;
                for (i, m) in ms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "[{}]", m)?;
                }
                Ok(())
            }
        }
    }
}

/// Provider of instructions for modules.
pub trait Load {
    fn load(&mut self, module: &str) -> Result<Vec<Instruction>, Error>;
}

/// Loader that does not support any module.
pub struct NoLoad;

impl Load for NoLoad {
    fn load(&mut self, _: &str) -> Result<Vec<Instruction>, Error> {
        Err(Error::Unsupported)
    }
}

/// Modules kept in memory.
impl Load for BTreeMap<String, Vec<Instruction>> {
    fn load(&mut self, module: &str) -> Result<Vec<Instruction>, Error> {
        let instrs = self.get(module).cloned();
        instrs.ok_or_else(|| Error::NotFound(module.into()))
    }
}

impl<L: Load + ?Sized> Load for &mut L {
    fn load(&mut self, module: &str) -> Result<Vec<Instruction>, Error> {
        (**self).load(module)
    }
}
