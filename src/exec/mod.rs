//! Execution module containing the language branches and their shared plumbing.

pub mod capture;
pub mod config;
pub mod dispatcher;
pub mod html;
pub mod interpreter;
pub mod javascript;
pub mod limits;
pub mod session;
