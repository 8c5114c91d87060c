//! glosor-core: adaptive session selection and progress tracking.
//!
//! This crate defines the vocabulary data model, the history statistics, the
//! bucketed word selector and the session state machine that the rest of the
//! glosor workspace builds on. Storage is reached only through the traits in
//! [`traits`].

pub mod catalogue;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod rounds;
pub mod sampler;
pub mod selector;
pub mod session;
pub mod statistics;
pub mod text;
pub mod traits;

pub use engine::{SessionEngine, SessionRequest};
pub use error::{SessionError, StoreError};
pub use session::{AnswerOutcome, Question, Session};
