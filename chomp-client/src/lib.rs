//! Client library for Chomping Glass, a Chomp-style grid-elimination game
//! played against an on-chain opponent.
//!
//! The program itself owns all game logic; this crate is the thin side of
//! the protocol: packing moves into single-byte instructions, mirroring
//! the 5-byte board account, reconstructing move history from transaction
//! logs, and keeping a local session in sync over both a subscription and
//! a poll.

pub mod board;
pub mod config;
pub mod error;
pub mod instruction;
pub mod logs;
pub mod session;
pub mod submit;
pub mod sync;
pub mod view;

pub use board::Board;
pub use error::ChompError;
pub use session::Session;
