//! Firegate: intent-firewall interposition with an external policy
//! authority.
//!
//! Wraps a privileged host's live firewall object behind a
//! behavior-compatible proxy, consults a central policy authority for the
//! decision-bearing operations, and fails open whenever the authority has
//! no answer. Also ships the asynchronous rule-callback protocol that
//! decoupled callers use to learn rule verdicts out-of-band.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod callback;
pub mod config;
pub mod decision;
pub mod firewall;
pub mod logging;
pub mod types;
