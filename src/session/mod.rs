//! Session Module
//!
//! The pass_persist read-eval loop: one command at a time from the control
//! channel, one outstanding exchange at a time towards the backend.
//!
//! ## Control-channel protocol (line oriented)
//! ```text
//! PING                 →  PONG
//! get\n<oid>           →  <path>\n<type>\n<value>\n …  or  NONE
//! getnext\n<oid>       →  same as get
//! set\n<oid>\n<value>  →  DONE  or rendered error-attribute text
//! (empty line)         →  clean exit
//! anything else        →  NONE
//! ```

mod command;
mod runner;

pub use command::Command;
pub use runner::{Session, MAX_LINE_LEN};
