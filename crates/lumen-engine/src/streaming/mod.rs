//! Background resource streaming.
//!
//! Two threads exist while a scene is alive: the render thread and one
//! streaming thread. Each owns exactly one `AsyncContext` and is the only
//! thread that drains it. The streaming thread only touches the scene through a
//! `StreamSource`, and stops cooperatively on a shared `TerminationFlag`.

mod async_ctx;
mod flag;
mod streamer;

pub use async_ctx::{AsyncContext, AsyncSender, Task};
pub use flag::TerminationFlag;
pub use streamer::{StreamSource, Streamer, StreamerReport};
