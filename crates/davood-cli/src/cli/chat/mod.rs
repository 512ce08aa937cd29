//! Interactive chat experience for DavoodAI.
//!
//! Startup splash, welcome banner, markdown rendering with a typing
//! indicator, slash commands and the optional voice visualizer. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
pub mod splash;
pub mod view;
pub mod visualizer;
