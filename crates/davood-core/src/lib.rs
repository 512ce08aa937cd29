//! Conversation logic and port trait definitions for DavoodAI.
//!
//! This crate defines the "ports" (`KvStore`, `ChatTransport`, `ChatView`,
//! `SpeechOutput`) that the infrastructure and CLI layers implement, plus the
//! session client and presentation loop built on top of them. It never depends
//! on `davood-infra`.

pub mod backend;
pub mod chat;
pub mod speech;
pub mod storage;
pub mod visual;
