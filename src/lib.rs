//! Generation session controller for an iterative prompt-to-app builder.
//!
//! A user describes an application in natural language, the controller
//! coordinates exactly one outstanding generation call at a time against an
//! external generation client, and every settled attempt leaves a
//! consistent, persisted, replayable session: conversation history, the
//! current generated file set, and a renderable preview document.
//!
//! ## Client bootstrap
//!
//! The bundled CLI requires explicit client selection:
//!
//! - `APPFORGE_CLIENT=mock` (default) for deterministic local runs
//! - `APPFORGE_CLIENT=gemini` for Gemini API transport, which reads
//!   `GEMINI_API_KEY` (required) and `APPFORGE_GEMINI_MODEL` (optional)
//!
//! ## Session contract
//!
//! The controller owns the session record and the durable snapshot slot
//! (`.appforge/workspace.json` under the startup directory). Snapshots are
//! written only when an attempt settles, success and failure paths both; a
//! missing or unparsable slot degrades to an empty session at startup.
//! Generated file sets replace wholesale (there is no patching), and the
//! viewed-file pointer is re-resolved synchronously with each replacement.

pub mod commands;
pub mod controller;
pub mod export;
pub mod guard;
pub mod selection;
pub mod session;
