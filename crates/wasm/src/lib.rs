#![deny(unsafe_code)]
//! Browser host shell for glscene.
//!
//! Exposes a single `start(selector)` entry point that finds the
//! canvas, creates the WebGL2 context, builds the demo scene (a
//! rotating textured cube), and drives the requestAnimationFrame loop
//! until the page is torn down. Everything browser-specific lives in
//! this crate; glscene-core never touches the DOM.

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::start;
