//! Client-side navigation engine
//!
//! This module provides access to reinhardt-router: path matching, guards,
//! async component resolution, layouts and history synchronization.
//!
//! ## Architecture
//!
//! - **Route catalog**: ordered, mutable at runtime, wildcard routes last
//! - **Guards**: global `beforeEach`, per-route `beforeEnter`/`beforeLeave`
//! - **Components**: inline, named, factory or lazily loaded
//! - **Collaborators**: a [`HistoryBackend`] and a [`Renderer`]
//! - **Plugins**: extensions installed through [`RouterPlugin`]

pub use reinhardt_router::*;
