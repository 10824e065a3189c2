//! # Simple Press
//!
//! A minimal self-hosted article publisher. Writers submit an article
//! (title, body, optional image or video) through a form; readers leave
//! comments; every article lives on disk as a static HTML snapshot that
//! is regenerated in full whenever its state changes.
//!
//! # Architecture: Store Writes, Snapshot Rebuilds
//!
//! The SQLite store is the source of truth; rendered pages are derived
//! artifacts. Each mutation follows the same shape:
//!
//! ```text
//! validate  →  write the store  →  regenerate the snapshot  →  redirect
//! ```
//!
//! There is no incremental templating: a comment triggers a full rebuild
//! of its article's page from (article, comments). That makes every
//! snapshot a pure function of stored state — rendering the same state
//! twice is byte-identical, and a damaged data root is repaired by
//! replaying `rebuild` over the store.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | SQLite access — schema, article and comment rows, shared one per process |
//! | [`media`] | Upload validation: size cap, extension allowlist, magic-byte sniffing |
//! | [`render`] | The one renderer — article snapshots and the listing page, via Maud |
//! | [`publish`] | Article publisher: validate → insert → directory → media → snapshot |
//! | [`comment`] | Comment appender: existence check → insert → full regeneration |
//! | [`server`] | Axum router, handlers, redirects, static snapshot serving |
//! | [`maintenance`] | Offline `rebuild` and `check` over a data root |
//! | [`config`] | Optional `config.toml` in the data root, defaults for every key |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! type-checked Rust, and all interpolation is escaped by default, which
//! is load-bearing here — article bodies and comments are raw user text.
//! Line breaks are reintroduced after escaping, never before.
//!
//! ## Static Snapshots Over Dynamic Pages
//!
//! Article pages are plain files served straight off disk. The dynamic
//! surface is three handlers; everything readers hit in volume is static.
//! The data root can be backed up, inspected, or served by any file
//! server as-is.
//!
//! ## Validate Before Insert
//!
//! Upload validation runs entirely in memory before the article row is
//! written, so a rejected submission leaves zero state — no orphan rows,
//! no half-created directories.
//!
//! ## One Writer Per Data Root
//!
//! SQLite runs in WAL mode and a process-wide lock serializes
//! fetch-render-write sequences, so concurrent submissions cannot
//! interleave on a snapshot file. Running two server processes against
//! one data root is not supported.

pub mod comment;
pub mod config;
pub mod maintenance;
pub mod media;
pub mod publish;
pub mod render;
pub mod server;
pub mod store;
