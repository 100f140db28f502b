// ─── RTM Addon Manager Core ───
// Backend for browsing and downloading Real Train Mod addons.
//
// Architecture:
//   core/
//     catalog/    — Train record, list API, list view, search, detail view
//     release     — Version / download link pairing
//     downloader/ — Streaming archive downloads
//     state/      — Settings, selection, terms gate, shared app state

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod http;
pub mod release;
pub mod state;
