//! # CLI Module
//!
//! Command implementations behind the `songcat` binary.
//!
//! - [`serve`] - runs the HTTP server (authorization, next song, playlists)
//! - [`similar`] - offline preview of the similarity ranking for one catalog
//!   track, printed as a table; no Spotify account needed
//!
//! ```bash
//! songcat serve                                  # start the server
//! songcat similar --catalog Master_Catalog.csv --track-id 4uLU6hMCjMI75M1A2tKUQC
//! songcat completions zsh                        # shell completions
//! ```

mod serve;
mod similar;

pub use serve::serve;
pub use similar::similar;
