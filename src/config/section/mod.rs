//! Configuration section definitions.
//!
//! Each module corresponds to a section in `publish.toml`:
//!
//! | Module   | TOML Section | Purpose                              |
//! |----------|--------------|--------------------------------------|
//! | `remote` | `[remote]`   | Remote name and URL                  |
//! | `push`   | `[push]`     | Primary/secondary branch, prompting  |
//! | `commit` | `[commit]`   | Default commit message               |
//! | `ignore` | `[ignore]`   | Ignore file name and extra patterns  |

mod commit;
mod ignore;
mod push;
mod remote;

pub use commit::{CommitConfig, DEFAULT_COMMIT_MESSAGE};
pub use ignore::IgnoreConfig;
pub use push::PushConfig;
pub use remote::{DEFAULT_REMOTE_URL, RemoteConfig};
