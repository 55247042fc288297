//! One module per subcommand.
//!
//! Commands report errors through `anyhow` and print through [`crate::output`].

/// `subsys init`
pub mod init;
/// `subsys list`
pub mod list;
/// `subsys snap`
pub mod snap;
/// `subsys status`
pub mod status;
