pub mod compose;
pub mod export;
pub mod init;
pub mod new;
pub mod project;
pub mod validate;

pub use compose::{compose, ComposeArgs};
pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use new::{new, NewArgs};
pub use project::{project, ProjectCommand};
pub use validate::{validate, ValidateArgs};
