//! Command handlers, one module per subcommand.

mod add;
mod delete;
mod edit;
mod list;
mod pack;
mod show;
mod types;

pub use add::handle_add;
pub use delete::handle_delete;
pub use edit::handle_edit;
pub use list::handle_list;
pub use pack::handle_pack;
pub use show::handle_show;
pub use types::handle_types;
