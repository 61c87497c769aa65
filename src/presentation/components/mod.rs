pub mod address_bar;
pub mod filter_sidebar;
pub mod log_manager;

pub use address_bar::{AddressAction, AddressBar};
pub use filter_sidebar::{FilterSidebar, SidebarAction};
pub use log_manager::{LogEntry, LogManager};
