pub mod dropdown;

pub use dropdown::{Dropdown, DropdownChild, DropdownProps};
