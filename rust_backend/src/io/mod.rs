//! Persisted outputs and their loaders.
//!
//! Writers produce the files handed to reporting and scheduling
//! collaborators (priority lists, the solar-times record); loaders read the
//! priority lists back for follow-up selection.
//!
//! # Example
//!
//! ```no_run
//! use pepper_rust::io::loaders::read_priority_list;
//!
//! let list = read_priority_list("TransientList_F_20230504.csv")
//!     .expect("Failed to load");
//! println!("{}: {} rows", list.context, list.rows.len());
//! ```

pub mod loaders;
pub mod writers;


pub use loaders::{read_priority_list, LoadedPriorityList};
pub use writers::{
    priority_list_file_name, write_atomic, write_priority_list, write_solar_times, PriorityListRow,
};
