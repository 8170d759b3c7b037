pub mod align;
pub mod composite;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
