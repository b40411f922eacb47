pub mod clip_list;
pub mod timeline;
pub mod transport;
