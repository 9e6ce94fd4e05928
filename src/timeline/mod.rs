pub(crate) mod arena;
pub(crate) mod file;
pub(crate) mod item;
pub(crate) mod project;
pub(crate) mod resolve;
pub(crate) mod resource;
