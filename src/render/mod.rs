pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod layout;
pub(crate) mod surface;
pub(crate) mod transitions;
