pub(crate) mod cancel;
pub(crate) mod prepare;
pub(crate) mod progress;
pub(crate) mod renderer;
