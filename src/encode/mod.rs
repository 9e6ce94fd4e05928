pub(crate) mod codec;
pub(crate) mod ffmpeg;
pub(crate) mod mux;
