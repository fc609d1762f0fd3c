use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildError {
    #[error("scene contains no objects to build an acceleration structure for")]
    NoObjects,

    #[error("object `{object}` has no triangles")]
    EmptyObject { object: String },

    #[error(
        "face {face} of object `{object}` references vertex {index}, but \
         there are only {len} vertices"
    )]
    InvalidVertexIndex {
        object: String,
        face: usize,
        index: u32,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't parse build configuration")]
    Parse(#[from] serde_json::Error),
}
