pub(crate) mod block;
pub(crate) mod grid;
pub(crate) mod plan;
