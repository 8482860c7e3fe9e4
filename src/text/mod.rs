pub(crate) mod face;
pub(crate) mod layout;
pub(crate) mod stroke;
