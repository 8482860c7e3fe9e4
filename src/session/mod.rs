pub(crate) mod capture;
pub(crate) mod clock;
pub(crate) mod progress;
pub(crate) mod stage;
