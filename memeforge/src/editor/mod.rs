pub(crate) mod loads;
pub(crate) mod session;
