pub(crate) mod mix;
