pub(crate) mod animate;
pub(crate) mod ease;
pub(crate) mod motion;
pub(crate) mod normalize;
