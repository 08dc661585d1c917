pub mod codec;
pub mod delta;
pub mod derive;
pub mod owned_css;
pub mod properties;
pub mod rule;
pub mod sheet;
pub mod swirl_css;
pub mod template;
