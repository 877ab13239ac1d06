pub mod background;
pub mod radial;
