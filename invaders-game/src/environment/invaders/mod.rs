pub mod algebra_2d;
pub mod console_drawer;
pub mod discretizer;
pub mod drawer;
pub mod entities;
pub mod mechanics;
