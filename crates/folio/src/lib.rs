pub mod cli;
pub mod html;
pub mod img;
pub mod logging;
pub mod recent;
pub mod serve;
