#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

mod matrix;
mod misc;

pub use matrix::{Matrix, Shape};
pub use misc::{argmax, bincount};
