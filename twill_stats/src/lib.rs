#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

mod chi_square;
pub mod clustering;
mod misc;

pub use clustering::{ClusteringError, PitmanYor};
pub use misc::{sample_from_likelihoods, scores_to_likelihoods};

pub mod test {
    pub use crate::chi_square::chi_square_test;
}
