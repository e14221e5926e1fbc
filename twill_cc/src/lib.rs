#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

mod engine;
pub mod error;
pub mod feature;
pub mod sampler;
pub mod traits;

pub use engine::{CrossCat, KindEngine, KindModel};
pub use sampler::{BlockPitmanYorSampler, SamplerDiagnostics};
pub use traits::{KindMixture, ProductModel};
