extern crate serde;
#[macro_use]
extern crate serde_json;
#[cfg(feature = "cli")]
extern crate clap;
extern crate derivative;
extern crate itertools;
#[macro_use]
extern crate lazy_static;
#[cfg(test)]
extern crate more_asserts;
extern crate num_bigint;
extern crate num_traits;
extern crate prettytable;
extern crate thiserror;
extern crate tracing;
#[cfg(feature = "cli")]
extern crate tracing_subscriber;

pub mod block_code;
pub mod channel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convolutional;
pub mod entropy;
pub mod error;
pub mod markov;
pub mod matrix;
pub mod polynomial;
pub mod probability;
pub mod util;

