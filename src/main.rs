extern crate clap;

use crate::clap::Parser;
use infocode::cli::*;

pub fn main() {
    Cli::parse().run();
}
