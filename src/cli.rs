use crate::block_code::*;
use crate::channel::*;
use crate::convolutional::*;
use crate::entropy::*;
use crate::error::*;
use crate::markov::*;
use crate::matrix::*;
use crate::polynomial::*;
use crate::probability::*;
use crate::util::*;
use clap::builder::{StringValueParser, TypedValueParser, ValueParser};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

/// iteration budget of the Blahut-Arimoto capacity estimate
const CAPACITY_MAX_ITERATIONS: usize = 10000;
const CAPACITY_TOLERANCE: f64 = 1e-9;

#[derive(Parser, Clone)]
#[clap(author = clap::crate_authors!(", "))]
#[clap(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("INFOCODE_BUILD_RS_TIMESTAMP"), ")"))]
#[clap(about = "Information-theory and coding-theory kernels: entropy, channels, GF(2) polynomials and error-correcting codes")]
#[clap(color = clap::ColorChoice::Auto)]
#[clap(propagate_version = true)]
#[clap(subcommand_required = true)]
#[clap(arg_required_else_help = true)]
pub struct Cli {
    /// increase logging verbosity, repeat for more detail (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// the kernel configuration, e.g. {"strict_tolerance":1e-6,"stationary_iterations":50}
    #[clap(long, default_value_t = json!({}), value_parser = ValueParser::new(SerdeJsonParser), global = true)]
    config: serde_json::Value,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// entropy, maximum entropy and redundancy of a discrete source
    Entropy {
        /// probability vector, e.g. [0.5,0.25,0.25]
        #[clap(value_parser = ValueParser::new(SerdeJsonParser))]
        probabilities: serde_json::Value,
    },
    /// transinformation, capacity and decoders of a discrete memoryless channel
    Channel {
        /// channel matrix P(Y|X) with one row per input, e.g. [[0.9,0.1],[0.2,0.8]]
        #[clap(value_parser = ValueParser::new(SerdeJsonParser))]
        matrix: serde_json::Value,
        /// input distribution, uniform if omitted
        #[clap(long, value_parser = ValueParser::new(SerdeJsonParser))]
        priors: Option<serde_json::Value>,
        /// cost matrix of the minimum cost decoder, cost[actual][decided]; 0/1 cost if omitted
        #[clap(long, value_parser = ValueParser::new(SerdeJsonParser))]
        costs: Option<serde_json::Value>,
    },
    /// GF(2) polynomial given as a bit string with the highest power first
    Poly {
        polynomial: String,
        /// divide by this polynomial
        #[clap(long)]
        divisor: Option<String>,
        /// list up to this many elements of the extension field generated by the polynomial
        #[clap(long)]
        field: Option<usize>,
    },
    /// cyclic redundancy check
    Crc {
        /// message bits, or the whole codeword with `--check`
        data: String,
        /// generator polynomial as a bit string, e.g. 1011
        generator: String,
        /// validate `data` as a codeword instead of computing the check bits
        #[clap(long, action)]
        check: bool,
    },
    /// Hamming code with `r` parity bits
    Hamming {
        r: usize,
        /// print the parity-check matrix as a table
        #[clap(long, action)]
        table: bool,
        /// correct a single-bit error in this received word
        #[clap(long)]
        correct: Option<String>,
    },
    /// stationary distribution and entropy rate of a Markov source
    Markov {
        /// row-stochastic transition matrix, e.g. [[0.9,0.1],[0.3,0.7]]
        #[clap(value_parser = ValueParser::new(SerdeJsonParser))]
        matrix: serde_json::Value,
    },
    /// rate 1/n convolutional code
    Convolutional {
        /// message bits, or the received bits with `--decode`
        bits: String,
        /// generator polynomials in octal
        #[clap(short = 'g', long, value_delimiter = ',', default_value = "7,5")]
        generators: Vec<String>,
        /// constraint length K
        #[clap(short = 'k', long, default_value_t = 3)]
        constraint: usize,
        /// run the hard-decision Viterbi decoder
        #[clap(long, action)]
        decode: bool,
    },
}

#[derive(Clone)]
struct SerdeJsonParser;
impl TypedValueParser for SerdeJsonParser {
    type Value = serde_json::Value;
    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let inner = StringValueParser::new();
        let val = inner.parse_ref(cmd, arg, value)?;
        match serde_json::from_str::<serde_json::Value>(&val) {
            Ok(vector) => Ok(vector),
            Err(error) => {
                let mut err = clap::Error::new(ErrorKind::ValueValidation).with_cmd(cmd);
                if let Some(arg) = arg {
                    err.insert(ContextKind::InvalidArg, ContextValue::String(arg.to_string()));
                }
                err.insert(
                    ContextKind::InvalidValue,
                    ContextValue::String(format!("should be JSON like [0.5,0.5] or {{\"a\":1}}, parse error: {error}")),
                );
                Err(err)
            }
        }
    }
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value, name: &str) -> KernelResult<T> {
    serde_json::from_value(value).map_err(|error| KernelError::InvalidParameter(format!("{name}: {error}")))
}

fn decoder_json(
    decoder: &DecisionTable,
    channel: &ChannelMatrix,
    priors: &[Probability],
    config: &KernelConfig,
) -> KernelResult<serde_json::Value> {
    Ok(json!({
        "decisions": decoder,
        "error_probability": error_probability_config(decoder, channel, priors, config)?,
    }))
}

impl Cli {
    pub fn run(self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("infocode={level}")));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        match self.execute() {
            Ok(output) => match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{text}"),
                Err(error) => {
                    eprintln!("error: cannot serialize output: {error}");
                    std::process::exit(2);
                }
            },
            Err(error) => {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        }
    }

    pub fn execute(self) -> KernelResult<serde_json::Value> {
        let config = KernelConfig::from_json(self.config)?;
        match self.command {
            Commands::Entropy { probabilities } => {
                let probabilities: ProbabilityVector = from_json(probabilities, "probabilities")?;
                validate_probability_vector(&probabilities, config.strict_tolerance)?;
                Ok(json!({
                    "entropy": entropy(&probabilities),
                    "max_entropy": max_entropy(probabilities.len()),
                    "redundancy": redundancy(&probabilities),
                }))
            }
            Commands::Channel { matrix, priors, costs } => {
                let channel = ChannelMatrix::new_config(from_json(matrix, "channel matrix")?, &config)?;
                let priors: ProbabilityVector = match priors {
                    Some(priors) => from_json(priors, "priors")?,
                    None => uniform(channel.inputs()),
                };
                let costs: Option<Vec<Vec<f64>>> = costs.map(|costs| from_json(costs, "costs")).transpose()?;
                let report = analyze(&priors, &channel, &config)?;
                let capacity = channel_capacity_blahut_arimoto(&channel, CAPACITY_MAX_ITERATIONS, CAPACITY_TOLERANCE)?;
                let ml = maximum_likelihood_decoder(&channel);
                let map = maximum_a_posteriori_decoder_config(&channel, &priors, &config)?;
                let min_cost = minimum_cost_decoder_config(&channel, &priors, costs.as_deref(), &config)?;
                Ok(json!({
                    "analysis": report,
                    "symmetric": channel.is_symmetric(config.strict_tolerance),
                    "capacity_uniform_input": channel_capacity_approx(&channel)?,
                    "capacity": capacity,
                    "maximum_likelihood": decoder_json(&ml, &channel, &priors, &config)?,
                    "maximum_a_posteriori": decoder_json(&map, &channel, &priors, &config)?,
                    "minimum_cost": decoder_json(&min_cost, &channel, &priors, &config)?,
                }))
            }
            Commands::Poly {
                polynomial,
                divisor,
                field,
            } => {
                let poly = Gf2Poly::from_bit_str(&polynomial)?;
                let primitivity = is_primitive_with_limit(&poly, config.exact_primitivity_max_degree)?;
                let mut output = json!({
                    "polynomial": poly,
                    "notation": poly.notation(),
                    "degree": poly.degree(),
                    "weight": poly.weight(),
                    "irreducible": is_irreducible(&poly)?,
                    "primitive": primitivity,
                });
                if let Some(divisor) = divisor {
                    let divisor = Gf2Poly::from_bit_str(&divisor)?;
                    let (quotient, remainder) = divide(&poly, &divisor)?;
                    output["division"] = json!({
                        "divisor": divisor.notation(),
                        "quotient": quotient,
                        "remainder": remainder,
                        "quotient_notation": quotient.notation(),
                        "remainder_notation": remainder.notation(),
                    });
                }
                if let Some(max_elements) = field {
                    let elements = generate_extension_field(&poly, max_elements)?;
                    let width = poly.degree().unwrap_or(0);
                    output["field"] = elements
                        .iter()
                        .map(|element| element.to_bit_string_padded(width))
                        .collect::<Vec<_>>()
                        .into();
                }
                Ok(output)
            }
            Commands::Crc { data, generator, check } => {
                let data = parse_bits(&data)?;
                let generator = Gf2Poly::from_bit_str(&generator)?;
                if check {
                    return Ok(json!({ "valid": crc_check(&data, &generator)? }));
                }
                Ok(json!({
                    "remainder": bits_to_string(&crc_compute(&data, &generator)?),
                    "codeword": bits_to_string(&crc_codeword(&data, &generator)?),
                }))
            }
            Commands::Hamming { r, table, correct } => {
                let parity_check_matrix = hamming_parity_matrix(r)?;
                if table {
                    parity_check_matrix.printstd();
                }
                let n = parity_check_matrix.columns();
                let mut output = json!({
                    "n": n,
                    "k": n - r,
                    "code_rate": code_rate(n, n - r),
                    "densely_packed": is_densely_packed(n, n - r, 3),
                    "parity_check_matrix": parity_check_matrix.to_bit_strings(),
                    "syndrome_table": syndrome_table(&parity_check_matrix),
                });
                if let Some(received) = correct {
                    output["correction"] = json!(correct_single_error(&parse_bits(&received)?, &parity_check_matrix)?);
                }
                Ok(output)
            }
            Commands::Markov { matrix } => {
                let transition: ProbabilityMatrix = from_json(matrix, "transition matrix")?;
                Ok(json!(entropy_rate_config(&transition, &config)?))
            }
            Commands::Convolutional {
                bits,
                generators,
                constraint,
                decode,
            } => {
                let code = ConvolutionalCode::from_octal(&generators, constraint)?;
                let bits = parse_bits(&bits)?;
                if decode {
                    return Ok(json!(code.decode(&bits)?));
                }
                Ok(json!({
                    "encoded": bits_to_string(&code.encode(&bits)),
                    "rate": 1.0 / code.outputs() as f64,
                }))
            }
        }
    }
}
