#[macro_use]
extern crate log;

use std::process;

use clap::{Arg, ArgMatches, Command, crate_version};
use incept_googlenet::InceptResult;

mod classify;
mod dump;
mod layers;

fn classify_command() -> Command<'static> {
    Command::new("classify")
        .about("Prints the most likely ImageNet classes of each image.")
        .arg(
            Arg::new("weights")
                .long("weights")
                .takes_value(true)
                .help("Npz file with the trained parameters (random parameters otherwise)"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .takes_value(true)
                .help("Worker threads [default: number of cpus]"),
        )
        .arg(
            Arg::new("no-oversample")
                .long("no-oversample")
                .help("Resize each whole image to 224x224 instead of averaging ten crops"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .takes_value(true)
                .help("Text file with one class label per line"),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .short('k')
                .takes_value(true)
                .default_value("5")
                .help("Number of classes to print per image"),
        )
        .arg(Arg::new("json").long("json").help("Print results as json"))
        .arg(
            Arg::new("images")
                .takes_value(true)
                .multiple_values(true)
                .required(true)
                .help("Image files to classify"),
        )
}

fn dump_command() -> Command<'static> {
    Command::new("dump").about("Prints the graph, node by node, in evaluation order.").arg(
        Arg::new("weights")
            .long("weights")
            .takes_value(true)
            .help("Npz file with the trained parameters (random parameters otherwise)"),
    )
}

fn layers_command() -> Command<'static> {
    Command::new("layers")
        .about("Lists the addressable layers and their output shape for one image.")
        .arg(
            Arg::new("size")
                .long("size")
                .short('s')
                .takes_value(true)
                .default_value("224x224")
                .help("Input image size, as HxW"),
        )
}

/// Entrypoint for the command-line interface.
fn main() {
    let app = Command::new("incept")
        .version(crate_version!())
        .about("GoogLeNet command line interface")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .multiple_occurrences(true)
                .global(true)
                .help("Sets the level of verbosity."),
        )
        .subcommand(classify_command())
        .subcommand(dump_command())
        .subcommand(layers_command());

    let matches = app.get_matches();

    let level = match matches.occurrences_of("verbosity") {
        0 => "incept=warn,incept_googlenet=warn,incept_core=warn",
        1 => "incept=info,incept_googlenet=info,incept_core=info",
        2 => "incept=debug,incept_googlenet=debug,incept_core=debug",
        _ => "incept=trace,incept_googlenet=trace,incept_core=trace",
    };
    let env = env_logger::Env::new().filter_or("INCEPT_LOG", level);
    env_logger::Builder::from_env(env).format_timestamp_nanos().init();

    if let Err(e) = handle(&matches) {
        error!("{:?}", e);
        process::exit(1)
    }
}

fn handle(matches: &ArgMatches) -> InceptResult<()> {
    match matches.subcommand() {
        Some(("classify", m)) => classify::handle(m),
        Some(("dump", m)) => dump::handle(m),
        Some(("layers", m)) => layers::handle(m),
        Some((s, _)) => anyhow::bail!("Unknown subcommand {}.", s),
        None => anyhow::bail!("No subcommand given."),
    }
}
