extern crate almanac as lib;

use flexi_logger::{FileSpec, Logger};
use lib::app::App;
use lib::calendar::CalendarStore;
use lib::control::CommandHandler;
use lib::events::Dispatcher;
use lib::provider::JsonFileProvider;
use lib::render::Renderer;
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cal",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "Almanac - a fantasy calendar for tabletop chat."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(
        long = "as",
        default_value = "GM",
        help = "speaker for input lines without a 'name: ' prefix"
    )]
    pub speaker: String,

    #[structopt(
        long = "state",
        help = "path to the calendar state file, overrides the config",
        parse(from_os_str)
    )]
    pub state_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        eprintln!("Almanac ran into a fatal error!");
        eprintln!("Consider filing an issue with a log file and the backtrace below.");

        eprintln!("{}", info);
        eprintln!("{:?}", backtrace::Backtrace::new());
    }));

    let mut config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    if let Some(state_file) = args.state_file {
        config.state_file = state_file;
    }

    let provider = JsonFileProvider::open(&config.state_file)?;
    log::info!("Using state file '{}'", provider.path().display());
    let store = CalendarStore::open(provider);
    let handler = CommandHandler::new(Renderer::new(&config.era), &config.denial_notice);

    let dispatcher = Dispatcher::from_stdin(&args.speaker);

    let mut app = App::new(store, handler, config);

    let stdout = stdout();
    app.run(dispatcher, stdout.lock())
}
