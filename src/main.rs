use clap::Parser;
use curconvert::cli::{self, Args};
use curconvert::config::Config;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let result = Config::load_or_default(args.config.as_deref()).and_then(|mut config| {
        args.apply_to(&mut config);
        cli::run(&args, &config)
    });

    match result {
        Ok(outcome) => {
            println!("{}", outcome.json);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
