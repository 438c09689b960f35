#![warn(clippy::all, rust_2018_idioms)]

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use easy8::emulator::{AssemblyError, EngineState, InputError, InputRequest, Observer};
use easy8::{Emulator, EmulatorConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: easy8 <source.e8> [--config <file.ron>] [--dump]";

struct Args {
    source: String,
    config: Option<String>,
    dump: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut source = None;
    let mut config = None;
    let mut dump = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(args.next().ok_or("--config needs a file")?);
            }
            "--dump" => dump = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => return Err(format!("unknown flag {other}")),
            other => {
                if source.replace(other.to_string()).is_some() {
                    return Err("only one source file may be given".to_string());
                }
            }
        }
    }

    Ok(Args {
        source: source.ok_or(USAGE)?,
        config,
        dump,
    })
}

/// Prints outputs as they happen and parks input requests for the main loop.
#[derive(Default)]
struct Console {
    pending_input: Mutex<Option<InputRequest>>,
}

impl Observer for Console {
    fn output_updated(&self, value: i8) {
        println!("{value}");
    }

    fn syntax_error(&self, error: &AssemblyError) {
        eprintln!("syntax error: {error}");
    }

    fn input_requested(&self, request: InputRequest) {
        if let Ok(mut pending) = self.pending_input.lock() {
            *pending = Some(request);
        }
    }
}

impl Console {
    fn take_request(&self) -> Option<InputRequest> {
        self.pending_input.lock().ok()?.take()
    }
}

/// Prompts until a valid byte is delivered. Returns false on end of input.
fn answer_input(emulator: &mut Emulator, request: InputRequest) -> bool {
    let stdin = io::stdin();
    loop {
        print!("input (hex): ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        match emulator.deliver_input(request, &line) {
            Ok(()) => return true,
            Err(InputError::InvalidHex(text)) => {
                eprintln!("'{}' is not a byte in hex, try again", text.trim());
            }
            Err(err) => {
                tracing::warn!("dropping input: {}", err);
                return true;
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let config = match &args.config {
        Some(path) => match EmulatorConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::from(2);
            }
        },
        None => EmulatorConfig::default(),
    };
    let step_interval = config.step_interval();

    let source = match std::fs::read_to_string(&args.source) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read {}: {err}", args.source);
            return ExitCode::FAILURE;
        }
    };

    let mut emulator = match Emulator::with_config(config) {
        Ok(emulator) => emulator,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let console = Arc::new(Console::default());
    emulator.set_observer(console.clone());

    // the observer already reported the error
    if emulator.assemble(&source).is_err() {
        return ExitCode::FAILURE;
    }

    emulator.run();
    let mut last = Instant::now();
    while emulator.state() != EngineState::Stopped {
        if let Some(request) = console.take_request() {
            if !answer_input(&mut emulator, request) {
                tracing::info!("input closed, stopping");
                emulator.stop();
                break;
            }
            // time spent at the prompt does not count towards sleeps
            last = Instant::now();
        }

        let now = Instant::now();
        let stepped = emulator.update(now - last);
        last = now;
        if let Err(err) = stepped {
            eprintln!("execution failed: {err}");
            dump_state(&emulator, args.dump);
            return ExitCode::FAILURE;
        }
        thread::sleep(step_interval);
    }

    dump_state(&emulator, args.dump);
    ExitCode::SUCCESS
}

fn dump_state(emulator: &Emulator, dump: bool) {
    if !dump {
        return;
    }
    match ron::ser::to_string_pretty(&emulator.snapshot(), ron::ser::PrettyConfig::default()) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("could not dump state: {err}"),
    }
}
